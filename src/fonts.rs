use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdb::{Database, Family, Query};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, WebFontQuery};
use crate::error::{Error, Result};
use crate::events::Wakeup;
use crate::tasks::scoped::ScopedTask;

/// One batched request for every hosted web font in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebFontRequest {
    pub families: Vec<WebFontQuery>,
}

impl WebFontRequest {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            families: catalog.web_font_queries(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn queries(&self) -> Vec<&str> {
        self.families.iter().map(WebFontQuery::as_str).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedFonts {
    pub available: Vec<String>,
    pub missing: Vec<String>,
}

/// Fetches web fonts. Implementations own the transport; the editor only
/// cares about completion.
pub trait FontLoader: Send + Sync {
    fn load(&self, request: WebFontRequest) -> BoxFuture<'static, Result<LoadedFonts>>;
}

/// Issues the mount-scoped font request and gates its completion so the host
/// hook runs at most once, and never after teardown.
#[derive(Debug, Default)]
pub struct FontLoaderBridge {
    task: Option<ScopedTask>,
    started: bool,
    delivered: bool,
    torn_down: bool,
}

impl FontLoaderBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends the batched request through `loader`. Only the first call per
    /// bridge issues anything; returns whether this call did.
    pub fn start(
        &mut self,
        catalog: &Catalog,
        loader: Arc<dyn FontLoader>,
        wakeups: &UnboundedSender<Wakeup>,
    ) -> bool {
        if self.started || self.torn_down {
            return false;
        }
        self.started = true;
        let request = WebFontRequest::from_catalog(catalog);
        info!(families = ?request.queries(), "requesting web fonts");
        let tx = wakeups.clone();
        self.task = Some(ScopedTask::spawn(move |cancel| async move {
            let outcome = loader.load(request).await;
            // the request itself always runs to completion; only delivery is voided
            if cancel.is_cancelled() {
                debug!("font load finished after teardown; dropped");
                return;
            }
            let _ = tx.send(Wakeup::FontsLoaded(outcome));
        }));
        true
    }

    /// Consumes a load outcome. Returns true exactly once: for the first
    /// successful completion while mounted.
    pub fn complete(&mut self, outcome: Result<LoadedFonts>) -> bool {
        if self.torn_down || self.delivered {
            return false;
        }
        match outcome {
            Ok(loaded) => {
                if !loaded.missing.is_empty() {
                    warn!(missing = ?loaded.missing, "some web fonts unavailable");
                }
                info!(available = loaded.available.len(), "web fonts ready");
                self.delivered = true;
                true
            }
            Err(err) => {
                warn!(error = %err, "web font load failed");
                false
            }
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    pub fn teardown(&mut self) {
        self.torn_down = true;
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}

/// Resolves requested families against local font files with `fontdb`.
///
/// Succeeds when at least one requested family is present (or nothing was
/// requested); missing families are reported in [`LoadedFonts::missing`].
#[derive(Debug, Clone, Default)]
pub struct FontdbLoader {
    font_dir: Option<PathBuf>,
    system_fonts: bool,
}

impl FontdbLoader {
    pub fn new(font_dir: Option<PathBuf>, system_fonts: bool) -> Self {
        Self {
            font_dir,
            system_fonts,
        }
    }
}

impl FontLoader for FontdbLoader {
    fn load(&self, request: WebFontRequest) -> BoxFuture<'static, Result<LoadedFonts>> {
        let font_dir = self.font_dir.clone();
        let system_fonts = self.system_fonts;
        async move {
            tokio::task::spawn_blocking(move || {
                resolve_families(font_dir.as_deref(), system_fonts, &request)
            })
            .await
            .map_err(|err| Error::FontLoad(err.to_string()))?
        }
        .boxed()
    }
}

fn resolve_families(
    font_dir: Option<&Path>,
    system_fonts: bool,
    request: &WebFontRequest,
) -> Result<LoadedFonts> {
    let mut db = Database::new();
    if system_fonts {
        db.load_system_fonts();
    }
    if let Some(dir) = font_dir {
        if dir.exists() {
            db.load_fonts_dir(dir);
        } else {
            warn!(dir = %dir.display(), "font directory missing");
        }
    }
    debug!(faces = db.len(), "font database ready");

    let mut loaded = LoadedFonts::default();
    for query in &request.families {
        let family = query.family().to_string();
        if font_available(&db, &family) {
            loaded.available.push(family);
        } else {
            loaded.missing.push(family);
        }
    }
    if !request.is_empty() && loaded.available.is_empty() {
        return Err(Error::FontLoad(format!(
            "none of {} requested families available",
            request.families.len()
        )));
    }
    Ok(loaded)
}

fn font_available(db: &Database, name: &str) -> bool {
    let query = Query {
        families: &[Family::Name(name)],
        ..Default::default()
    };
    db.query(&query).is_some()
}
