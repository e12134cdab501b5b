use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::autosize::AutosizeReactor;
use crate::callbacks::EditorCallbacks;
use crate::catalog::{Catalog, ColorValue, FontWeight, StyleMap};
use crate::error::Result;
use crate::events::{EditorCommand, Wakeup};
use crate::fonts::{FontLoader, FontLoaderBridge};
use crate::outside::{Dismissal, OutsideInteractionDetector, PointerRelease, PointerSource};
use crate::session::{EditSession, PickerState};
use crate::surface::TextSurface;
use crate::visibility::{Visibility, VisibilityChange, VisibilityController};

pub const DEFAULT_SELECT_ALL_DELAY: Duration = Duration::from_millis(150);

/// Initial values supplied by the host at mount.
#[derive(Debug, Clone)]
pub struct EditorProps {
    pub text_value: String,
    pub text_color: ColorValue,
    /// Family name of the initially selected catalog font.
    pub font_value: Option<String>,
    pub open: bool,
}

impl Default for EditorProps {
    fn default() -> Self {
        Self {
            text_value: String::new(),
            text_color: ColorValue::new(""),
            font_value: None,
            open: false,
        }
    }
}

/// Everything a presentation layer needs to draw the caption preview.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    pub color: ColorValue,
    pub font_family: Option<String>,
    pub weight: Option<FontWeight>,
    pub extra_style: StyleMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub open: bool,
    pub text: String,
    pub picker: PickerState,
    pub active_swatch: Option<usize>,
    pub active_font: Option<usize>,
    pub height: Option<f32>,
    pub fonts_ready: bool,
    pub style: CaptionStyle,
}

/// The caption editor's interaction state machine.
///
/// Owns the draft session and the mount-scoped machinery around it: the
/// select-all timer, the pointer subscription and the font request. All of
/// it is released by [`CaptionEditor::unmount`] (or by dropping the editor).
pub struct CaptionEditor<S> {
    session: EditSession,
    callbacks: EditorCallbacks,
    visibility: VisibilityController,
    detector: OutsideInteractionDetector,
    autosize: AutosizeReactor,
    fonts: FontLoaderBridge,
    surface: S,
    wakeups: UnboundedSender<Wakeup>,
}

impl<S: TextSurface> CaptionEditor<S> {
    /// Mounts the editor. Must be called from within a tokio runtime; the
    /// returned receiver carries the editor's own timer and font completions
    /// and must be fed back through [`CaptionEditor::wake`].
    pub fn mount<P: PointerSource + ?Sized>(
        props: EditorProps,
        catalog: Arc<Catalog>,
        mut surface: S,
        callbacks: EditorCallbacks,
        pointer: &P,
        fonts: Arc<dyn FontLoader>,
        select_all_delay: Duration,
    ) -> (Self, UnboundedReceiver<Wakeup>) {
        let (wakeups, wakeup_rx) = mpsc::unbounded_channel();
        let session = EditSession::new(
            catalog,
            props.text_value,
            props.text_color,
            props.font_value.as_deref(),
        );

        surface.set_value(session.text());
        let mut autosize = AutosizeReactor::new();
        autosize.react(&mut surface);

        let mut detector = OutsideInteractionDetector::new();
        detector.attach(pointer);

        let mut bridge = FontLoaderBridge::new();
        bridge.start(session.catalog(), fonts, &wakeups);

        let mut visibility = VisibilityController::new(select_all_delay);
        visibility.observe(props.open, &wakeups);

        info!(
            open = props.open,
            colors = session.catalog().colors().len(),
            fonts = session.catalog().fonts().len(),
            "caption editor mounted"
        );

        let editor = Self {
            session,
            callbacks,
            visibility,
            detector,
            autosize,
            fonts: bridge,
            surface,
            wakeups,
        };
        (editor, wakeup_rx)
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility.current()
    }

    pub fn detector(&self) -> &OutsideInteractionDetector {
        &self.detector
    }

    /// Reports the host's `open` flag. A falling edge closes both pickers.
    pub fn set_open(&mut self, open: bool) -> Option<VisibilityChange> {
        let change = self.visibility.observe(open, &self.wakeups)?;
        if change.to == Visibility::Closed {
            self.session.close_pickers();
        }
        Some(change)
    }

    pub fn set_text(&mut self, text: &str) {
        let changed = self.session.set_text(text);
        self.callbacks.text_change(text);
        if changed {
            self.surface.set_value(text);
            self.autosize.react(&mut self.surface);
        }
    }

    /// Commits the draft text.
    pub fn blur(&mut self) {
        debug!(chars = self.session.text().chars().count(), "text committed");
        self.callbacks.text_blur(self.session.text());
    }

    pub fn set_color(&mut self, color: ColorValue) {
        self.session.set_color(color);
        debug!(color = %self.session.color(), swatch = ?self.session.active_swatch(), "color picked");
        self.callbacks.color_change(self.session.color());
    }

    pub fn set_font(&mut self, family: &str) -> Result<()> {
        let font = self.session.set_font(family)?;
        debug!(family = %font.family, "font picked");
        self.callbacks.font_change(font);
        Ok(())
    }

    pub fn toggle_color_picker(&mut self) -> PickerState {
        let picker = self.session.toggle_color_picker();
        debug!(?picker, "toggle color picker");
        picker
    }

    pub fn toggle_font_picker(&mut self) -> PickerState {
        let picker = self.session.toggle_font_picker();
        debug!(?picker, "toggle font picker");
        picker
    }

    /// Asks the host to close. Whether it does is up to the host.
    pub fn request_close(&mut self) {
        debug!("close requested");
        self.callbacks.close_modal();
    }

    pub fn on_pointer_release(&mut self, release: PointerRelease) -> Dismissal {
        let verdict = self.detector.classify(&release);
        match verdict {
            Dismissal::Ignore(region) => {
                debug!(?region, x = release.position.x, y = release.position.y, "release inside editor")
            }
            Dismissal::RequestClose => self.request_close(),
        }
        verdict
    }

    /// Next release from the pointer subscription; `None` once detached.
    pub async fn next_release(&mut self) -> Option<PointerRelease> {
        self.detector.next_release().await
    }

    pub fn wake(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::SelectAllDue { generation } => {
                if self.visibility.take_due(generation) {
                    debug!(generation, "select all");
                    self.surface.select_all();
                }
            }
            Wakeup::FontsLoaded(outcome) => {
                if self.fonts.complete(outcome) {
                    self.callbacks.fonts_loaded();
                }
            }
        }
    }

    pub fn apply(&mut self, command: EditorCommand) -> Result<()> {
        match command {
            EditorCommand::SetOpen(open) => {
                self.set_open(open);
            }
            EditorCommand::Input(text) => self.set_text(&text),
            EditorCommand::Blur => self.blur(),
            EditorCommand::PickColor(color) => self.set_color(color),
            EditorCommand::PickFont(family) => self.set_font(&family)?,
            EditorCommand::ToggleColorPicker => {
                self.toggle_color_picker();
            }
            EditorCommand::ToggleFontPicker => {
                self.toggle_font_picker();
            }
            EditorCommand::Layout(regions) => self.detector.set_regions(regions),
        }
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let font = self.session.font();
        SessionSnapshot {
            open: self.visibility.is_open(),
            text: self.session.text().to_string(),
            picker: self.session.picker(),
            active_swatch: self.session.active_swatch(),
            active_font: self.session.font_index(),
            height: self.autosize.last_height(),
            fonts_ready: self.fonts.is_delivered(),
            style: CaptionStyle {
                color: self.session.color().clone(),
                font_family: font.map(|f| f.family.clone()),
                weight: font.and_then(|f| f.weight.clone()),
                extra_style: font.map(|f| f.extra_style.clone()).unwrap_or_default(),
            },
        }
    }

    /// Releases the timer, the pointer subscription and the font completion.
    pub fn unmount(mut self) {
        self.visibility.teardown();
        self.detector.detach();
        self.fonts.teardown();
        info!("caption editor unmounted");
    }
}
