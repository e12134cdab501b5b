use tokio::sync::broadcast;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open on the far edges so adjacent rects never both claim a point.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.x + self.width && p.y < self.y + self.height
    }
}

/// A pointer release anywhere in the host application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRelease {
    pub position: Point,
}

impl PointerRelease {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Toolbar plus both picker rows.
    Controls,
    TextInput,
}

/// Where the presentation layer currently draws its interactive parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractiveRegions {
    regions: Vec<(RegionKind, Rect)>,
}

impl InteractiveRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: RegionKind, bounds: Rect) -> Self {
        self.regions.push((kind, bounds));
        self
    }

    pub fn region_at(&self, p: Point) -> Option<RegionKind> {
        self.regions
            .iter()
            .find(|(_, bounds)| bounds.contains(p))
            .map(|(kind, _)| *kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    Ignore(RegionKind),
    RequestClose,
}

/// Source of the application-wide pointer-release stream.
pub trait PointerSource {
    fn subscribe(&self) -> broadcast::Receiver<PointerRelease>;
}

/// Broadcast hub the host publishes every pointer release into. Each
/// subscriber sees every event; nobody consumes events for anyone else.
#[derive(Debug, Clone)]
pub struct PointerHub {
    tx: broadcast::Sender<PointerRelease>,
}

impl PointerHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns how many listeners received the event.
    pub fn publish(&self, release: PointerRelease) -> usize {
        self.tx.send(release).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for PointerHub {
    fn default() -> Self {
        Self::new(64)
    }
}

impl PointerSource for PointerHub {
    fn subscribe(&self) -> broadcast::Receiver<PointerRelease> {
        self.tx.subscribe()
    }
}

/// Requests a close for pointer releases landing outside the editor's
/// interactive regions. Classification is purely positional: it does not
/// consult whether the editor is open.
#[derive(Debug, Default)]
pub struct OutsideInteractionDetector {
    regions: InteractiveRegions,
    subscription: Option<broadcast::Receiver<PointerRelease>>,
}

impl OutsideInteractionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `source`. A second attach replaces the first, so there is
    /// never more than one listener per detector.
    pub fn attach<P: PointerSource + ?Sized>(&mut self, source: &P) {
        self.subscription = Some(source.subscribe());
        debug!("pointer listener attached");
    }

    pub fn detach(&mut self) {
        if self.subscription.take().is_some() {
            debug!("pointer listener detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn set_regions(&mut self, regions: InteractiveRegions) {
        self.regions = regions;
    }

    pub fn classify(&self, release: &PointerRelease) -> Dismissal {
        match self.regions.region_at(release.position) {
            Some(kind) => Dismissal::Ignore(kind),
            None => Dismissal::RequestClose,
        }
    }

    /// Next release from the subscription. Resolves to `None` once detached or
    /// once the source is gone.
    pub async fn next_release(&mut self) -> Option<PointerRelease> {
        let sub = self.subscription.as_mut()?;
        loop {
            match sub.recv().await {
                Ok(release) => return Some(release),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "pointer listener lagged; releases dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("pointer source closed");
        self.subscription = None;
        None
    }
}
