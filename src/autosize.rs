use tracing::trace;

use crate::surface::{Height, TextSurface};

/// Keeps the text input exactly as tall as its content so it never scrolls.
#[derive(Debug, Default)]
pub struct AutosizeReactor {
    last_height: Option<f32>,
}

impl AutosizeReactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the surface to its intrinsic height, then grows it to the full
    /// content height. The surface must already hold the current value.
    pub fn react<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> f32 {
        surface.set_height(Height::Auto);
        let height = surface.content_height();
        surface.set_height(Height::Px(height));
        if self.last_height != Some(height) {
            trace!(height, "autosize");
        }
        self.last_height = Some(height);
        height
    }

    pub fn last_height(&self) -> Option<f32> {
        self.last_height
    }
}
