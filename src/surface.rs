//! The text-input surface the presentation layer renders.
//!
//! The editor never measures text itself; it drives a [`TextSurface`] through
//! value updates, height changes and selection requests.

/// Rendered height of the text input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Height {
    /// Intrinsic minimum; the surface lays itself out without a fixed height.
    Auto,
    Px(f32),
}

pub trait TextSurface {
    /// Commits `value` to the rendered surface so layout reflects it.
    fn set_value(&mut self, value: &str);

    fn set_height(&mut self, height: Height);

    /// Full content height with the current value and height, in pixels.
    fn content_height(&self) -> f32;

    /// Selects the whole current text.
    fn select_all(&mut self);
}

/// Headless surface that measures content as `lines * line_height + padding`.
#[derive(Debug, Clone)]
pub struct LineMetricsSurface {
    value: String,
    line_height: f32,
    padding: f32,
    height: Height,
    selection: Option<(usize, usize)>,
}

impl LineMetricsSurface {
    pub fn new(line_height: f32, padding: f32) -> Self {
        Self {
            value: String::new(),
            line_height,
            padding,
            height: Height::Auto,
            selection: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn height(&self) -> Height {
        self.height
    }

    /// Selected char range, if any.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }
}

impl TextSurface for LineMetricsSurface {
    fn set_value(&mut self, value: &str) {
        if self.value != value {
            self.value = value.to_string();
            // an edit collapses any selection
            self.selection = None;
        }
    }

    fn set_height(&mut self, height: Height) {
        self.height = height;
    }

    fn content_height(&self) -> f32 {
        let lines = self.value.split('\n').count().max(1);
        let content = lines as f32 * self.line_height + self.padding;
        match self.height {
            // a fixed height taller than the content is reported like a scroll height would be
            Height::Px(px) => content.max(px),
            Height::Auto => content,
        }
    }

    fn select_all(&mut self) {
        self.selection = Some((0, self.value.chars().count()));
    }
}
