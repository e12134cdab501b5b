use std::fmt;

use crate::catalog::{ColorValue, FontDescriptor};

type TextHook = Box<dyn FnMut(&str) + Send>;

/// Host hooks the editor reports through. Every hook defaults to a no-op.
pub struct EditorCallbacks {
    close_modal: Box<dyn FnMut() + Send>,
    text_change: TextHook,
    text_blur: TextHook,
    color_change: Box<dyn FnMut(&ColorValue) + Send>,
    font_change: Box<dyn FnMut(&FontDescriptor) + Send>,
    fonts_loaded: Box<dyn FnMut() + Send>,
}

impl Default for EditorCallbacks {
    fn default() -> Self {
        Self {
            close_modal: Box::new(|| {}),
            text_change: Box::new(|_| {}),
            text_blur: Box::new(|_| {}),
            color_change: Box::new(|_| {}),
            font_change: Box::new(|_| {}),
            fonts_loaded: Box::new(|| {}),
        }
    }
}

impl fmt::Debug for EditorCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorCallbacks").finish_non_exhaustive()
    }
}

impl EditorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user dismissed the editor. Advisory: the host decides whether to close.
    pub fn on_close_modal(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.close_modal = Box::new(f);
        self
    }

    /// Fired on every edit with the full draft text.
    pub fn on_text_change(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.text_change = Box::new(f);
        self
    }

    /// Fired when the text input loses focus, carrying the committed text.
    pub fn on_text_blur(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.text_blur = Box::new(f);
        self
    }

    pub fn on_color_change(mut self, f: impl FnMut(&ColorValue) + Send + 'static) -> Self {
        self.color_change = Box::new(f);
        self
    }

    pub fn on_font_change(mut self, f: impl FnMut(&FontDescriptor) + Send + 'static) -> Self {
        self.font_change = Box::new(f);
        self
    }

    pub fn on_fonts_loaded(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.fonts_loaded = Box::new(f);
        self
    }

    pub(crate) fn close_modal(&mut self) {
        (self.close_modal)()
    }

    pub(crate) fn text_change(&mut self, text: &str) {
        (self.text_change)(text)
    }

    pub(crate) fn text_blur(&mut self, text: &str) {
        (self.text_blur)(text)
    }

    pub(crate) fn color_change(&mut self, color: &ColorValue) {
        (self.color_change)(color)
    }

    pub(crate) fn font_change(&mut self, font: &FontDescriptor) {
        (self.font_change)(font)
    }

    pub(crate) fn fonts_loaded(&mut self) {
        (self.fonts_loaded)()
    }
}
