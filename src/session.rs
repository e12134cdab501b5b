use std::sync::Arc;

use crate::catalog::{Catalog, ColorValue, FontDescriptor};
use crate::error::{Error, Result};

/// Which auxiliary picker is showing. At most one can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerState {
    #[default]
    None,
    ColorPicker,
    FontPicker,
}

impl PickerState {
    fn toggled(self, picker: PickerState) -> Self {
        if self == picker { PickerState::None } else { picker }
    }
}

/// Draft values for one mount of the editor.
#[derive(Debug, Clone)]
pub struct EditSession {
    catalog: Arc<Catalog>,
    text: String,
    color: ColorValue,
    font: Option<usize>,
    picker: PickerState,
}

impl EditSession {
    /// Starts a session from the host's initial values. A `font_family` the
    /// catalog does not list leaves no font selected.
    pub fn new(
        catalog: Arc<Catalog>,
        text: impl Into<String>,
        color: ColorValue,
        font_family: Option<&str>,
    ) -> Self {
        let font = font_family.and_then(|family| catalog.font_position(family));
        Self {
            catalog,
            text: text.into(),
            color,
            font,
            picker: PickerState::None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> &ColorValue {
        &self.color
    }

    pub fn font(&self) -> Option<&FontDescriptor> {
        self.font.and_then(|idx| self.catalog.font(idx))
    }

    pub fn font_index(&self) -> Option<usize> {
        self.font
    }

    pub fn picker(&self) -> PickerState {
        self.picker
    }

    pub fn is_color_picker_open(&self) -> bool {
        self.picker == PickerState::ColorPicker
    }

    pub fn is_font_picker_open(&self) -> bool {
        self.picker == PickerState::FontPicker
    }

    /// Catalog position of the current color, used for the active-swatch ring.
    pub fn active_swatch(&self) -> Option<usize> {
        self.catalog.color_position(&self.color)
    }

    /// Returns whether the draft text actually changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        true
    }

    pub fn set_color(&mut self, color: ColorValue) {
        self.color = color;
    }

    pub fn set_font(&mut self, family: &str) -> Result<&FontDescriptor> {
        let idx = self
            .catalog
            .font_position(family)
            .ok_or_else(|| Error::UnknownFont(family.to_string()))?;
        self.font = Some(idx);
        Ok(&self.catalog.fonts()[idx])
    }

    pub fn toggle_color_picker(&mut self) -> PickerState {
        self.picker = self.picker.toggled(PickerState::ColorPicker);
        self.picker
    }

    pub fn toggle_font_picker(&mut self) -> PickerState {
        self.picker = self.picker.toggled(PickerState::FontPicker);
        self.picker
    }

    pub fn close_pickers(&mut self) {
        self.picker = PickerState::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{stock_colors, stock_fonts};

    fn session() -> EditSession {
        let catalog = Arc::new(Catalog::new(stock_colors(), stock_fonts()).unwrap());
        EditSession::new(catalog, "caption", ColorValue::from("#ffffff"), Some("Nunito"))
    }

    #[test]
    fn toggles_never_open_both_pickers() {
        // every toggle sequence up to length 6
        for mask in 0u32..(1 << 6) {
            for len in 1..=6 {
                let mut s = session();
                for step in 0..len {
                    if mask & (1 << step) == 0 {
                        s.toggle_color_picker();
                    } else {
                        s.toggle_font_picker();
                    }
                    assert!(!(s.is_color_picker_open() && s.is_font_picker_open()));
                }
            }
        }
    }

    #[test]
    fn toggle_switches_between_pickers() {
        let mut s = session();
        assert_eq!(s.toggle_color_picker(), PickerState::ColorPicker);
        assert_eq!(s.toggle_font_picker(), PickerState::FontPicker);
        assert!(!s.is_color_picker_open());
        assert_eq!(s.toggle_font_picker(), PickerState::None);
    }

    #[test]
    fn initial_font_resolves_against_catalog() {
        let s = session();
        assert_eq!(s.font().map(|f| f.family.as_str()), Some("Nunito"));

        let catalog = Arc::new(Catalog::new(stock_colors(), stock_fonts()).unwrap());
        let unknown = EditSession::new(catalog, "", ColorValue::from(""), Some("Comic Sans"));
        assert!(unknown.font().is_none());
    }

    #[test]
    fn set_font_rejects_unknown_family() {
        let mut s = session();
        assert!(matches!(s.set_font("Comic Sans"), Err(Error::UnknownFont(_))));
        assert_eq!(s.font().map(|f| f.family.as_str()), Some("Nunito"));
        assert_eq!(s.set_font("Oswald").unwrap().family, "Oswald");
    }

    #[test]
    fn active_swatch_tracks_color() {
        let mut s = session();
        assert_eq!(s.active_swatch(), Some(0));
        s.set_color(ColorValue::from("#eb5757"));
        assert_eq!(s.active_swatch(), Some(3));
        s.set_color(ColorValue::from("#123456"));
        assert_eq!(s.active_swatch(), None);
    }

    #[test]
    fn set_text_reports_changes_only() {
        let mut s = session();
        assert!(!s.set_text("caption"));
        assert!(s.set_text("Hello"));
        assert_eq!(s.text(), "Hello");
    }
}
