use crate::catalog::ColorValue;
use crate::error::Error;
use crate::fonts::LoadedFonts;
use crate::outside::InteractiveRegions;

/// Host and presentation-layer input to a mounted editor.
#[derive(Debug, Clone)]
pub enum EditorCommand {
    /// Current value of the host-owned `open` flag.
    SetOpen(bool),
    /// The text input now holds this value.
    Input(String),
    /// The text input lost focus.
    Blur,
    PickColor(ColorValue),
    PickFont(String),
    ToggleColorPicker,
    ToggleFontPicker,
    Layout(InteractiveRegions),
}

/// Completions delivered back to the editor by its own background tasks.
#[derive(Debug)]
pub enum Wakeup {
    SelectAllDue { generation: u64 },
    FontsLoaded(Result<LoadedFonts, Error>),
}
