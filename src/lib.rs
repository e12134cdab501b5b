pub mod autosize;
pub mod callbacks;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod fonts;
pub mod outside;
pub mod session;
pub mod surface;
pub mod visibility;
pub mod tasks {
    pub mod editor;
    pub mod scoped;
}

pub use callbacks::EditorCallbacks;
pub use catalog::{Catalog, ColorValue, FontDescriptor, FontWeight, WebFontQuery};
pub use editor::{CaptionEditor, CaptionStyle, EditorProps, SessionSnapshot};
pub use error::{Error, Result};
pub use events::{EditorCommand, Wakeup};
pub use session::{EditSession, PickerState};
