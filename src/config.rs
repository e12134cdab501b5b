use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tracing::warn;

use crate::catalog::{Catalog, ColorValue, FontDescriptor, stock_colors, stock_fonts};
use crate::editor::{DEFAULT_SELECT_ALL_DELAY, EditorProps};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Delay between opening and selecting the whole caption.
    #[serde(with = "humantime_serde")]
    pub select_all_delay: Duration,
    /// Swatches offered by the color picker, in display order.
    pub color_options: Vec<ColorValue>,
    /// Tiles offered by the font picker, in display order.
    pub font_options: Vec<FontDescriptor>,
    /// Directory of font files the local loader resolves web fonts against.
    pub font_directory: Option<PathBuf>,
    /// Also consult fonts installed on the system.
    pub system_fonts: bool,
    pub initial: InitialValues,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct InitialValues {
    pub text: String,
    pub color: ColorValue,
    /// Family name of the initially selected font.
    pub font: Option<String>,
    pub open: bool,
}

impl Default for InitialValues {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: ColorValue::new("#ffffff"),
            font: None,
            open: false,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            select_all_delay: DEFAULT_SELECT_ALL_DELAY,
            color_options: stock_colors(),
            font_options: stock_fonts(),
            font_directory: None,
            system_fonts: true,
            initial: InitialValues::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_yaml::from_str(&s).with_context(|| format!("parsing {}", path.display()))
    }

    /// Validate invariants serde cannot express.
    pub fn validated(self) -> Result<Self> {
        let catalog = self.catalog()?;
        if let Some(family) = &self.initial.font {
            ensure!(
                catalog.font_position(family).is_some(),
                "initial.font {family:?} is not listed in font-options"
            );
        }
        ensure!(
            self.select_all_delay <= Duration::from_secs(10),
            "select-all-delay must be at most 10s"
        );
        for color in self.color_options.iter().chain([&self.initial.color]) {
            if !color.as_str().is_empty() && color.to_srgba().is_none() {
                warn!(%color, "color token is not a hex color; previews may not render it");
            }
        }
        Ok(self)
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::new(self.color_options.clone(), self.font_options.clone())
            .context("invalid color-options/font-options")
    }

    pub fn props(&self) -> EditorProps {
        EditorProps {
            text_value: self.initial.text.clone(),
            text_color: self.initial.color.clone(),
            font_value: self.initial.font.clone(),
            open: self.initial.open,
        }
    }
}
