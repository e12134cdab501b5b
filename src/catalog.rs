use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use palette::{Srgb, Srgba};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Extra presentation properties attached to a font, e.g. `font-style: italic`.
pub type StyleMap = BTreeMap<String, String>;

/// Opaque color token as supplied by the host (a hex string in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ColorValue(String);

impl ColorValue {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the token as a hex color. Tokens that are not hex yield `None`.
    pub fn to_srgba(&self) -> Option<Srgba<u8>> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(rgba) = Srgba::<u8>::from_str(trimmed) {
            return Some(rgba);
        }
        let rgb = Srgb::<u8>::from_str(trimmed).ok()?;
        Some(Srgba::new(rgb.red, rgb.green, rgb.blue, 255))
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColorValue {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Weight as the host describes it: numeric (`700`) or a keyword (`"bold"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(u16),
    Named(String),
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A hosted web-font request in `Family[:variants]` form, e.g. `Oswald:700`
/// or `Poppins:ital,500`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct WebFontQuery {
    raw: String,
    family_len: usize,
}

impl WebFontQuery {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let (family, variants) = match raw.split_once(':') {
            Some((family, variants)) => (family.trim_end(), Some(variants.trim())),
            None => (raw, None),
        };
        if family.is_empty() || variants.is_some_and(str::is_empty) {
            return Err(Error::InvalidWebFontQuery(input.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            family_len: family.len(),
        })
    }

    /// The full query string handed to the loader.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn family(&self) -> &str {
        &self.raw[..self.family_len]
    }

    pub fn variants(&self) -> Option<&str> {
        self.raw
            .get(self.family_len..)
            .and_then(|rest| rest.trim_start().strip_prefix(':'))
            .map(str::trim)
    }
}

impl TryFrom<String> for WebFontQuery {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl FromStr for WebFontQuery {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for WebFontQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FontDescriptor {
    pub family: String,
    #[serde(default)]
    pub web_font_query: Option<WebFontQuery>,
    #[serde(default)]
    pub weight: Option<FontWeight>,
    #[serde(default)]
    pub preview_icon_url: String,
    #[serde(default)]
    pub extra_style: StyleMap,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            web_font_query: None,
            weight: None,
            preview_icon_url: String::new(),
            extra_style: StyleMap::new(),
        }
    }

    pub fn with_web_font(mut self, query: &str) -> Result<Self> {
        self.web_font_query = Some(WebFontQuery::parse(query)?);
        Ok(self)
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_icon(mut self, url: impl Into<String>) -> Self {
        self.preview_icon_url = url.into();
        self
    }

    pub fn with_style(mut self, key: &str, value: &str) -> Self {
        self.extra_style.insert(key.to_string(), value.to_string());
        self
    }
}

/// Read-only option lists the pickers render, in display order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    colors: Vec<ColorValue>,
    fonts: Vec<FontDescriptor>,
}

impl Catalog {
    pub fn new(colors: Vec<ColorValue>, fonts: Vec<FontDescriptor>) -> Result<Self> {
        {
            let mut seen = HashSet::new();
            for color in &colors {
                if !seen.insert(color.as_str()) {
                    return Err(Error::DuplicateColor(color.to_string()));
                }
            }
        }
        {
            let mut seen = HashSet::new();
            for font in &fonts {
                if !seen.insert(font.family.as_str()) {
                    return Err(Error::DuplicateFont(font.family.clone()));
                }
            }
        }
        Ok(Self { colors, fonts })
    }

    pub fn colors(&self) -> &[ColorValue] {
        &self.colors
    }

    pub fn fonts(&self) -> &[FontDescriptor] {
        &self.fonts
    }

    pub fn color_position(&self, color: &ColorValue) -> Option<usize> {
        self.colors.iter().position(|c| c == color)
    }

    pub fn font_position(&self, family: &str) -> Option<usize> {
        self.fonts.iter().position(|f| f.family == family)
    }

    pub fn font(&self, index: usize) -> Option<&FontDescriptor> {
        self.fonts.get(index)
    }

    /// Queries of the entries backed by a hosted web font, in catalog order.
    pub fn web_font_queries(&self) -> Vec<WebFontQuery> {
        self.fonts
            .iter()
            .filter_map(|f| f.web_font_query.clone())
            .collect()
    }
}

const STOCK_ICON_BASE: &str = "https://images.koji-cdn.com/0d36d41d-ba5b-4491-a970-e793864e5bda";

pub fn stock_colors() -> Vec<ColorValue> {
    [
        "#ffffff", "#000000", "#828282", "#eb5757", "#f2994a", "#f2C94c", "#27ae60", "#2d9cdb",
        "#bb6bd9",
    ]
    .into_iter()
    .map(ColorValue::from)
    .collect()
}

pub fn stock_fonts() -> Vec<FontDescriptor> {
    // (family, query, weight, italic, icon)
    let table: [(&str, &str, Option<u16>, bool, &str); 10] = [
        ("Oswald", "Oswald:700", Some(700), false, "azm1i-oswaldBold.png"),
        ("Volkhov", "Volkhov:700", Some(700), true, "0k9y0-volkhovBoldItalic.png"),
        ("Source Sans Pro", "Source Sans Pro", None, false, "q86h4-sourceSansProRegular.png"),
        ("Special Elite", "Special Elite", None, false, "ujnvy-specialElite.png"),
        ("Nunito", "Nunito", None, false, "x8zvh-nunitoSemibold.png"),
        ("Dancing Script", "Dancing Script", None, false, "2ws9c-dancingScriptRegular.png"),
        ("Poppins", "Poppins:ital,500", Some(500), true, "v72ke-poppinsMediumItalic.png"),
        ("Amatic SC", "Amatic SC:700", Some(700), false, "0wah9-amaticScBold.png"),
        ("Permanent Marker", "Permanent Marker", None, false, "s9v1s-permanentMarker.png"),
        ("Abril Fatface", "Abril Fatface", None, false, "4ovrh-abrilFatface.png"),
    ];
    table
        .into_iter()
        .map(|(family, query, weight, italic, icon)| {
            let mut font = FontDescriptor::new(family).with_icon(format!("{STOCK_ICON_BASE}/{icon}"));
            font.web_font_query = WebFontQuery::parse(query).ok();
            font.weight = weight.map(FontWeight::Numeric);
            if italic {
                font = font.with_style("font-style", "italic");
            }
            font
        })
        .collect()
}
