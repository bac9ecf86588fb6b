//! Font discovery, text measurement and text outlining.

use std::path::PathBuf;
use std::sync::Arc;

use layout_core::text::TextMeasure;
use layout_core::{ApproximateMetrics, TextStyle};
use usvg::fontdb;

use crate::error::{RenderError, RenderResult};
use crate::svg::{escape_xml, text_attrs};

/// Where fonts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    /// Load the fonts installed on the system.
    pub load_system_fonts: bool,
    /// Extra directories scanned for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Family used for the generic `serif`, `sans-serif` and `monospace`
    /// names. When unset and the platform default is missing, the first
    /// loaded family is used.
    pub default_family: Option<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
            default_family: None,
        }
    }
}

/// A loaded font database shared by measurement, rasterisation and
/// outlining.
#[derive(Clone)]
pub struct FontContext {
    db: Arc<fontdb::Database>,
}

impl std::fmt::Debug for FontContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontContext")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontContext {
    /// Load fonts as configured.
    #[must_use]
    pub fn new(config: &FontConfig) -> Self {
        let mut db = fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.font_dirs {
            if dir.is_dir() {
                db.load_fonts_dir(dir);
            } else {
                tracing::warn!("Font directory {} does not exist", dir.display());
            }
        }

        if let Some(family) = fallback_family(&db, config.default_family.as_deref()) {
            tracing::debug!("Using {family} for generic font families");
            db.set_serif_family(family.clone());
            db.set_sans_serif_family(family.clone());
            db.set_monospace_family(family);
        }

        if db.is_empty() {
            tracing::warn!("No fonts loaded; text will not render and cannot be outlined");
        } else {
            tracing::debug!("Loaded {} font faces", db.len());
        }
        Self { db: Arc::new(db) }
    }

    /// A context with no fonts at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// Number of loaded font faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Whether any font is available.
    #[must_use]
    pub fn has_fonts(&self) -> bool {
        !self.db.is_empty()
    }

    /// Measurement backed by these fonts.
    #[must_use]
    pub fn measure(&self) -> FontMeasure {
        FontMeasure {
            fonts: self.clone(),
            fallback: ApproximateMetrics::default(),
        }
    }

    /// Parse SVG markup with these fonts.
    pub(crate) fn parse(&self, svg: &str) -> RenderResult<usvg::Tree> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.db),
            ..Default::default()
        };
        usvg::Tree::from_str(svg, &options)
            .map_err(|e| RenderError::Surface(format!("SVG parsing failed: {e}")))
    }

    /// Convert the `<text>` elements of an SVG fragment into glyph paths.
    ///
    /// `id_prefix` keeps generated ids unique when several fragments end up
    /// in one document.
    pub(crate) fn outline_fragment(
        &self,
        fragment: &str,
        id_prefix: &str,
        text: &str,
    ) -> RenderResult<String> {
        // A 1x1 viewport with a matching viewBox keeps user space untouched.
        let standalone = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1\" height=\"1\" viewBox=\"0 0 1 1\">{fragment}</svg>"
        );
        let tree = self.parse(&standalone)?;
        let written = tree.to_string(&usvg::WriteOptions {
            id_prefix: Some(id_prefix.to_string()),
            preserve_text: false,
            ..Default::default()
        });
        let inner = strip_root(&written);

        if text.chars().any(|c| !c.is_whitespace()) && !inner.contains("<path") {
            return Err(RenderError::Outline(format!(
                "no font could outline {:?}",
                truncate(text, 32)
            )));
        }
        Ok(inner.to_string())
    }
}

fn fallback_family(db: &fontdb::Database, configured: Option<&str>) -> Option<String> {
    if let Some(family) = configured {
        return Some(family.to_string());
    }
    let sans = db.family_name(&fontdb::Family::SansSerif).to_string();
    let has_default = db
        .faces()
        .any(|face| face.families.iter().any(|(name, _)| *name == sans));
    if has_default {
        return None;
    }
    db.faces()
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
}

/// Content between the root `<svg ...>` and `</svg>`.
fn strip_root(svg: &str) -> &str {
    let Some(start) = svg.find("<svg") else {
        return "";
    };
    let Some(open_end) = svg[start..].find('>').map(|i| start + i) else {
        return "";
    };
    if svg[..open_end].ends_with('/') {
        return "";
    }
    let close = svg.rfind("</svg>").unwrap_or(svg.len());
    if close <= open_end {
        return "";
    }
    svg[open_end + 1..close].trim()
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// [`TextMeasure`] using real glyph advances, falling back to
/// [`ApproximateMetrics`] when no font covers the text.
#[derive(Debug, Clone)]
pub struct FontMeasure {
    fonts: FontContext,
    fallback: ApproximateMetrics,
}

impl FontMeasure {
    fn shaped_width(&self, text: &str, style: &TextStyle, font_size: f32) -> Option<f32> {
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1\" height=\"1\" viewBox=\"0 0 1 1\"><text x=\"0\" y=\"{font_size}\" {}>{}</text></svg>",
            text_attrs(style, font_size),
            escape_xml(text),
        );
        let tree = self.fonts.parse(&svg).ok()?;
        tree.root().children().iter().find_map(|node| match node {
            usvg::Node::Text(text) => Some(text.bounding_box().width()),
            _ => None,
        })
    }
}

impl TextMeasure for FontMeasure {
    fn line_width(&self, text: &str, style: &TextStyle, font_size: f32) -> f32 {
        if text.trim().is_empty() || !self.fonts.has_fonts() {
            return self.fallback.line_width(text, style, font_size);
        }
        self.shaped_width(text, style, font_size).unwrap_or_else(|| {
            tracing::trace!("No shaped width for {:?}, approximating", truncate(text, 16));
            self.fallback.line_width(text, style, font_size)
        })
    }
}
