//! Physical page description: dimensions, print margins and units.

use serde::{Deserialize, Serialize};

use crate::{Bounds, CanvasError, CanvasResult};

/// Physical unit used by every length in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Millimetres.
    #[default]
    Mm,
    /// PostScript points (1/72 inch).
    Pt,
    /// Inches.
    In,
    /// CSS pixels (1/96 inch).
    Px,
}

impl Unit {
    /// Number of points in one unit.
    #[must_use]
    pub fn points_per_unit(self) -> f32 {
        match self {
            Self::Mm => 72.0 / 25.4,
            Self::Pt => 1.0,
            Self::In => 72.0,
            Self::Px => 0.75,
        }
    }

    /// Convert a length in this unit to points.
    #[must_use]
    pub fn to_points(self, value: f32) -> f32 {
        value * self.points_per_unit()
    }

    /// Convert a length in points to this unit.
    #[must_use]
    pub fn from_points(self, points: f32) -> f32 {
        points / self.points_per_unit()
    }

    /// Suffix used for SVG length attributes.
    #[must_use]
    pub fn svg_suffix(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Pt => "pt",
            Self::In => "in",
            Self::Px => "px",
        }
    }
}

/// Construction input for a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Ink extension beyond the trim line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bleed: Option<f32>,
    /// Inset inside which content is guaranteed not to be cut.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<f32>,
    /// Unit of every length above.
    #[serde(default)]
    pub unit: Unit,
}

/// A validated page description for one editing session.
///
/// Only the margins may change after construction, through
/// [`Document::set_margins`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentSpec", into = "DocumentSpec")]
pub struct Document {
    width: f32,
    height: f32,
    bleed: Option<f32>,
    safe: Option<f32>,
    unit: Unit,
}

impl Document {
    /// Validate a spec and build a document.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidDocument`] if a dimension is not
    /// positive, a margin is negative, or a margin leaves no printable area.
    pub fn new(spec: DocumentSpec) -> CanvasResult<Self> {
        if !(spec.width.is_finite() && spec.width > 0.0) {
            return Err(CanvasError::InvalidDocument(format!(
                "width must be positive, got {}",
                spec.width
            )));
        }
        if !(spec.height.is_finite() && spec.height > 0.0) {
            return Err(CanvasError::InvalidDocument(format!(
                "height must be positive, got {}",
                spec.height
            )));
        }
        let shortest = spec.width.min(spec.height);
        check_margin("bleed", spec.bleed, shortest)?;
        check_margin("safe", spec.safe, shortest)?;

        Ok(Self {
            width: spec.width,
            height: spec.height,
            bleed: spec.bleed,
            safe: spec.safe,
            unit: spec.unit,
        })
    }

    /// Page width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Page height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Bleed margin, zero when absent.
    #[must_use]
    pub fn bleed(&self) -> f32 {
        self.bleed.unwrap_or(0.0)
    }

    /// Safe margin, zero when absent.
    #[must_use]
    pub fn safe(&self) -> f32 {
        self.safe.unwrap_or(0.0)
    }

    /// Unit of every length in this document.
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The spec this document was built from.
    #[must_use]
    pub fn spec(&self) -> DocumentSpec {
        DocumentSpec {
            width: self.width,
            height: self.height,
            bleed: self.bleed,
            safe: self.safe,
            unit: self.unit,
        }
    }

    /// Replace the print margins. Placed objects are not affected.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidDocument`] if a margin is invalid; the
    /// document is left unchanged in that case.
    pub fn set_margins(&mut self, bleed: Option<f32>, safe: Option<f32>) -> CanvasResult<()> {
        let shortest = self.width.min(self.height);
        check_margin("bleed", bleed, shortest)?;
        check_margin("safe", safe, shortest)?;
        self.bleed = bleed;
        self.safe = safe;
        Ok(())
    }

    /// The final cut line: the page bounds.
    #[must_use]
    pub fn trim_rect(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }

    /// The trim rectangle expanded by the bleed, if there is one.
    #[must_use]
    pub fn bleed_rect(&self) -> Option<Bounds> {
        let bleed = self.bleed();
        (bleed > 0.0).then(|| self.trim_rect().expand(bleed))
    }

    /// The trim rectangle inset by the safe margin, if there is one.
    #[must_use]
    pub fn safe_rect(&self) -> Option<Bounds> {
        let safe = self.safe();
        (safe > 0.0).then(|| self.trim_rect().inset(safe))
    }

    /// The outermost printed area: the bleed rectangle or the trim.
    #[must_use]
    pub fn bleed_box(&self) -> Bounds {
        self.bleed_rect().unwrap_or_else(|| self.trim_rect())
    }
}

impl TryFrom<DocumentSpec> for Document {
    type Error = CanvasError;

    fn try_from(spec: DocumentSpec) -> CanvasResult<Self> {
        Self::new(spec)
    }
}

impl From<Document> for DocumentSpec {
    fn from(document: Document) -> Self {
        document.spec()
    }
}

fn check_margin(name: &str, margin: Option<f32>, shortest: f32) -> CanvasResult<()> {
    let Some(value) = margin else {
        return Ok(());
    };
    if !(value.is_finite() && value >= 0.0) {
        return Err(CanvasError::InvalidDocument(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    if value * 2.0 >= shortest {
        return Err(CanvasError::InvalidDocument(format!(
            "{name} of {value} leaves no printable area on a {shortest} side"
        )));
    }
    Ok(())
}
