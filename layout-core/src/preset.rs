//! Named document specifications used to seed new documents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, Document, DocumentSpec, Unit};

/// A named document spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable lookup key.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Bleed margin.
    #[serde(default)]
    pub bleed: f32,
    /// Safe margin.
    #[serde(default)]
    pub safe: f32,
    /// Unit of the lengths above.
    #[serde(default)]
    pub unit: Unit,
}

impl Preset {
    fn mm(id: &str, name: &str, width: f32, height: f32, bleed: f32, safe: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            width,
            height,
            bleed,
            safe,
            unit: Unit::Mm,
        }
    }

    /// The preset as a document spec.
    #[must_use]
    pub fn spec(&self) -> DocumentSpec {
        DocumentSpec {
            width: self.width,
            height: self.height,
            bleed: Some(self.bleed),
            safe: Some(self.safe),
            unit: self.unit,
        }
    }

    /// Copy the preset's values into a new document.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidDocument`] if the preset describes an
    /// invalid page.
    pub fn document(&self) -> CanvasResult<Document> {
        Document::new(self.spec())
    }
}

/// An ordered, read-only list of presets.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    /// The built-in print formats, all in millimetres.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                Preset::mm("a3", "A3 Poster", 297.0, 420.0, 3.0, 10.0),
                Preset::mm("a4", "A4", 210.0, 297.0, 3.0, 5.0),
                Preset::mm("a5", "A5 Flyer", 148.0, 210.0, 3.0, 5.0),
                Preset::mm("a6", "A6 Postcard", 105.0, 148.0, 3.0, 4.0),
                Preset::mm("letter", "US Letter", 215.9, 279.4, 3.175, 6.35),
                Preset::mm("legal", "US Legal", 215.9, 355.6, 3.175, 6.35),
                Preset::mm("business-card", "Business Card", 85.0, 55.0, 2.0, 3.0),
                Preset::mm("square", "Square Post", 210.0, 210.0, 3.0, 5.0),
                Preset::mm("dl", "DL Flyer", 99.0, 210.0, 3.0, 5.0),
            ],
        }
    }

    /// Build a catalog from explicit presets.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidPreset`] if an id is empty or repeated,
    /// or a preset does not describe a valid document.
    pub fn with_presets(presets: Vec<Preset>) -> CanvasResult<Self> {
        let mut seen = HashSet::new();
        for preset in &presets {
            if preset.id.trim().is_empty() {
                return Err(CanvasError::InvalidPreset("empty preset id".to_string()));
            }
            if !seen.insert(preset.id.as_str()) {
                return Err(CanvasError::InvalidPreset(format!(
                    "duplicate preset id: {}",
                    preset.id
                )));
            }
            preset
                .document()
                .map_err(|e| CanvasError::InvalidPreset(format!("{}: {e}", preset.id)))?;
        }
        Ok(Self { presets })
    }

    /// Parse a JSON array of presets.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a preset is invalid.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let presets: Vec<Preset> = serde_json::from_str(json)?;
        Self::with_presets(presets)
    }

    /// All presets in catalog order.
    pub fn list(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Look up a preset by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Look up a preset by id, failing when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::PresetNotFound`] for unknown ids.
    pub fn get_by_id(&self, id: &str) -> CanvasResult<&Preset> {
        self.get(id)
            .ok_or_else(|| CanvasError::PresetNotFound(id.to_string()))
    }

    /// Number of presets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
