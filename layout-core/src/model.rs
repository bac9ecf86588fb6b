//! The document model: a page plus its objects in z-order.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasObject, CanvasResult, Document, ObjectId};

/// Current layout file format version.
pub const LAYOUT_FILE_VERSION: u32 = 1;

/// In-memory representation of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Page description.
    pub document: Document,
    /// Objects bottom to top.
    #[serde(default)]
    objects: Vec<CanvasObject>,
}

impl DocumentModel {
    /// Create an empty model for a document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            objects: Vec::new(),
        }
    }

    /// Objects bottom to top.
    pub fn objects(&self) -> impl Iterator<Item = &CanvasObject> {
        self.objects.iter()
    }

    /// Look up an object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Look up an object mutably.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// Whether the object exists.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Append an object on top. Returns `false` if the id is already used.
    pub fn push(&mut self, object: CanvasObject) -> bool {
        if self.contains(object.id()) {
            return false;
        }
        self.objects.push(object);
        true
    }

    /// Detach an object.
    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<CanvasObject> {
        let idx = self.objects.iter().position(|o| o.id() == id)?;
        Some(self.objects.remove(idx))
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// On-disk form of a [`DocumentModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    /// Format version.
    pub version: u32,
    /// The model.
    #[serde(flatten)]
    pub model: DocumentModel,
}

impl LayoutFile {
    /// Wrap a model for writing.
    #[must_use]
    pub fn new(model: DocumentModel) -> Self {
        Self {
            version: LAYOUT_FILE_VERSION,
            model,
        }
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(self).map_err(CanvasError::Serialization)
    }

    /// Parse and validate a layout file.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the document is invalid,
    /// the version is unsupported, two objects share an id, or an object's
    /// bounds are not finite with a positive size.
    pub fn from_json(json: &str) -> CanvasResult<DocumentModel> {
        let file: Self = serde_json::from_str(json)?;
        if file.version > LAYOUT_FILE_VERSION {
            return Err(CanvasError::InvalidDocument(format!(
                "unsupported layout version {}",
                file.version
            )));
        }
        let mut model = DocumentModel::new(file.model.document);
        for object in file.model.objects {
            let id = object.id();
            if !object.bounds().is_valid() {
                return Err(CanvasError::InvalidDocument(format!(
                    "object {id} has invalid bounds {:?}",
                    object.bounds()
                )));
            }
            if !model.push(object) {
                return Err(CanvasError::InvalidDocument(format!(
                    "duplicate object id {id}"
                )));
            }
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, DocumentSpec};

    fn model() -> DocumentModel {
        DocumentModel::new(
            Document::new(DocumentSpec {
                width: 100.0,
                height: 100.0,
                ..DocumentSpec::default()
            })
            .expect("valid"),
        )
    }

    #[test]
    fn test_push_rejects_duplicate_ids() {
        let mut m = model();
        let obj = CanvasObject::rect(Bounds::new(0.0, 0.0, 1.0, 1.0), None);
        assert!(m.push(obj.clone()));
        assert!(!m.push(obj));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_layout_file_roundtrip_keeps_order() {
        let mut m = model();
        let a = CanvasObject::rect(Bounds::new(0.0, 0.0, 1.0, 1.0), None);
        let b = CanvasObject::rect(Bounds::new(2.0, 2.0, 1.0, 1.0), None);
        let (ida, idb) = (a.id(), b.id());
        m.push(a);
        m.push(b);

        let json = LayoutFile::new(m).to_json().expect("serialize");
        let back = LayoutFile::from_json(&json).expect("parse");
        let ids: Vec<_> = back.objects().map(CanvasObject::id).collect();
        assert_eq!(ids, vec![ida, idb]);
    }

    #[test]
    fn test_layout_file_rejects_degenerate_bounds() {
        let mut m = model();
        m.push(CanvasObject::rect(Bounds::new(0.0, 0.0, 12.5, 7.25), None));
        let json = LayoutFile::new(m).to_json().expect("serialize");
        assert!(LayoutFile::from_json(&json).is_ok());

        let broken = json.replace("12.5", "-5.0").replace("7.25", "0.0");
        let err = LayoutFile::from_json(&broken).expect_err("negative width");
        assert!(matches!(err, CanvasError::InvalidDocument(_)));
    }

    #[test]
    fn test_layout_file_rejects_future_version() {
        let json = r#"{"version":99,"document":{"width":1,"height":1}}"#;
        assert!(LayoutFile::from_json(json).is_err());
    }
}
