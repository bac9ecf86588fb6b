//! Reversible engine mutations.
//!
//! Each command stores the full value before and after the change, so undo
//! and redo never recompute anything. Constructors read the "before" value
//! from the engine and return `None` when the target object does not exist
//! or has the wrong type.

use std::sync::Arc;

use crate::event::{Edit, GeometryChange, TextChange};
use crate::history::Command;
use crate::{
    Bounds, CanvasObject, CanvasResult, Color, Engine, ImageData, ImageTransform, ObjectId,
    TextStyle,
};

/// Add an object on top of the page.
#[derive(Debug, Clone)]
pub struct InsertObject {
    object: CanvasObject,
    inserted: bool,
}

impl InsertObject {
    /// Wrap a new object.
    #[must_use]
    pub fn new(object: CanvasObject) -> Self {
        Self {
            object,
            inserted: false,
        }
    }

    /// Id of the inserted object.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.object.id()
    }
}

impl Command<Engine> for InsertObject {
    fn redo(&mut self, engine: &mut Engine) {
        self.inserted = engine.insert_object(self.object.clone());
    }

    fn undo(&mut self, engine: &mut Engine) {
        // A rejected insert owns nothing on the page.
        if !std::mem::take(&mut self.inserted) {
            return;
        }
        // Keep whatever the object became, so a redo restores it exactly.
        if let Some(object) = engine.remove_object(self.object.id()) {
            self.object = object;
        }
    }

    fn name(&self) -> &str {
        match self.object {
            CanvasObject::Rect(_) => "Add rectangle",
            CanvasObject::Text(_) => "Add text",
            CanvasObject::Image(_) => "Add image",
        }
    }
}

/// Move and/or resize an object.
#[derive(Debug, Clone, PartialEq)]
pub struct SetBounds {
    id: ObjectId,
    before: Bounds,
    after: Bounds,
}

impl SetBounds {
    /// Capture the object's current bounds.
    #[must_use]
    pub fn new(engine: &Engine, id: ObjectId, after: Bounds) -> Option<Self> {
        let before = engine.object(id)?.bounds();
        Some(Self { id, before, after })
    }
}

impl From<GeometryChange> for SetBounds {
    fn from(change: GeometryChange) -> Self {
        Self {
            id: change.id,
            before: change.before,
            after: change.after,
        }
    }
}

impl Command<Engine> for SetBounds {
    fn redo(&mut self, engine: &mut Engine) {
        engine.set_bounds(self.id, self.after);
    }

    fn undo(&mut self, engine: &mut Engine) {
        engine.set_bounds(self.id, self.before);
    }

    fn name(&self) -> &str {
        if (self.before.width, self.before.height) == (self.after.width, self.after.height) {
            "Move"
        } else {
            "Resize"
        }
    }
}

/// Replace a text object's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetText {
    id: ObjectId,
    before: String,
    after: String,
}

impl SetText {
    /// Capture the object's current text.
    #[must_use]
    pub fn new(engine: &Engine, id: ObjectId, after: impl Into<String>) -> Option<Self> {
        let before = engine.object(id)?.as_text()?.text.clone();
        Some(Self {
            id,
            before,
            after: after.into(),
        })
    }
}

impl From<TextChange> for SetText {
    fn from(change: TextChange) -> Self {
        Self {
            id: change.id,
            before: change.before,
            after: change.after,
        }
    }
}

impl Command<Engine> for SetText {
    fn redo(&mut self, engine: &mut Engine) {
        engine.update_text(self.id, &self.after);
    }

    fn undo(&mut self, engine: &mut Engine) {
        engine.update_text(self.id, &self.before);
    }

    fn name(&self) -> &str {
        "Edit text"
    }
}

/// Replace a text object's typography.
#[derive(Debug, Clone, PartialEq)]
pub struct SetTextStyle {
    id: ObjectId,
    before: TextStyle,
    after: TextStyle,
}

impl SetTextStyle {
    /// Capture the object's current style.
    #[must_use]
    pub fn new(engine: &Engine, id: ObjectId, after: TextStyle) -> Option<Self> {
        let before = engine.object(id)?.as_text()?.style.clone();
        Some(Self { id, before, after })
    }
}

impl Command<Engine> for SetTextStyle {
    fn redo(&mut self, engine: &mut Engine) {
        engine.set_text_style(self.id, self.after.clone());
    }

    fn undo(&mut self, engine: &mut Engine) {
        engine.set_text_style(self.id, self.before.clone());
    }

    fn name(&self) -> &str {
        "Text style"
    }
}

/// Change a rectangle's fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFill {
    id: ObjectId,
    before: Option<Color>,
    after: Option<Color>,
}

impl SetFill {
    /// Capture the rectangle's current fill.
    #[must_use]
    pub fn new(engine: &Engine, id: ObjectId, after: Option<Color>) -> Option<Self> {
        let CanvasObject::Rect(rect) = engine.object(id)? else {
            return None;
        };
        Some(Self {
            id,
            before: rect.fill,
            after,
        })
    }
}

impl Command<Engine> for SetFill {
    fn redo(&mut self, engine: &mut Engine) {
        engine.set_fill(self.id, self.after);
    }

    fn undo(&mut self, engine: &mut Engine) {
        engine.set_fill(self.id, self.before);
    }

    fn name(&self) -> &str {
        "Fill"
    }
}

/// Swap an image's pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceImage {
    id: ObjectId,
    before: Arc<ImageData>,
    after: Arc<ImageData>,
}

impl ReplaceImage {
    /// Capture the image's current pixels.
    #[must_use]
    pub fn new(engine: &Engine, id: ObjectId, after: Arc<ImageData>) -> Option<Self> {
        let before = Arc::clone(&engine.object(id)?.as_image()?.data);
        Some(Self { id, before, after })
    }
}

impl Command<Engine> for ReplaceImage {
    fn redo(&mut self, engine: &mut Engine) {
        engine.replace_image(self.id, Arc::clone(&self.after));
    }

    fn undo(&mut self, engine: &mut Engine) {
        engine.replace_image(self.id, Arc::clone(&self.before));
    }

    fn name(&self) -> &str {
        "Replace image"
    }
}

/// Pan or zoom an image inside its frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SetImageTransform {
    id: ObjectId,
    before: ImageTransform,
    after: ImageTransform,
}

impl SetImageTransform {
    /// Capture the image's current transform.
    #[must_use]
    pub fn new(engine: &Engine, id: ObjectId, after: ImageTransform) -> Option<Self> {
        let before = engine.object(id)?.as_image()?.transform;
        Some(Self { id, before, after })
    }
}

impl Command<Engine> for SetImageTransform {
    fn redo(&mut self, engine: &mut Engine) {
        engine.update_image_transform(self.id, self.after);
    }

    fn undo(&mut self, engine: &mut Engine) {
        engine.update_image_transform(self.id, self.before);
    }

    fn name(&self) -> &str {
        "Crop image"
    }
}

/// Change the document's bleed and safe margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetMargins {
    before: (Option<f32>, Option<f32>),
    after: (Option<f32>, Option<f32>),
}

impl SetMargins {
    /// Validate the new margins against the engine's document.
    ///
    /// # Errors
    ///
    /// Returns an error if the margins are invalid for the page.
    pub fn new(engine: &Engine, bleed: Option<f32>, safe: Option<f32>) -> CanvasResult<Self> {
        let mut document = *engine.document();
        let spec = document.spec();
        document.set_margins(bleed, safe)?;
        Ok(Self {
            before: (spec.bleed, spec.safe),
            after: (bleed, safe),
        })
    }
}

impl Command<Engine> for SetMargins {
    fn redo(&mut self, engine: &mut Engine) {
        if let Err(e) = engine.set_margins(self.after.0, self.after.1) {
            tracing::warn!("Failed to reapply margins: {e}");
        }
    }

    fn undo(&mut self, engine: &mut Engine) {
        if let Err(e) = engine.set_margins(self.before.0, self.before.1) {
            tracing::warn!("Failed to restore margins: {e}");
        }
    }

    fn name(&self) -> &str {
        "Margins"
    }
}

/// Turn a completed gesture into the command that replays it.
#[must_use]
pub fn command_for_edit(edit: Edit) -> Box<dyn Command<Engine>> {
    match edit {
        Edit::Geometry(change) => Box::new(SetBounds::from(change)),
        Edit::Text(change) => Box::new(SetText::from(change)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, DocumentSpec, History, ImageFormat};

    fn engine() -> Engine {
        Engine::new(
            Document::new(DocumentSpec {
                width: 100.0,
                height: 100.0,
                bleed: Some(2.0),
                ..DocumentSpec::default()
            })
            .expect("valid"),
        )
    }

    #[test]
    fn test_insert_undo_redo() {
        let mut engine = engine();
        let mut history = History::new();
        let object = CanvasObject::rect(Bounds::new(0.0, 0.0, 5.0, 5.0), None);
        let id = object.id();

        history.push(&mut engine, Box::new(InsertObject::new(object)));
        assert!(engine.object(id).is_some());
        history.undo(&mut engine);
        assert!(engine.object(id).is_none());
        history.redo(&mut engine);
        assert!(engine.object(id).is_some());
        assert_eq!(history.undo_name(), Some("Add rectangle"));
    }

    #[test]
    fn test_rejected_insert_undo_leaves_original() {
        let mut engine = engine();
        let object = CanvasObject::rect(Bounds::new(0.0, 0.0, 10.0, 10.0), None);
        let id = object.id();
        assert!(engine.insert_object(object.clone()));

        let mut duplicate = InsertObject::new(object);
        duplicate.redo(&mut engine);
        duplicate.undo(&mut engine);
        assert!(engine.object(id).is_some());
        assert_eq!(engine.model().len(), 1);
    }

    #[test]
    fn test_set_bounds_names() {
        let mut engine = engine();
        let id = engine.add_rect(Bounds::new(0.0, 0.0, 5.0, 5.0), None);
        let moved = SetBounds::new(&engine, id, Bounds::new(1.0, 1.0, 5.0, 5.0)).expect("exists");
        assert_eq!(moved.name(), "Move");
        let resized = SetBounds::new(&engine, id, Bounds::new(0.0, 0.0, 6.0, 5.0)).expect("exists");
        assert_eq!(resized.name(), "Resize");
    }

    #[test]
    fn test_constructors_reject_wrong_kind() {
        let mut engine = engine();
        let rect = engine.add_rect(Bounds::new(0.0, 0.0, 5.0, 5.0), None);
        assert!(SetText::new(&engine, rect, "x").is_none());
        assert!(SetTextStyle::new(&engine, rect, TextStyle::default()).is_none());
        assert!(SetImageTransform::new(&engine, rect, ImageTransform::default()).is_none());
        let data = Arc::new(ImageData::new(vec![], ImageFormat::Png, 1, 1));
        assert!(ReplaceImage::new(&engine, rect, data).is_none());
        assert!(SetFill::new(&engine, ObjectId::new(), None).is_none());
    }

    #[test]
    fn test_margins_roundtrip() {
        let mut engine = engine();
        let mut history = History::new();
        let cmd = SetMargins::new(&engine, None, Some(4.0)).expect("valid");
        history.push(&mut engine, Box::new(cmd));
        assert!(engine.document().bleed_rect().is_none());
        history.undo(&mut engine);
        assert!((engine.document().bleed() - 2.0).abs() < f32::EPSILON);
        assert!(engine.document().safe_rect().is_none());
        assert!(SetMargins::new(&engine, Some(60.0), None).is_err());
    }

    #[test]
    fn test_fill_roundtrip() {
        let mut engine = engine();
        let mut history = History::new();
        let id = engine.add_rect(Bounds::new(0.0, 0.0, 5.0, 5.0), Some(Color::BLACK));
        let cmd = SetFill::new(&engine, id, Some(Color::WHITE)).expect("rect");
        history.push(&mut engine, Box::new(cmd));
        history.undo(&mut engine);
        match engine.object(id) {
            Some(CanvasObject::Rect(r)) => assert_eq!(r.fill, Some(Color::BLACK)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
