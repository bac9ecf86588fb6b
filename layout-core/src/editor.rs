//! Undoable editing session: an [`Engine`] plus its history and styles.
//!
//! Every mutation goes through a command. Programmatic edits push the
//! command, which applies it; gestures mutate the engine live and record the
//! finished change on pointer-up or commit.

use std::sync::Arc;

use crate::commands::{
    command_for_edit, InsertObject, ReplaceImage, SetBounds, SetFill, SetImageTransform,
    SetMargins, SetText, SetTextStyle,
};
use crate::event::{Edit, Modifiers};
use crate::history::{Command, History};
use crate::style::StyleRepository;
use crate::{
    Bounds, CanvasError, CanvasObject, CanvasResult, Color, Engine, ImageData, ImageTransform,
    ObjectId, Point, TextStyle,
};

/// An engine with undo/redo and a style library.
pub struct Editor {
    engine: Engine,
    history: History<Engine>,
    styles: Box<dyn StyleRepository>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("engine", &self.engine)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: Engine, styles: Box<dyn StyleRepository>) -> Self {
        Self {
            engine,
            history: History::new(),
            styles,
        }
    }

    /// The underlying engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The undo history.
    #[must_use]
    pub fn history(&self) -> &History<Engine> {
        &self.history
    }

    /// Release the engine, discarding history.
    #[must_use]
    pub fn into_engine(self) -> Engine {
        self.engine
    }

    fn push(&mut self, command: Box<dyn Command<Engine>>) {
        self.history.push(&mut self.engine, command);
    }

    fn record(&mut self, edit: Option<Edit>) {
        if let Some(edit) = edit {
            self.history.record(command_for_edit(edit));
        }
    }

    // --- Objects ---

    /// Insert an object. Returns its id.
    ///
    /// An object whose id is already on the page, or whose bounds are
    /// invalid, is not inserted and records no history.
    pub fn insert(&mut self, object: CanvasObject) -> ObjectId {
        let id = object.id();
        if self.engine.object(id).is_some() || !object.bounds().is_valid() {
            tracing::warn!("Not recording rejected insert of {id}");
            return id;
        }
        self.push(Box::new(InsertObject::new(object)));
        id
    }

    /// Insert a rectangle.
    pub fn add_rect(&mut self, bounds: Bounds, fill: Option<Color>) -> ObjectId {
        self.insert(CanvasObject::rect(bounds, fill))
    }

    /// Insert a text block.
    pub fn add_text(&mut self, bounds: Bounds, text: &str, style: TextStyle) -> ObjectId {
        self.insert(CanvasObject::text(bounds, text, style))
    }

    /// Insert an image fitted inside its frame.
    pub fn add_image(&mut self, bounds: Bounds, data: Arc<ImageData>) -> ObjectId {
        self.insert(CanvasObject::image(bounds, data))
    }

    /// Move or resize an object.
    pub fn set_bounds(&mut self, id: ObjectId, bounds: Bounds) -> bool {
        self.push_if(SetBounds::new(&self.engine, id, bounds))
    }

    /// Replace a text object's content.
    pub fn set_text(&mut self, id: ObjectId, text: &str) -> bool {
        self.push_if(SetText::new(&self.engine, id, text))
    }

    /// Replace a text object's typography.
    pub fn set_text_style(&mut self, id: ObjectId, style: TextStyle) -> bool {
        self.push_if(SetTextStyle::new(&self.engine, id, style))
    }

    /// Change a rectangle's fill.
    pub fn set_fill(&mut self, id: ObjectId, fill: Option<Color>) -> bool {
        self.push_if(SetFill::new(&self.engine, id, fill))
    }

    /// Swap an image's pixels. Ignored if the object is gone.
    pub fn replace_image(&mut self, id: ObjectId, data: Arc<ImageData>) -> bool {
        self.push_if(ReplaceImage::new(&self.engine, id, data))
    }

    /// Pan or zoom an image inside its frame.
    pub fn set_image_transform(&mut self, id: ObjectId, transform: ImageTransform) -> bool {
        self.push_if(SetImageTransform::new(&self.engine, id, transform))
    }

    /// Change the print margins.
    ///
    /// # Errors
    ///
    /// Returns an error if the margins are invalid; nothing is recorded.
    pub fn set_margins(&mut self, bleed: Option<f32>, safe: Option<f32>) -> CanvasResult<()> {
        let command = SetMargins::new(&self.engine, bleed, safe)?;
        self.push(Box::new(command));
        Ok(())
    }

    fn push_if<C: Command<Engine> + 'static>(&mut self, command: Option<C>) -> bool {
        match command {
            Some(command) => {
                self.push(Box::new(command));
                true
            }
            None => false,
        }
    }

    // --- Selection and gestures ---

    /// Select an object.
    pub fn select(&mut self, id: ObjectId) {
        let edit = self.engine.select(id);
        self.record(edit);
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        let edit = self.engine.deselect();
        self.record(edit);
    }

    /// Forward a pointer press.
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) {
        let edit = self.engine.on_pointer_down(point, modifiers);
        self.record(edit);
    }

    /// Forward pointer motion.
    pub fn pointer_move(&mut self, point: Point, modifiers: Modifiers) {
        self.engine.on_pointer_move(point, modifiers);
    }

    /// Forward a pointer release; records the finished gesture.
    pub fn pointer_up(&mut self, point: Point, modifiers: Modifiers) {
        let edit = self.engine.on_pointer_up(point, modifiers);
        self.record(edit);
    }

    /// Forward a double click.
    pub fn double_click(&mut self, point: Point) {
        let edit = self.engine.on_double_click(point);
        self.record(edit);
    }

    /// Open the inline editor on a text object.
    pub fn begin_edit(&mut self, id: ObjectId) {
        let edit = self.engine.begin_edit(id);
        self.record(edit);
    }

    /// Replace the inline editor's contents.
    pub fn set_edit_text(&mut self, text: &str) -> bool {
        self.engine.set_edit_text(text)
    }

    /// Close the inline editor and record the text change.
    pub fn commit_edit(&mut self) {
        let edit = self.engine.commit_edit().map(Edit::Text);
        self.record(edit);
    }

    // --- History ---

    /// Undo the last command. An open inline edit is committed first.
    pub fn undo(&mut self) -> bool {
        self.commit_edit();
        self.history.undo(&mut self.engine)
    }

    /// Redo the last undone command.
    pub fn redo(&mut self) -> bool {
        self.commit_edit();
        self.history.redo(&mut self.engine)
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Styles ---

    /// Store a text object's style under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not a text object or the repository
    /// cannot save.
    pub fn save_style(&mut self, name: &str, id: ObjectId) -> CanvasResult<()> {
        let style = self
            .engine
            .object(id)
            .and_then(CanvasObject::as_text)
            .map(|t| t.style.clone())
            .ok_or_else(|| CanvasError::Style(format!("object {id} is not a text object")))?;
        self.styles.save(name, style)
    }

    /// Apply a stored style to a text object as an undoable command.
    ///
    /// Returns `Ok(false)` when the object no longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if no style has that name.
    pub fn apply_style(&mut self, name: &str, id: ObjectId) -> CanvasResult<bool> {
        let style = self
            .styles
            .get(name)
            .ok_or_else(|| CanvasError::Style(format!("unknown style: {name}")))?;
        Ok(self.set_text_style(id, style))
    }

    /// Names of stored styles.
    #[must_use]
    pub fn style_names(&self) -> Vec<String> {
        self.styles.names()
    }
}
