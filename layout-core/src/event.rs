//! Pointer input and the edits gestures produce.

use serde::{Deserialize, Serialize};

use crate::{Bounds, ObjectId};

/// Keyboard modifier keys held during a pointer event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift key is held; keeps the aspect ratio while resizing.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Geometry of an object before and after a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryChange {
    /// Object that moved or was resized.
    pub id: ObjectId,
    /// Bounds when the gesture started.
    pub before: Bounds,
    /// Bounds when the gesture ended.
    pub after: Bounds,
}

/// Text of an object before and after an inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Edited object.
    pub id: ObjectId,
    /// Text before editing began.
    pub before: String,
    /// Committed text.
    pub after: String,
}

/// A completed interactive edit, ready to be recorded in history.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// A move or resize finished.
    Geometry(GeometryChange),
    /// An inline text edit was committed.
    Text(TextChange),
}
