//! # Saorsa Layout Core
//!
//! Document model and interactive engine for print layouts: pages with trim,
//! bleed and safe areas, rectangles, text and clipped images, and an undoable
//! editing session on top of a backend-independent scene graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 layout-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Document Model  │  Engine                  │
//! │  - Presets       │  - Interaction FSM       │
//! │  - Objects       │  - Text layout/overflow  │
//! │  - Layout files  │  - Print guides          │
//! ├─────────────────────────────────────────────┤
//! │  Scene Graph     │  Editor                  │
//! │  - Layers/roles  │  - Commands + history    │
//! │  - Change log    │  - Style repository      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod document;
pub mod editor;
pub mod element;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod model;
pub mod notify;
pub mod preset;
pub mod scene;
pub mod style;
pub mod text;

pub use document::{Document, DocumentSpec, Unit};
pub use editor::Editor;
pub use element::{
    CanvasObject, Color, ImageData, ImageFormat, ImageObject, ImageTransform, ObjectId,
    ObjectKind, RectObject, TextAlign, TextObject, TextStyle,
};
pub use engine::{
    resize_bounds, Engine, EngineConfig, GuideVisibility, Interaction, LayoutView,
    MIN_OBJECT_SIZE,
};
pub use error::{CanvasError, CanvasResult};
pub use event::{Edit, GeometryChange, Modifiers, TextChange};
pub use geometry::{Bounds, Corner, Point};
pub use history::{Command, History};
pub use model::{DocumentModel, LayoutFile, LAYOUT_FILE_VERSION};
pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use preset::{Preset, PresetCatalog};
pub use scene::{
    GuideKind, Layer, Node, NodeId, NodeRole, Primitive, SceneBackend, SceneChange, SceneGraph,
};
pub use style::{JsonStyleRepository, MemoryStyleRepository, StyleRepository};
pub use text::{layout_text, ApproximateMetrics, TextLayout, TextLine, TextMeasure};

/// Layout core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
