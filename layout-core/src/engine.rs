//! The interactive layout engine.
//!
//! Owns the [`DocumentModel`] and a [`SceneGraph`] bound to it 1:1, plus the
//! transient interaction state: selection, drag/resize gestures and the
//! inline text editor. All mutations are synchronous; operations naming an
//! unknown object id are ignored so late callbacks never fail.

use std::collections::HashMap;
use std::sync::Arc;

use crate::event::{Edit, GeometryChange, Modifiers, TextChange};
use crate::scene::{GuideKind, Layer, Node, NodeId, NodeRole, Primitive, SceneChange, SceneGraph};
use crate::text::{layout_text, ApproximateMetrics, TextLayout, TextMeasure};
use crate::{
    Bounds, CanvasObject, CanvasResult, Color, Corner, Document, DocumentModel, ImageData,
    ImageTransform, ObjectId, Point, TextStyle,
};

/// Smallest width or height an interactive resize can produce.
pub const MIN_OBJECT_SIZE: f32 = 1.0;

const SELECTION_COLOR: Color = Color::rgb(0x0a, 0x84, 0xff);
const OVERFLOW_COLOR: Color = Color::rgb(0xe5, 0x48, 0x4d);
const BLEED_COLOR: Color = Color::rgb(0xe5, 0x48, 0x4d);
const SAFE_COLOR: Color = Color::rgb(0x30, 0xa4, 0x6c);
const TRIM_COLOR: Color = Color::rgb(0x44, 0x44, 0x44);

/// Which print guides are drawn.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideVisibility {
    /// Trim outline.
    pub trim: bool,
    /// Bleed outline.
    pub bleed: bool,
    /// Safe-area outline.
    pub safe: bool,
}

impl Default for GuideVisibility {
    fn default() -> Self {
        Self {
            trim: true,
            bleed: true,
            safe: true,
        }
    }
}

impl GuideVisibility {
    fn get(&self, kind: GuideKind) -> bool {
        match kind {
            GuideKind::Trim => self.trim,
            GuideKind::Bleed => self.bleed,
            GuideKind::Safe => self.safe,
        }
    }

    fn set(&mut self, kind: GuideKind, visible: bool) {
        match kind {
            GuideKind::Trim => self.trim = visible,
            GuideKind::Bleed => self.bleed = visible,
            GuideKind::Safe => self.safe = visible,
        }
    }
}

/// Sizes of interface decorations, in document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Side of a square resize handle.
    pub handle_size: f32,
    /// Side of the text overflow marker.
    pub indicator_size: f32,
    /// Stroke width of selection and guide outlines.
    pub stroke_width: f32,
    /// Guides shown when the engine starts.
    pub guides: GuideVisibility,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handle_size: 2.0,
            indicator_size: 3.0,
            stroke_width: 0.3,
            guides: GuideVisibility::default(),
        }
    }
}

/// The interaction state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Nothing selected.
    Idle,
    /// One object selected, no gesture in progress.
    Selected {
        /// Selected object.
        id: ObjectId,
    },
    /// Pointer held on the selected object; moves it on drag.
    Moving {
        /// Selected object.
        id: ObjectId,
        /// Pointer position at pointer-down.
        start_pointer: Point,
        /// Object bounds at pointer-down.
        start: Bounds,
    },
    /// Pointer held on a resize handle.
    Resizing {
        /// Selected object.
        id: ObjectId,
        /// Handle being dragged.
        corner: Corner,
        /// Pointer position at pointer-down.
        start_pointer: Point,
        /// Object bounds at pointer-down.
        start: Bounds,
    },
    /// Inline text editing.
    Editing {
        /// Object being edited.
        id: ObjectId,
        /// Edit surface node.
        surface: NodeId,
        /// Text before editing began.
        original: String,
        /// Current editor contents.
        buffer: String,
    },
}

impl Interaction {
    /// The selected object, in every state but `Idle`.
    #[must_use]
    pub fn selected(&self) -> Option<ObjectId> {
        match self {
            Self::Idle => None,
            Self::Selected { id }
            | Self::Moving { id, .. }
            | Self::Resizing { id, .. }
            | Self::Editing { id, .. } => Some(*id),
        }
    }
}

/// Interface nodes drawn for the current selection.
#[derive(Debug, Clone)]
struct SelectionNodes {
    owner: ObjectId,
    frame: NodeId,
    handles: Vec<(Corner, NodeId)>,
    overflow: Option<NodeId>,
}

/// Compute new bounds for a corner drag.
///
/// The corner opposite the dragged one stays fixed. With `keep_aspect`, the
/// axis with the larger pointer delta drives the size and the other
/// dimension follows the starting aspect ratio. Sizes are clamped to
/// [`MIN_OBJECT_SIZE`].
#[must_use]
pub fn resize_bounds(start: Bounds, corner: Corner, dx: f32, dy: f32, keep_aspect: bool) -> Bounds {
    let dw = if corner.is_left() { -dx } else { dx };
    let dh = if corner.is_top() { -dy } else { dy };

    let mut width = start.width + dw;
    let mut height = start.height + dh;

    if keep_aspect && start.height > 0.0 {
        let aspect = start.width / start.height;
        if dw.abs() >= dh.abs() {
            height = width / aspect;
        } else {
            width = height * aspect;
        }
    }

    let width = width.max(MIN_OBJECT_SIZE);
    let height = height.max(MIN_OBJECT_SIZE);
    let x = if corner.is_left() {
        start.right() - width
    } else {
        start.x
    };
    let y = if corner.is_top() {
        start.bottom() - height
    } else {
        start.y
    };
    Bounds::new(x, y, width, height)
}

/// Read-only snapshot handed to exporters.
#[derive(Debug, Clone, Copy)]
pub struct LayoutView<'a> {
    /// Page description.
    pub document: &'a Document,
    /// The scene; exporters draw only its content layer.
    pub scene: &'a SceneGraph,
}

fn stale(id: ObjectId, op: &str) -> bool {
    tracing::debug!("Ignoring {op} for unknown object {id}");
    false
}

/// The interactive scene for one open document.
pub struct Engine {
    model: DocumentModel,
    scene: SceneGraph,
    bindings: HashMap<ObjectId, NodeId>,
    layouts: HashMap<ObjectId, TextLayout>,
    selection: Option<SelectionNodes>,
    guides: HashMap<GuideKind, NodeId>,
    guide_visibility: GuideVisibility,
    interaction: Interaction,
    config: EngineConfig,
    measure: Box<dyn TextMeasure>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("document", &self.model.document)
            .field("objects", &self.model.len())
            .field("nodes", &self.scene.len())
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine for an empty document with approximate text metrics.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self::with_config(
            DocumentModel::new(document),
            EngineConfig::default(),
            Box::new(ApproximateMetrics::default()),
        )
    }

    /// Create an engine for an existing model.
    #[must_use]
    pub fn with_config(
        model: DocumentModel,
        config: EngineConfig,
        measure: Box<dyn TextMeasure>,
    ) -> Self {
        let mut engine = Self {
            model: DocumentModel::new(model.document),
            scene: SceneGraph::new(),
            bindings: HashMap::new(),
            layouts: HashMap::new(),
            selection: None,
            guides: HashMap::new(),
            guide_visibility: config.guides,
            interaction: Interaction::Idle,
            config,
            measure,
        };
        for object in model.objects() {
            engine.insert_object(object.clone());
        }
        engine.refresh_guides();
        engine
    }

    // --- Queries ---

    /// The page description.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.model.document
    }

    /// The document model.
    #[must_use]
    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    /// The retained scene.
    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Snapshot for export.
    #[must_use]
    pub fn view(&self) -> LayoutView<'_> {
        LayoutView {
            document: &self.model.document,
            scene: &self.scene,
        }
    }

    /// Look up an object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.model.get(id)
    }

    /// Objects bottom to top.
    pub fn objects(&self) -> impl Iterator<Item = &CanvasObject> {
        self.model.objects()
    }

    /// The current interaction state.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// The selected object.
    #[must_use]
    pub fn selected(&self) -> Option<ObjectId> {
        self.interaction.selected()
    }

    /// The scene node rendering an object.
    #[must_use]
    pub fn node_for(&self, id: ObjectId) -> Option<&Node> {
        self.bindings.get(&id).and_then(|n| self.scene.get(*n))
    }

    /// Layout of a text object as last measured.
    #[must_use]
    pub fn text_layout(&self, id: ObjectId) -> Option<&TextLayout> {
        self.layouts.get(&id)
    }

    /// Whether a text object's rendered extent exceeds its box.
    #[must_use]
    pub fn overflows(&self, id: ObjectId) -> bool {
        match (self.model.get(id), self.layouts.get(&id)) {
            (Some(CanvasObject::Text(t)), Some(layout)) => layout.overflows(t.width, t.height),
            _ => false,
        }
    }

    /// The overflow marker currently drawn, if any.
    #[must_use]
    pub fn overflow_indicator(&self) -> Option<&Node> {
        self.selection
            .as_ref()
            .and_then(|s| s.overflow)
            .and_then(|n| self.scene.get(n))
    }

    /// Resize handles currently drawn.
    pub fn handles(&self) -> impl Iterator<Item = &Node> {
        self.selection
            .iter()
            .flat_map(|s| s.handles.iter())
            .filter_map(|(_, n)| self.scene.get(*n))
    }

    /// The inline editor node and its current contents.
    #[must_use]
    pub fn edit_surface(&self) -> Option<(&Node, &str)> {
        match &self.interaction {
            Interaction::Editing {
                surface, buffer, ..
            } => self.scene.get(*surface).map(|n| (n, buffer.as_str())),
            _ => None,
        }
    }

    /// Whether a guide is drawn.
    #[must_use]
    pub fn guide_visible(&self, kind: GuideKind) -> bool {
        self.guide_visibility.get(kind)
    }

    /// The guide node of a kind, if drawn.
    #[must_use]
    pub fn guide(&self, kind: GuideKind) -> Option<&Node> {
        self.guides.get(&kind).and_then(|n| self.scene.get(*n))
    }

    /// Drain scene changes since the last call.
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        self.scene.take_changes()
    }

    /// Drain scene changes into a backend.
    pub fn flush(&mut self, backend: &mut dyn crate::SceneBackend) {
        self.scene.flush(backend);
    }

    // --- Objects ---

    /// Add an object on top of the page.
    ///
    /// Returns `false` if its id exists or its bounds are not finite with a
    /// positive size.
    pub fn insert_object(&mut self, object: CanvasObject) -> bool {
        let id = object.id();
        if !object.bounds().is_valid() {
            tracing::warn!("Ignoring insert of {id} with invalid bounds {:?}", object.bounds());
            return false;
        }
        if !self.model.push(object) {
            tracing::warn!("Ignoring insert of duplicate object {id}");
            return false;
        }
        self.relayout(id);
        let primitive = self.primitive_for(id);
        if let Some(primitive) = primitive {
            let node = self
                .scene
                .insert(Layer::Content, NodeRole::Object, Some(id), true, primitive);
            self.bindings.insert(id, node);
        }
        tracing::debug!("Inserted object {id}");
        true
    }

    /// Add a rectangle.
    pub fn add_rect(&mut self, bounds: Bounds, fill: Option<Color>) -> ObjectId {
        let object = CanvasObject::rect(bounds, fill);
        let id = object.id();
        self.insert_object(object);
        id
    }

    /// Add a text block.
    pub fn add_text(&mut self, bounds: Bounds, text: &str, style: TextStyle) -> ObjectId {
        let object = CanvasObject::text(bounds, text, style);
        let id = object.id();
        self.insert_object(object);
        id
    }

    /// Add an image fitted inside its frame.
    pub fn add_image(&mut self, bounds: Bounds, data: Arc<ImageData>) -> ObjectId {
        let object = CanvasObject::image(bounds, data);
        let id = object.id();
        self.insert_object(object);
        id
    }

    /// Detach an object and its nodes. Used to reverse an insert.
    pub(crate) fn remove_object(&mut self, id: ObjectId) -> Option<CanvasObject> {
        if self.selected() == Some(id) {
            if let Interaction::Editing { surface, .. } = self.interaction {
                self.scene.remove(surface);
            }
            self.clear_selection_nodes();
            self.interaction = Interaction::Idle;
        }
        if let Some(node) = self.bindings.remove(&id) {
            self.scene.remove(node);
        }
        self.layouts.remove(&id);
        self.model.remove(id)
    }

    /// Move and resize an object. Images keep their transform.
    pub fn set_bounds(&mut self, id: ObjectId, bounds: Bounds) -> bool {
        let Some(object) = self.model.get_mut(id) else {
            return stale(id, "set_bounds");
        };
        object.set_bounds(bounds);
        self.refresh_object(id);
        true
    }

    /// Replace a text object's content.
    pub fn update_text(&mut self, id: ObjectId, text: &str) -> bool {
        match self.model.get_mut(id) {
            Some(CanvasObject::Text(t)) => t.text = text.to_string(),
            _ => return stale(id, "update_text"),
        }
        self.refresh_object(id);
        true
    }

    /// Replace a text object's typography.
    pub fn set_text_style(&mut self, id: ObjectId, style: TextStyle) -> bool {
        match self.model.get_mut(id) {
            Some(CanvasObject::Text(t)) => t.style = style,
            _ => return stale(id, "set_text_style"),
        }
        self.refresh_object(id);
        true
    }

    /// Change a rectangle's fill.
    pub fn set_fill(&mut self, id: ObjectId, fill: Option<Color>) -> bool {
        match self.model.get_mut(id) {
            Some(CanvasObject::Rect(r)) => r.fill = fill,
            _ => return stale(id, "set_fill"),
        }
        self.refresh_object(id);
        true
    }

    /// Swap an image's pixels without touching its frame or transform.
    pub fn replace_image(&mut self, id: ObjectId, data: Arc<ImageData>) -> bool {
        match self.model.get_mut(id) {
            Some(CanvasObject::Image(i)) => i.data = data,
            _ => return stale(id, "replace_image"),
        }
        self.refresh_object(id);
        true
    }

    /// Pan/zoom an image inside its fixed clip rectangle.
    pub fn update_image_transform(&mut self, id: ObjectId, transform: ImageTransform) -> bool {
        match self.model.get_mut(id) {
            Some(CanvasObject::Image(i)) => i.transform = transform,
            _ => return stale(id, "update_image_transform"),
        }
        self.refresh_object(id);
        true
    }

    // --- Document ---

    /// Change the print margins and redraw the guides.
    ///
    /// # Errors
    ///
    /// Returns an error if the margins are invalid for the page.
    pub fn set_margins(&mut self, bleed: Option<f32>, safe: Option<f32>) -> CanvasResult<()> {
        self.model.document.set_margins(bleed, safe)?;
        self.refresh_guides();
        Ok(())
    }

    /// Show or hide one guide.
    pub fn set_guide_visible(&mut self, kind: GuideKind, visible: bool) {
        self.guide_visibility.set(kind, visible);
        self.refresh_guides();
    }

    // --- Selection ---

    /// Select an object, committing any inline edit first.
    ///
    /// Unknown ids are ignored and leave the selection unchanged.
    pub fn select(&mut self, id: ObjectId) -> Option<Edit> {
        if !self.model.contains(id) {
            stale(id, "select");
            return None;
        }
        let committed = self.commit_edit().map(Edit::Text);
        self.clear_selection_nodes();
        self.interaction = Interaction::Selected { id };
        self.draw_selection(id);
        tracing::debug!("Selected {id}");
        committed
    }

    /// Clear the selection, committing any inline edit first.
    pub fn deselect(&mut self) -> Option<Edit> {
        let committed = self.commit_edit().map(Edit::Text);
        self.clear_selection_nodes();
        self.interaction = Interaction::Idle;
        committed
    }

    // --- Pointer input ---

    /// Handle a pointer press.
    ///
    /// Pressing a handle of the selected object starts a resize; pressing an
    /// object selects it and starts a move; pressing empty space deselects.
    /// Pressing outside an active edit surface commits the edit, which is
    /// returned.
    pub fn on_pointer_down(&mut self, point: Point, _modifiers: Modifiers) -> Option<Edit> {
        if let Interaction::Editing { surface, .. } = &self.interaction {
            let inside = self
                .scene
                .get(*surface)
                .is_some_and(|n| n.primitive.bounds().contains(point));
            if inside {
                return None;
            }
        }
        let committed = self.commit_edit().map(Edit::Text);

        let hit = self
            .scene
            .hit_test(point)
            .map(|n| (n.role, n.owner));

        match hit {
            Some((NodeRole::Handle(corner), Some(owner))) if self.selected() == Some(owner) => {
                if let Some(start) = self.model.get(owner).map(CanvasObject::bounds) {
                    self.interaction = Interaction::Resizing {
                        id: owner,
                        corner,
                        start_pointer: point,
                        start,
                    };
                    tracing::debug!("Resizing {owner} from {corner:?}");
                }
            }
            Some((NodeRole::Object, Some(owner))) => {
                if self.selected() != Some(owner) {
                    self.clear_selection_nodes();
                    self.draw_selection(owner);
                }
                if let Some(start) = self.model.get(owner).map(CanvasObject::bounds) {
                    self.interaction = Interaction::Moving {
                        id: owner,
                        start_pointer: point,
                        start,
                    };
                }
            }
            _ => {
                self.clear_selection_nodes();
                self.interaction = Interaction::Idle;
            }
        }
        committed
    }

    /// Handle pointer motion while a gesture is active.
    pub fn on_pointer_move(&mut self, point: Point, modifiers: Modifiers) {
        match self.interaction {
            Interaction::Resizing {
                id,
                corner,
                start_pointer,
                start,
                ..
            } => {
                let bounds = resize_bounds(
                    start,
                    corner,
                    point.x - start_pointer.x,
                    point.y - start_pointer.y,
                    modifiers.shift,
                );
                self.set_bounds(id, bounds);
            }
            Interaction::Moving {
                id,
                start_pointer,
                start,
            } => {
                let bounds = Bounds::new(
                    start.x + point.x - start_pointer.x,
                    start.y + point.y - start_pointer.y,
                    start.width,
                    start.height,
                );
                self.set_bounds(id, bounds);
            }
            _ => {}
        }
    }

    /// Finish the active gesture. Returns the geometry change, if any.
    pub fn on_pointer_up(&mut self, _point: Point, _modifiers: Modifiers) -> Option<Edit> {
        let (id, start) = match self.interaction {
            Interaction::Resizing { id, start, .. } | Interaction::Moving { id, start, .. } => {
                (id, start)
            }
            _ => return None,
        };
        self.interaction = Interaction::Selected { id };
        let after = self.model.get(id).map(CanvasObject::bounds)?;
        (after != start).then_some(Edit::Geometry(GeometryChange {
            id,
            before: start,
            after,
        }))
    }

    /// Handle a double click: opens the inline editor on a text object.
    pub fn on_double_click(&mut self, point: Point) -> Option<Edit> {
        let owner = self
            .scene
            .hit_test(point)
            .filter(|n| n.role == NodeRole::Object)
            .and_then(|n| n.owner)?;
        if self.model.get(owner).and_then(CanvasObject::as_text).is_none() {
            return None;
        }
        self.begin_edit(owner)
    }

    // --- Inline editing ---

    /// Open the inline editor on a text object, committing any other edit.
    pub fn begin_edit(&mut self, id: ObjectId) -> Option<Edit> {
        let Some(text) = self.model.get(id).and_then(CanvasObject::as_text).cloned() else {
            stale(id, "begin_edit");
            return None;
        };
        if matches!(&self.interaction, Interaction::Editing { id: editing, .. } if *editing == id) {
            return None;
        }
        let committed = self.commit_edit().map(Edit::Text);
        if self.selected() != Some(id) {
            self.clear_selection_nodes();
            self.draw_selection(id);
        }

        let layout = self.layout_for(&text.text, &text.style, text.width);
        let surface = self.scene.insert(
            Layer::Interface,
            NodeRole::EditSurface,
            Some(id),
            true,
            Primitive::Text {
                bounds: Bounds::new(text.x, text.y, text.width, text.height),
                text: text.text.clone(),
                layout,
                style: text.style.clone(),
            },
        );
        self.interaction = Interaction::Editing {
            id,
            surface,
            original: text.text.clone(),
            buffer: text.text,
        };
        tracing::debug!("Editing text {id}");
        committed
    }

    /// Replace the inline editor's contents.
    pub fn set_edit_text(&mut self, text: &str) -> bool {
        let (surface, bounds, style) = match &mut self.interaction {
            Interaction::Editing {
                surface, buffer, ..
            } => {
                *buffer = text.to_string();
                let Some(Primitive::Text { bounds, style, .. }) =
                    self.scene.get(*surface).map(|n| &n.primitive)
                else {
                    return false;
                };
                (*surface, *bounds, style.clone())
            }
            _ => return false,
        };
        let layout = self.layout_for(text, &style, bounds.width);
        self.scene.update(
            surface,
            Primitive::Text {
                bounds,
                text: text.to_string(),
                layout,
                style,
            },
        );
        true
    }

    /// Close the inline editor, writing its contents to the object.
    ///
    /// Returns the change when the text differs from the original.
    pub fn commit_edit(&mut self) -> Option<TextChange> {
        if !matches!(self.interaction, Interaction::Editing { .. }) {
            return None;
        }
        let Interaction::Editing {
            id,
            surface,
            original,
            buffer,
        } = std::mem::replace(&mut self.interaction, Interaction::Idle)
        else {
            return None;
        };
        self.scene.remove(surface);
        self.interaction = Interaction::Selected { id };

        if !self.model.contains(id) {
            self.interaction = Interaction::Idle;
            return None;
        }
        self.update_text(id, &buffer);
        (buffer != original).then_some(TextChange {
            id,
            before: original,
            after: buffer,
        })
    }

    /// Close the inline editor without changing the object.
    pub fn cancel_edit(&mut self) {
        if let Interaction::Editing { id, surface, .. } = self.interaction {
            self.scene.remove(surface);
            self.interaction = Interaction::Selected { id };
        }
    }

    // --- Internals ---

    fn layout_for(&self, text: &str, style: &TextStyle, width: f32) -> TextLayout {
        layout_text(
            text,
            style,
            width,
            self.model.document.unit(),
            self.measure.as_ref(),
        )
    }

    fn relayout(&mut self, id: ObjectId) {
        let layout = match self.model.get(id) {
            Some(CanvasObject::Text(t)) => Some(self.layout_for(&t.text, &t.style, t.width)),
            _ => None,
        };
        match layout {
            Some(layout) => {
                self.layouts.insert(id, layout);
            }
            None => {
                self.layouts.remove(&id);
            }
        }
    }

    fn primitive_for(&self, id: ObjectId) -> Option<Primitive> {
        let primitive = match self.model.get(id)? {
            CanvasObject::Rect(r) => Primitive::Rect {
                bounds: Bounds::new(r.x, r.y, r.width, r.height),
                fill: r.fill,
            },
            CanvasObject::Text(t) => Primitive::Text {
                bounds: Bounds::new(t.x, t.y, t.width, t.height),
                text: t.text.clone(),
                layout: self.layouts.get(&id)?.clone(),
                style: t.style.clone(),
            },
            CanvasObject::Image(i) => Primitive::Image {
                clip: Bounds::new(i.x, i.y, i.width, i.height),
                content: i.content_bounds(),
                data: Arc::clone(&i.data),
            },
        };
        Some(primitive)
    }

    /// Re-measure, redraw and re-decorate an object after a mutation.
    fn refresh_object(&mut self, id: ObjectId) {
        self.relayout(id);
        if let (Some(node), Some(primitive)) = (self.bindings.get(&id).copied(), self.primitive_for(id)) {
            self.scene.update(node, primitive);
        }
        if self.selection.as_ref().is_some_and(|s| s.owner == id) {
            self.update_selection_nodes(id);
        }
    }

    fn draw_selection(&mut self, id: ObjectId) {
        let mut nodes = SelectionNodes {
            owner: id,
            frame: self.scene.insert(
                Layer::Interface,
                NodeRole::SelectionBox,
                Some(id),
                false,
                Primitive::Outline {
                    bounds: Bounds::default(),
                    stroke: SELECTION_COLOR,
                    stroke_width: self.config.stroke_width,
                    dashed: false,
                },
            ),
            handles: Vec::with_capacity(4),
            overflow: None,
        };
        for corner in Corner::ALL {
            let node = self.scene.insert(
                Layer::Interface,
                NodeRole::Handle(corner),
                Some(id),
                true,
                Primitive::Rect {
                    bounds: Bounds::default(),
                    fill: Some(SELECTION_COLOR),
                },
            );
            nodes.handles.push((corner, node));
        }
        self.selection = Some(nodes);
        self.update_selection_nodes(id);
    }

    fn update_selection_nodes(&mut self, id: ObjectId) {
        let Some(bounds) = self.model.get(id).map(CanvasObject::bounds) else {
            return;
        };
        let overflowing = self.overflows(id);
        let Some(selection) = self.selection.as_mut() else {
            return;
        };

        self.scene.update(
            selection.frame,
            Primitive::Outline {
                bounds,
                stroke: SELECTION_COLOR,
                stroke_width: self.config.stroke_width,
                dashed: false,
            },
        );
        for (corner, node) in &selection.handles {
            self.scene.update(
                *node,
                Primitive::Rect {
                    bounds: Bounds::centered(bounds.corner(*corner), self.config.handle_size),
                    fill: Some(SELECTION_COLOR),
                },
            );
        }

        let indicator = Primitive::Rect {
            bounds: Bounds::centered(
                bounds.corner(Corner::BottomRight),
                self.config.indicator_size,
            ),
            fill: Some(OVERFLOW_COLOR),
        };
        match (overflowing, selection.overflow) {
            (true, Some(node)) => {
                self.scene.update(node, indicator);
            }
            (true, None) => {
                selection.overflow = Some(self.scene.insert(
                    Layer::Interface,
                    NodeRole::OverflowIndicator,
                    Some(id),
                    false,
                    indicator,
                ));
            }
            (false, Some(node)) => {
                self.scene.remove(node);
                selection.overflow = None;
            }
            (false, None) => {}
        }
    }

    fn clear_selection_nodes(&mut self) {
        if let Some(selection) = self.selection.take() {
            self.scene.remove(selection.frame);
            for (_, node) in selection.handles {
                self.scene.remove(node);
            }
            if let Some(node) = selection.overflow {
                self.scene.remove(node);
            }
        }
    }

    fn refresh_guides(&mut self) {
        let document = self.model.document;
        for kind in GuideKind::ALL {
            let rect = match kind {
                GuideKind::Trim => Some(document.trim_rect()),
                GuideKind::Bleed => document.bleed_rect(),
                GuideKind::Safe => document.safe_rect(),
            };
            let wanted = rect.filter(|_| self.guide_visibility.get(kind));
            match (wanted, self.guides.get(&kind).copied()) {
                (Some(bounds), Some(node)) => {
                    self.scene.update(node, self.guide_primitive(kind, bounds));
                }
                (Some(bounds), None) => {
                    let primitive = self.guide_primitive(kind, bounds);
                    let node = self.scene.insert(
                        Layer::Guides,
                        NodeRole::Guide(kind),
                        None,
                        false,
                        primitive,
                    );
                    self.guides.insert(kind, node);
                }
                (None, Some(node)) => {
                    self.scene.remove(node);
                    self.guides.remove(&kind);
                }
                (None, None) => {}
            }
        }
    }

    fn guide_primitive(&self, kind: GuideKind, bounds: Bounds) -> Primitive {
        let (stroke, dashed) = match kind {
            GuideKind::Trim => (TRIM_COLOR, false),
            GuideKind::Bleed => (BLEED_COLOR, true),
            GuideKind::Safe => (SAFE_COLOR, true),
        };
        Primitive::Outline {
            bounds,
            stroke,
            stroke_width: self.config.stroke_width,
            dashed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentSpec, ImageFormat};

    fn doc(width: f32, height: f32, bleed: Option<f32>, safe: Option<f32>) -> Document {
        Document::new(DocumentSpec {
            width,
            height,
            bleed,
            safe,
            unit: crate::Unit::Mm,
        })
        .expect("valid document")
    }

    fn engine() -> Engine {
        Engine::new(doc(210.0, 297.0, Some(3.0), Some(5.0)))
    }

    fn pixels() -> Arc<ImageData> {
        Arc::new(ImageData::new(vec![0; 4], ImageFormat::Png, 100, 50))
    }

    #[test]
    fn test_aspect_preserving_resize() {
        let b = resize_bounds(
            Bounds::new(0.0, 0.0, 100.0, 50.0),
            Corner::BottomRight,
            40.0,
            5.0,
            true,
        );
        assert!((b.width - 140.0).abs() < 1e-4);
        assert!((b.width / b.height - 2.0).abs() < 1e-4);
        assert_eq!((b.x, b.y), (0.0, 0.0));
    }

    #[test]
    fn test_aspect_resize_vertical_axis_drives() {
        let b = resize_bounds(
            Bounds::new(0.0, 0.0, 100.0, 50.0),
            Corner::BottomRight,
            5.0,
            25.0,
            true,
        );
        assert!((b.height - 75.0).abs() < 1e-4);
        assert!((b.width - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_free_resize_from_top_left_anchors_opposite_corner() {
        let b = resize_bounds(
            Bounds::new(10.0, 10.0, 100.0, 50.0),
            Corner::TopLeft,
            20.0,
            -10.0,
            false,
        );
        assert_eq!(b, Bounds::new(30.0, 0.0, 80.0, 60.0));
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let b = resize_bounds(
            Bounds::new(0.0, 0.0, 10.0, 10.0),
            Corner::BottomRight,
            -50.0,
            -50.0,
            false,
        );
        assert_eq!((b.width, b.height), (MIN_OBJECT_SIZE, MIN_OBJECT_SIZE));

        let b = resize_bounds(
            Bounds::new(0.0, 0.0, 10.0, 10.0),
            Corner::TopLeft,
            50.0,
            50.0,
            false,
        );
        assert_eq!(b, Bounds::new(9.0, 9.0, 1.0, 1.0));
    }

    #[test]
    fn test_guides_follow_document_and_visibility() {
        let mut engine = engine();
        let bleed = engine.guide(GuideKind::Bleed).expect("bleed guide");
        assert_eq!(bleed.primitive.bounds(), Bounds::new(-3.0, -3.0, 216.0, 303.0));
        assert!(!bleed.listening);
        assert_eq!(bleed.layer, Layer::Guides);
        let safe = engine.guide(GuideKind::Safe).expect("safe guide");
        assert_eq!(safe.primitive.bounds(), Bounds::new(5.0, 5.0, 200.0, 287.0));

        engine.set_guide_visible(GuideKind::Safe, false);
        assert!(engine.guide(GuideKind::Safe).is_none());
        assert!(!engine.guide_visible(GuideKind::Safe));

        engine.set_margins(None, Some(5.0)).expect("valid");
        assert!(engine.guide(GuideKind::Bleed).is_none());
        engine.set_guide_visible(GuideKind::Safe, true);
        assert!(engine.guide(GuideKind::Safe).is_some());
        assert!(engine.set_margins(Some(-1.0), None).is_err());
    }

    #[test]
    fn test_guides_never_intercept_pointer() {
        let mut engine = engine();
        // Exactly on the safe outline, nothing else there.
        engine.on_pointer_down(Point::new(5.0, 5.0), Modifiers::NONE);
        assert_eq!(engine.interaction(), &Interaction::Idle);
    }

    #[test]
    fn test_select_draws_box_and_four_handles() {
        let mut engine = engine();
        let id = engine.add_rect(Bounds::new(10.0, 10.0, 50.0, 20.0), None);
        engine.on_pointer_down(Point::new(20.0, 15.0), Modifiers::NONE);
        assert_eq!(engine.selected(), Some(id));
        assert_eq!(engine.handles().count(), 4);
        assert!(engine.scene().find_role(NodeRole::SelectionBox).is_some());
        engine.on_pointer_up(Point::new(20.0, 15.0), Modifiers::NONE);
        assert_eq!(engine.interaction(), &Interaction::Selected { id });
    }

    #[test]
    fn test_selecting_another_object_removes_old_handles() {
        let mut engine = engine();
        let a = engine.add_rect(Bounds::new(10.0, 10.0, 20.0, 20.0), None);
        let b = engine.add_rect(Bounds::new(100.0, 100.0, 20.0, 20.0), None);
        engine.select(a);
        engine.select(b);
        let owners: Vec<_> = engine.handles().filter_map(|n| n.owner).collect();
        assert_eq!(owners, vec![b; 4]);
        let boxes = engine
            .scene()
            .nodes()
            .filter(|n| n.role == NodeRole::SelectionBox)
            .count();
        assert_eq!(boxes, 1);
    }

    #[test]
    fn test_click_empty_space_deselects() {
        let mut engine = engine();
        let id = engine.add_rect(Bounds::new(10.0, 10.0, 20.0, 20.0), None);
        engine.select(id);
        engine.on_pointer_down(Point::new(150.0, 150.0), Modifiers::NONE);
        assert_eq!(engine.selected(), None);
        assert_eq!(engine.handles().count(), 0);
    }

    #[test]
    fn test_handle_drag_resizes_with_shift() {
        let mut engine = engine();
        let id = engine.add_rect(Bounds::new(0.0, 0.0, 100.0, 50.0), None);
        engine.select(id);
        engine.on_pointer_down(Point::new(100.0, 50.0), Modifiers::NONE);
        assert!(matches!(
            engine.interaction(),
            Interaction::Resizing {
                corner: Corner::BottomRight,
                ..
            }
        ));
        engine.on_pointer_move(Point::new(120.0, 52.0), Modifiers::SHIFT);
        engine.on_pointer_move(Point::new(140.0, 55.0), Modifiers::SHIFT);
        let edit = engine.on_pointer_up(Point::new(140.0, 55.0), Modifiers::SHIFT);

        let bounds = engine.object(id).expect("object").bounds();
        assert!((bounds.width - 140.0).abs() < 1e-4);
        assert!((bounds.height - 70.0).abs() < 1e-4);
        assert_eq!(
            edit,
            Some(Edit::Geometry(GeometryChange {
                id,
                before: Bounds::new(0.0, 0.0, 100.0, 50.0),
                after: bounds,
            }))
        );
        // The handles follow the new geometry.
        let br = engine
            .handles()
            .find(|n| n.role == NodeRole::Handle(Corner::BottomRight))
            .expect("handle");
        assert_eq!(br.primitive.bounds(), Bounds::centered(Point::new(140.0, 70.0), 2.0));
        // Pointer-up is idempotent.
        assert!(engine.on_pointer_up(Point::new(0.0, 0.0), Modifiers::NONE).is_none());
    }

    #[test]
    fn test_commit_without_edit_keeps_selection() {
        let mut engine = engine();
        let id = engine.add_rect(Bounds::new(0.0, 0.0, 100.0, 50.0), None);
        engine.select(id);
        assert!(engine.commit_edit().is_none());
        assert_eq!(engine.interaction(), &Interaction::Selected { id });
        assert_eq!(engine.handles().count(), 4);

        engine.on_pointer_down(Point::new(100.0, 50.0), Modifiers::NONE);
        assert!(matches!(engine.interaction(), Interaction::Resizing { id: owner, .. } if *owner == id));
    }

    #[test]
    fn test_insert_rejects_invalid_bounds() {
        let mut engine = engine();
        let negative = CanvasObject::rect(Bounds::new(0.0, 0.0, -5.0, 0.0), None);
        let unbounded = CanvasObject::rect(Bounds::new(f32::NAN, 0.0, 10.0, 10.0), None);
        assert!(!engine.insert_object(negative));
        assert!(!engine.insert_object(unbounded));
        assert!(engine.model().is_empty());
        assert_eq!(engine.scene().layer(Layer::Content).count(), 0);
    }

    #[test]
    fn test_drag_moves_object() {
        let mut engine = engine();
        let id = engine.add_rect(Bounds::new(10.0, 10.0, 20.0, 20.0), None);
        engine.on_pointer_down(Point::new(15.0, 15.0), Modifiers::NONE);
        engine.on_pointer_move(Point::new(25.0, 35.0), Modifiers::NONE);
        let edit = engine.on_pointer_up(Point::new(25.0, 35.0), Modifiers::NONE);
        assert_eq!(
            engine.object(id).expect("object").bounds(),
            Bounds::new(20.0, 30.0, 20.0, 20.0)
        );
        assert!(matches!(edit, Some(Edit::Geometry(_))));
    }

    #[test]
    fn test_click_without_drag_records_nothing() {
        let mut engine = engine();
        engine.add_rect(Bounds::new(10.0, 10.0, 20.0, 20.0), None);
        engine.on_pointer_down(Point::new(15.0, 15.0), Modifiers::NONE);
        assert!(engine
            .on_pointer_up(Point::new(15.0, 15.0), Modifiers::NONE)
            .is_none());
    }

    #[test]
    fn test_image_resize_keeps_transform() {
        let mut engine = engine();
        let id = engine.add_image(Bounds::new(0.0, 0.0, 100.0, 50.0), pixels());
        let before = engine.object(id).and_then(CanvasObject::as_image).expect("image").transform;
        engine.select(id);
        engine.on_pointer_down(Point::new(100.0, 50.0), Modifiers::NONE);
        engine.on_pointer_move(Point::new(20.0, 10.0), Modifiers::NONE);
        engine.on_pointer_up(Point::new(20.0, 10.0), Modifiers::NONE);

        let image = engine.object(id).and_then(CanvasObject::as_image).expect("image");
        assert_eq!(image.transform, before);
        assert_eq!((image.width, image.height), (20.0, 10.0));
        match &engine.node_for(id).expect("node").primitive {
            Primitive::Image { clip, content, .. } => {
                assert_eq!(*clip, Bounds::new(0.0, 0.0, 20.0, 10.0));
                assert_eq!(content.width, 100.0);
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_text_overflow_indicator() {
        let mut engine = engine();
        let long = "The quick brown fox jumps over the lazy dog again and again until the box is full";
        let small = engine.add_text(Bounds::new(0.0, 0.0, 50.0, 10.0), long, TextStyle::default());
        let big = engine.add_text(
            Bounds::new(0.0, 50.0, 500.0, 200.0),
            "Hi",
            TextStyle::default(),
        );

        assert!(engine.overflows(small));
        assert!(!engine.overflows(big));

        engine.select(small);
        let indicator = engine.overflow_indicator().expect("indicator shown");
        assert_eq!(
            indicator.primitive.bounds(),
            Bounds::centered(Point::new(50.0, 10.0), 3.0)
        );
        assert!(!indicator.listening);

        engine.select(big);
        assert!(engine.overflow_indicator().is_none());
    }

    #[test]
    fn test_overflow_recomputed_on_geometry_and_text() {
        let mut engine = engine();
        let id = engine.add_text(Bounds::new(0.0, 0.0, 500.0, 200.0), "Hi", TextStyle::default());
        engine.select(id);
        assert!(engine.overflow_indicator().is_none());

        engine.set_bounds(id, Bounds::new(0.0, 0.0, 2.0, 2.0));
        assert!(engine.overflow_indicator().is_some());
        engine.set_bounds(id, Bounds::new(0.0, 0.0, 500.0, 200.0));
        assert!(engine.overflow_indicator().is_none());

        engine.update_text(id, &"word ".repeat(4000));
        assert!(engine.overflow_indicator().is_some());
        // Overflow never rewrites the box or the text.
        let text = engine.object(id).and_then(CanvasObject::as_text).expect("text");
        assert_eq!((text.width, text.height), (500.0, 200.0));
    }

    #[test]
    fn test_double_click_edit_and_commit() {
        let mut engine = engine();
        let style = TextStyle {
            font_size: 18.0,
            tracking: 50.0,
            ..TextStyle::default()
        };
        let id = engine.add_text(Bounds::new(10.0, 10.0, 100.0, 30.0), "Hello", style.clone());
        assert!(engine.on_double_click(Point::new(20.0, 20.0)).is_none());

        let (surface, buffer) = engine.edit_surface().expect("surface");
        assert_eq!(buffer, "Hello");
        match &surface.primitive {
            Primitive::Text {
                bounds, style: s, ..
            } => {
                assert_eq!(*bounds, Bounds::new(10.0, 10.0, 100.0, 30.0));
                assert_eq!(*s, style);
            }
            other => panic!("unexpected primitive {other:?}"),
        }

        assert!(engine.set_edit_text("Hello, world"));
        // Pressing inside the surface keeps editing.
        assert!(engine
            .on_pointer_down(Point::new(20.0, 20.0), Modifiers::NONE)
            .is_none());
        assert!(engine.edit_surface().is_some());

        let edit = engine.on_pointer_down(Point::new(190.0, 280.0), Modifiers::NONE);
        assert_eq!(
            edit,
            Some(Edit::Text(TextChange {
                id,
                before: "Hello".to_string(),
                after: "Hello, world".to_string(),
            }))
        );
        assert!(engine.edit_surface().is_none());
        assert!(engine.scene().find_role(NodeRole::EditSurface).is_none());
        let text = engine.object(id).and_then(CanvasObject::as_text).expect("text");
        assert_eq!(text.text, "Hello, world");
    }

    #[test]
    fn test_only_one_edit_surface() {
        let mut engine = engine();
        let a = engine.add_text(Bounds::new(0.0, 0.0, 50.0, 20.0), "a", TextStyle::default());
        let b = engine.add_text(Bounds::new(0.0, 100.0, 50.0, 20.0), "b", TextStyle::default());
        engine.begin_edit(a);
        engine.set_edit_text("changed");
        let edit = engine.begin_edit(b);
        assert!(matches!(edit, Some(Edit::Text(TextChange { id, .. })) if id == a));
        let surfaces = engine
            .scene()
            .nodes()
            .filter(|n| n.role == NodeRole::EditSurface)
            .count();
        assert_eq!(surfaces, 1);
        assert_eq!(engine.selected(), Some(b));
    }

    #[test]
    fn test_double_click_on_rect_does_not_edit() {
        let mut engine = engine();
        engine.add_rect(Bounds::new(0.0, 0.0, 50.0, 50.0), None);
        engine.on_double_click(Point::new(10.0, 10.0));
        assert!(engine.edit_surface().is_none());
    }

    #[test]
    fn test_cancel_edit_keeps_text() {
        let mut engine = engine();
        let id = engine.add_text(Bounds::new(0.0, 0.0, 50.0, 20.0), "keep", TextStyle::default());
        engine.begin_edit(id);
        engine.set_edit_text("discard");
        engine.cancel_edit();
        assert!(engine.commit_edit().is_none());
        let text = engine.object(id).and_then(CanvasObject::as_text).expect("text");
        assert_eq!(text.text, "keep");
    }

    #[test]
    fn test_stale_ids_are_ignored() {
        let mut engine = engine();
        engine.add_rect(Bounds::new(0.0, 0.0, 10.0, 10.0), None);
        engine.take_changes();
        let ghost = ObjectId::new();

        assert!(!engine.replace_image(ghost, pixels()));
        assert!(!engine.update_image_transform(ghost, ImageTransform::default()));
        assert!(!engine.set_bounds(ghost, Bounds::default()));
        assert!(!engine.update_text(ghost, "x"));
        assert!(engine.select(ghost).is_none());
        assert!(engine.take_changes().is_empty());
    }

    #[test]
    fn test_type_mismatch_is_ignored() {
        let mut engine = engine();
        let rect = engine.add_rect(Bounds::new(0.0, 0.0, 10.0, 10.0), None);
        assert!(!engine.replace_image(rect, pixels()));
        assert!(!engine.update_text(rect, "x"));
    }

    #[test]
    fn test_replace_image_keeps_geometry_and_transform() {
        let mut engine = engine();
        let id = engine.add_image(Bounds::new(5.0, 5.0, 40.0, 40.0), pixels());
        let transform = ImageTransform {
            scale: 2.0,
            offset_x: -10.0,
            offset_y: 3.0,
        };
        assert!(engine.update_image_transform(id, transform));
        let replacement = Arc::new(ImageData::new(vec![9; 4], ImageFormat::Jpeg, 10, 10));
        assert!(engine.replace_image(id, Arc::clone(&replacement)));

        let image = engine.object(id).and_then(CanvasObject::as_image).expect("image");
        assert_eq!(image.transform, transform);
        assert_eq!((image.x, image.y, image.width, image.height), (5.0, 5.0, 40.0, 40.0));
        assert_eq!(image.data, replacement);
        match &engine.node_for(id).expect("node").primitive {
            Primitive::Image { content, .. } => {
                assert_eq!(*content, Bounds::new(-5.0, 8.0, 20.0, 20.0));
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_engine_from_model_binds_every_object() {
        let mut model = DocumentModel::new(doc(100.0, 100.0, None, None));
        model.push(CanvasObject::rect(Bounds::new(0.0, 0.0, 1.0, 1.0), None));
        model.push(CanvasObject::text(
            Bounds::new(0.0, 0.0, 10.0, 10.0),
            "x",
            TextStyle::default(),
        ));
        let engine = Engine::with_config(
            model,
            EngineConfig::default(),
            Box::new(ApproximateMetrics::default()),
        );
        assert_eq!(engine.scene().layer(Layer::Content).count(), 2);
        // Only the trim guide; no bleed or safe margins.
        assert_eq!(engine.scene().layer(Layer::Guides).count(), 1);
    }

    #[test]
    fn test_remove_object_clears_selection() {
        let mut engine = engine();
        let id = engine.add_text(Bounds::new(0.0, 0.0, 50.0, 20.0), "x", TextStyle::default());
        engine.begin_edit(id);
        assert!(engine.remove_object(id).is_some());
        assert_eq!(engine.interaction(), &Interaction::Idle);
        assert_eq!(engine.scene().layer(Layer::Interface).count(), 0);
        assert_eq!(engine.scene().layer(Layer::Content).count(), 0);
    }
}
