//! Backend-independent scene graph.
//!
//! The engine keeps one node per document object in the content layer plus
//! transient interface nodes (selection box, handles, overflow indicator,
//! edit surface) and the print guides. Every mutation is recorded as a
//! [`SceneChange`] so a [`SceneBackend`] can mirror the graph onto whatever
//! surface it drives.

use std::collections::HashMap;
use std::sync::Arc;

use crate::text::TextLayout;
use crate::{Bounds, Color, Corner, ImageData, ObjectId, Point, TextStyle};

/// Identifier of a scene node. Never reused within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Drawing layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Document objects; the only layer exporters read.
    Content,
    /// Selection, handles, overflow indicators and the edit surface.
    Interface,
    /// Trim, bleed and safe outlines.
    Guides,
}

impl Layer {
    /// Layers in drawing order.
    pub const ALL: [Self; 3] = [Self::Content, Self::Interface, Self::Guides];

    fn index(self) -> usize {
        match self {
            Self::Content => 0,
            Self::Interface => 1,
            Self::Guides => 2,
        }
    }
}

/// Which print guide a node draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideKind {
    /// Final cut line.
    Trim,
    /// Ink extension beyond the trim.
    Bleed,
    /// Inset inside which content is safe from cutting.
    Safe,
}

impl GuideKind {
    /// All guides.
    pub const ALL: [Self; 3] = [Self::Trim, Self::Bleed, Self::Safe];
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// The rendering of a document object.
    Object,
    /// Outline around the selected object.
    SelectionBox,
    /// A corner resize handle of the selected object.
    Handle(Corner),
    /// Marker shown when text does not fit its box.
    OverflowIndicator,
    /// The inline text editor.
    EditSurface,
    /// A print guide.
    Guide(GuideKind),
}

/// Drawable content of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Filled rectangle.
    Rect {
        /// Geometry.
        bounds: Bounds,
        /// Fill colour; invisible when absent.
        fill: Option<Color>,
    },
    /// Stroked rectangle outline.
    Outline {
        /// Geometry.
        bounds: Bounds,
        /// Stroke colour.
        stroke: Color,
        /// Stroke width in document units.
        stroke_width: f32,
        /// Whether the stroke is dashed.
        dashed: bool,
    },
    /// Laid-out text.
    Text {
        /// Authored box.
        bounds: Bounds,
        /// Content as typed (used by the edit surface).
        text: String,
        /// Lines positioned inside the box.
        layout: TextLayout,
        /// Typography.
        style: TextStyle,
    },
    /// Image content clipped to a frame.
    Image {
        /// Clip rectangle (the object frame).
        clip: Bounds,
        /// Where the pixels are drawn before clipping.
        content: Bounds,
        /// Pixel payload.
        data: Arc<ImageData>,
    },
}

impl Primitive {
    /// The area the primitive occupies for hit testing.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Rect { bounds, .. } | Self::Outline { bounds, .. } | Self::Text { bounds, .. } => {
                *bounds
            }
            Self::Image { clip, .. } => *clip,
        }
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Layer the node is drawn in.
    pub layer: Layer,
    /// What the node represents.
    pub role: NodeRole,
    /// Document object the node belongs to, if any.
    pub owner: Option<ObjectId>,
    /// Whether the node receives pointer input.
    pub listening: bool,
    /// What to draw.
    pub primitive: Primitive,
}

/// One recorded mutation of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    /// A node was added.
    Created(NodeId),
    /// A node's primitive changed.
    Updated(NodeId),
    /// A node was removed.
    Removed(NodeId),
}

/// Adapter that mirrors scene changes onto a concrete drawing surface.
pub trait SceneBackend {
    /// Apply a batch of changes. Removed nodes are no longer in `scene`.
    fn apply(&mut self, scene: &SceneGraph, changes: &[SceneChange]);
}

/// The retained scene for one open document.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    layers: [Vec<NodeId>; 3],
    next_id: u64,
    changes: Vec<SceneChange>,
}

impl SceneGraph {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node on top of its layer.
    pub fn insert(
        &mut self,
        layer: Layer,
        role: NodeRole,
        owner: Option<ObjectId>,
        listening: bool,
        primitive: Primitive,
    ) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                id,
                layer,
                role,
                owner,
                listening,
                primitive,
            },
        );
        self.layers[layer.index()].push(id);
        self.changes.push(SceneChange::Created(id));
        id
    }

    /// Replace a node's primitive. Returns `false` for unknown nodes.
    pub fn update(&mut self, id: NodeId, primitive: Primitive) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if node.primitive != primitive {
            node.primitive = primitive;
            self.changes.push(SceneChange::Updated(id));
        }
        true
    }

    /// Remove a node.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.layers[node.layer.index()].retain(|n| *n != id);
        self.changes.push(SceneChange::Removed(id));
        Some(node)
    }

    /// Get a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Nodes of one layer, bottom to top.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Node> {
        self.layers[layer.index()]
            .iter()
            .filter_map(|id| self.nodes.get(id))
    }

    /// All nodes in drawing order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        Layer::ALL.into_iter().flat_map(|layer| self.layer(layer))
    }

    /// First node with the given role, searching every layer.
    #[must_use]
    pub fn find_role(&self, role: NodeRole) -> Option<&Node> {
        self.nodes().find(|n| n.role == role)
    }

    /// Topmost listening node under `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<&Node> {
        Layer::ALL.into_iter().rev().find_map(|layer| {
            self.layers[layer.index()]
                .iter()
                .rev()
                .filter_map(|id| self.nodes.get(id))
                .find(|n| n.listening && n.primitive.bounds().contains(point))
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Changes recorded since the last drain.
    #[must_use]
    pub fn pending_changes(&self) -> &[SceneChange] {
        &self.changes
    }

    /// Drain recorded changes.
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }

    /// Drain recorded changes into a backend.
    pub fn flush(&mut self, backend: &mut dyn SceneBackend) {
        let changes = self.take_changes();
        if !changes.is_empty() {
            backend.apply(self, &changes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32) -> Primitive {
        Primitive::Rect {
            bounds: Bounds::new(x, y, 10.0, 10.0),
            fill: None,
        }
    }

    #[test]
    fn test_insert_update_remove_records_changes() {
        let mut scene = SceneGraph::new();
        let id = scene.insert(Layer::Content, NodeRole::Object, None, true, rect(0.0, 0.0));
        assert!(scene.update(id, rect(1.0, 1.0)));
        // Identical primitive is not a change.
        assert!(scene.update(id, rect(1.0, 1.0)));
        assert!(scene.remove(id).is_some());
        assert_eq!(
            scene.take_changes(),
            vec![
                SceneChange::Created(id),
                SceneChange::Updated(id),
                SceneChange::Removed(id)
            ]
        );
        assert!(scene.pending_changes().is_empty());
        assert!(!scene.update(id, rect(0.0, 0.0)));
    }

    #[test]
    fn test_hit_test_prefers_upper_layers_and_skips_non_listening() {
        let mut scene = SceneGraph::new();
        let below = scene.insert(Layer::Content, NodeRole::Object, None, true, rect(0.0, 0.0));
        let above = scene.insert(Layer::Content, NodeRole::Object, None, true, rect(5.0, 5.0));
        scene.insert(
            Layer::Guides,
            NodeRole::Guide(GuideKind::Trim),
            None,
            false,
            rect(0.0, 0.0),
        );

        assert_eq!(scene.hit_test(Point::new(7.0, 7.0)).map(|n| n.id), Some(above));
        assert_eq!(scene.hit_test(Point::new(2.0, 2.0)).map(|n| n.id), Some(below));
        assert!(scene.hit_test(Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_nodes_iterate_in_layer_order() {
        let mut scene = SceneGraph::new();
        let guide = scene.insert(
            Layer::Guides,
            NodeRole::Guide(GuideKind::Safe),
            None,
            false,
            rect(0.0, 0.0),
        );
        let object = scene.insert(Layer::Content, NodeRole::Object, None, true, rect(0.0, 0.0));
        let order: Vec<_> = scene.nodes().map(|n| n.id).collect();
        assert_eq!(order, vec![object, guide]);
    }

    #[derive(Default)]
    struct Recorder(Vec<SceneChange>);

    impl SceneBackend for Recorder {
        fn apply(&mut self, _scene: &SceneGraph, changes: &[SceneChange]) {
            self.0.extend_from_slice(changes);
        }
    }

    #[test]
    fn test_flush_into_backend() {
        let mut scene = SceneGraph::new();
        let id = scene.insert(Layer::Content, NodeRole::Object, None, true, rect(0.0, 0.0));
        let mut backend = Recorder::default();
        scene.flush(&mut backend);
        scene.flush(&mut backend);
        assert_eq!(backend.0, vec![SceneChange::Created(id)]);
    }
}
