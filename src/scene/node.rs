//! A node in the scene graph.

use super::{NodeKind, Transform};
use crate::core::NodeId;
use crate::math::Vec3;

/// A single scene-graph node.
///
/// Nodes are owned by [`super::Scene`] and reference each other by [`NodeId`].
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier.
    id: NodeId,
    /// Node name.
    name: String,
    /// What the node represents.
    kind: NodeKind,
    /// Local transform.
    pub transform: Transform,
    /// Whether the node is drawn.
    visible: bool,
    /// Whether the node casts shadows.
    pub cast_shadow: bool,
    /// Application tag (the model id for loaded models).
    tag: Option<String>,
    /// Parent node, `None` for top-level nodes.
    parent: Option<NodeId>,
    /// Child nodes.
    children: Vec<NodeId>,
}

impl Node {
    /// Create a new node.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind,
            transform: Transform::new(),
            visible: true,
            cast_shadow: false,
            tag: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Builder: set the position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder: set visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the node name.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the node kind.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Get the mutable node kind.
    #[inline]
    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Check if visible.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set visibility.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Get the application tag.
    #[inline]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Set the application tag.
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    /// Get the parent.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Get the children.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(super) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(super) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(super) fn remove_child(&mut self, child: NodeId) {
        self.children.retain(|c| *c != child);
    }
}
