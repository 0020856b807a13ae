//! Scene container - owner of every node in the graph.

use super::{Node, NodeKind};
use crate::core::NodeId;
use crate::math::{Aabb, Color, Mat4, Vec3};
use crate::texture::CubeTexture;
use std::collections::BTreeMap;

/// A node together with its not-yet-inserted descendants.
#[derive(Debug, Clone)]
pub struct NodeTree {
    /// The root node.
    pub node: Node,
    /// Child subtrees.
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    /// Create a leaf.
    pub fn new(node: Node) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Builder: add a child subtree.
    pub fn with_child(mut self, child: NodeTree) -> Self {
        self.children.push(child);
        self
    }

    /// Bounds of all meshes, in the space this tree's root lives in.
    pub fn bounding_box(&self) -> Aabb {
        self.bounds_with(&Mat4::IDENTITY)
    }

    fn bounds_with(&self, parent: &Mat4) -> Aabb {
        let world = *parent * self.node.transform.matrix();
        let own = self
            .node
            .kind()
            .as_mesh()
            .map(|mesh| mesh.bounding_box().transform(&world))
            .unwrap_or(Aabb::EMPTY);
        self.children
            .iter()
            .fold(own, |acc, child| acc.union(&child.bounds_with(&world)))
    }

    /// Visit every node mutably, depth first.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(&mut self.node);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(NodeTree::len).sum::<usize>()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The scene - root container for all objects.
#[derive(Debug)]
pub struct Scene {
    /// All nodes. Ids grow monotonically, so iteration follows insertion order.
    nodes: BTreeMap<NodeId, Node>,
    /// Top-level nodes.
    roots: Vec<NodeId>,
    /// Solid background color.
    background: Option<Color>,
    /// Cubemap environment.
    environment: Option<CubeTexture>,
    /// Scale applied to the whole scene.
    scale: Vec3,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            background: None,
            environment: None,
            scale: Vec3::ONE,
        }
    }

    /// Add a top-level node.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.roots.push(id);
        self.nodes.insert(id, node);
        id
    }

    /// Add a node under `parent`. Falls back to top level if the parent is gone.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = node.id();
        match self.nodes.get_mut(&parent) {
            Some(p) => {
                p.push_child(id);
                node.set_parent(Some(parent));
                self.nodes.insert(id, node);
            }
            None => {
                log::warn!("Parent {} not found, adding {} at top level", parent, node.name());
                self.roots.push(id);
                self.nodes.insert(id, node);
            }
        }
        id
    }

    /// Insert a whole tree. Returns the id of its root.
    pub fn add_tree(&mut self, parent: Option<NodeId>, tree: NodeTree) -> NodeId {
        let NodeTree { node, children } = tree;
        let id = match parent {
            Some(parent) => self.add_child(parent, node),
            None => self.add(node),
        };
        for child in children {
            self.add_tree(Some(id), child);
        }
        id
    }

    /// Remove a node and all its descendants. Returns the removed root.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        match node.parent() {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.remove_child(id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        let mut stack: Vec<NodeId> = node.children().to_vec();
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                stack.extend_from_slice(removed.children());
            }
        }
        Some(node)
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Check whether a node exists.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get a node.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a node mutably.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Total number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level node ids.
    #[inline]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Iterate all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate light nodes.
    pub fn lights(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.kind().is_light())
    }

    /// Find the first node with a name.
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.name() == name)
    }

    /// Find the first node with a tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.tag() == Some(tag))
    }

    /// Ids of a node and all its descendants, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                stack.extend(node.children().iter().rev());
            }
        }
        out
    }

    /// World matrix of a node, including the scene scale.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            matrix = node.transform.matrix() * matrix;
            current = node.parent().and_then(|p| self.nodes.get(&p));
        }
        Mat4::from_scale(self.scale) * matrix
    }

    /// World position of a node.
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    /// World-space bounds of all meshes below and including `id`.
    pub fn bounding_box(&self, id: NodeId) -> Aabb {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| {
                let mesh = self.nodes.get(&n)?.kind().as_mesh()?;
                Some(mesh.bounding_box().transform(&self.world_matrix(n)))
            })
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b))
    }

    /// Get the background color.
    #[inline]
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Set the background color.
    #[inline]
    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    /// Get the environment cubemap.
    #[inline]
    pub fn environment(&self) -> Option<&CubeTexture> {
        self.environment.as_ref()
    }

    /// Set the environment cubemap.
    pub fn set_environment(&mut self, environment: Option<CubeTexture>) {
        self.environment = environment;
    }

    /// Get the scene scale.
    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set the scene scale.
    #[inline]
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Reset the scene scale to one.
    #[inline]
    pub fn reset_scale(&mut self) {
        self.scale = Vec3::ONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Mesh, Primitive};

    fn unit_mesh(name: &str) -> Node {
        Node::new(
            name,
            NodeKind::Mesh(Mesh::new(
                name,
                vec![Primitive::new(Aabb::new(Vec3::splat(-1.0), Vec3::ONE), 3)],
            )),
        )
    }

    #[test]
    fn test_add_and_remove_subtree() {
        let mut scene = Scene::new();
        let root = scene.add(Node::new("root", NodeKind::Group));
        let child = scene.add_child(root, Node::new("child", NodeKind::Group));
        scene.add_child(child, unit_mesh("leaf"));
        let other = scene.add(Node::new("other", NodeKind::Group));
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.descendants(root).len(), 3);

        let removed = scene.remove(root).unwrap();
        assert_eq!(removed.name(), "root");
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.roots(), &[other]);
        assert!(scene.find_by_name("leaf").is_none());
    }

    #[test]
    fn test_remove_child_unlinks_parent() {
        let mut scene = Scene::new();
        let root = scene.add(Node::new("root", NodeKind::Group));
        let child = scene.add_child(root, Node::new("child", NodeKind::Group));
        scene.remove(child);
        assert!(scene.get(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_world_bounds_follow_hierarchy() {
        let mut scene = Scene::new();
        let root = scene.add(Node::new("root", NodeKind::Group).with_position(Vec3::new(0.0, 5.0, 0.0)));
        scene.add_child(root, unit_mesh("mesh").with_position(Vec3::new(1.0, 0.0, 0.0)));
        let bounds = scene.bounding_box(root);
        assert!(bounds.approx_eq(&Aabb::new(Vec3::new(0.0, 4.0, -1.0), Vec3::new(2.0, 6.0, 1.0)), 1e-5));

        scene.set_scale(Vec3::splat(2.0));
        assert_eq!(scene.world_position(root), Vec3::new(0.0, 10.0, 0.0));
        scene.reset_scale();
        assert_eq!(scene.scale(), Vec3::ONE);
    }

    #[test]
    fn test_add_tree_and_tree_bounds() {
        let tree = NodeTree::new(Node::new("model", NodeKind::Group))
            .with_child(NodeTree::new(unit_mesh("a").with_position(Vec3::new(0.0, 2.0, 0.0))));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.bounding_box().min.y, 1.0);

        let mut scene = Scene::new();
        let id = scene.add_tree(None, tree);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(id).unwrap().children().len(), 1);
        assert_eq!(scene.bounding_box(id).max.y, 3.0);
    }
}
