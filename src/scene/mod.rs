//! # Scene Module
//!
//! Arena scene graph. Nodes are owned by [`Scene`] and addressed by
//! [`NodeId`]; hierarchy is stored as parent/child id links.

mod builder;
mod node;
mod scene;
mod transform;

pub use builder::{EnvironmentTicket, SceneBuilder, SceneError};
pub use node::Node;
pub use scene::{NodeTree, Scene};
pub use transform::Transform;

pub use crate::core::NodeId;

use crate::helpers::Helper;
use crate::light::LightSource;
use crate::objects::Mesh;

/// What a scene node represents.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform node.
    Group,
    /// Drawable mesh.
    Mesh(Mesh),
    /// Light source.
    Light(LightSource),
    /// Aim point of a directional or spot light.
    LightTarget,
    /// Debug helper.
    Helper(Helper),
}

impl NodeKind {
    /// Whether the node is a light.
    #[inline]
    pub fn is_light(&self) -> bool {
        matches!(self, NodeKind::Light(_))
    }

    /// Get the mesh, if any.
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Get the mesh mutably, if any.
    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match self {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Get the light, if any.
    pub fn as_light(&self) -> Option<&LightSource> {
        match self {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Get the helper, if any.
    pub fn as_helper(&self) -> Option<&Helper> {
        match self {
            NodeKind::Helper(helper) => Some(helper),
            _ => None,
        }
    }
}
