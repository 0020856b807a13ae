//! Owner of every profile-driven light in the scene.

use super::{
    AmbientLight, DirectionalLight, HemisphereLight, LightKind, LightPlacement, LightSource,
    LightsUniform, PointLight, RectAreaLight, SpotLight,
};
use crate::helpers::{Helper, LightHelper};
use crate::math::Vec3;
use crate::profile::{resolve_color, AmbientProfile, HemisphereProfile, LightDescriptor, SceneProfile};
use crate::scene::{Node, NodeId, NodeKind, Scene};
use thiserror::Error;

/// Errors that can occur while creating a light.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LightError {
    /// The descriptor's `type` tag is not a known light type.
    #[error("Unknown light type: {0}")]
    UnknownLightType(String),
}

/// A light created by the manager and the scene nodes that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedLight {
    /// Light name.
    pub name: String,
    /// Light kind.
    pub kind: LightKind,
    /// The light node.
    pub node: NodeId,
    /// Aim point node (directional and spot lights).
    pub target: Option<NodeId>,
    /// Debug helper node.
    pub helper: Option<NodeId>,
}

impl ManagedLight {
    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        std::iter::once(self.node).chain(self.target).chain(self.helper)
    }
}

/// Creates, tracks and tears down the lights described by a scene profile.
///
/// Light and helper visibility are independent switches.
#[derive(Debug)]
pub struct LightManager {
    lights: Vec<ManagedLight>,
    lighting_visible: bool,
    helpers_visible: bool,
}

impl Default for LightManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LightManager {
    /// Name given to the profile's ambient light.
    pub const AMBIENT_NAME: &'static str = "ambient_light";
    /// Name given to the profile's hemisphere light.
    pub const HEMISPHERE_NAME: &'static str = "hemisphere_light";

    /// Create a manager with no lights.
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            lighting_visible: true,
            helpers_visible: true,
        }
    }

    /// Rebuild all lights from a scene profile.
    ///
    /// Existing lights are always removed first. Returns the number of live lights.
    pub fn init_from_profile(&mut self, scene: &mut Scene, profile: &SceneProfile) -> usize {
        self.clear_all_lights(scene);
        self.lighting_visible = true;
        self.helpers_visible = true;

        let lighting = &profile.lighting;
        if !lighting.enabled {
            log::info!("Lighting disabled in scene profile {}", profile.id);
            return 0;
        }

        self.lighting_visible = lighting.visible;

        if let Some(ambient) = lighting.ambient.as_ref().filter(|a| a.enabled) {
            self.add_ambient(scene, ambient);
        }
        if let Some(hemisphere) = lighting.hemisphere.as_ref().filter(|h| h.enabled) {
            self.add_hemisphere(scene, hemisphere);
        }
        for descriptor in profile.lights.iter().filter(|d| d.enabled == Some(true)) {
            if let Err(e) = self.add_light(scene, descriptor) {
                log::warn!("Skipping light {}: {}", descriptor.name.as_deref().unwrap_or("<unnamed>"), e);
            }
        }

        log::info!(
            "Created {} light(s) from scene profile {}",
            self.lights.len(),
            profile.id
        );
        self.lights.len()
    }

    /// Add the profile's ambient light.
    pub fn add_ambient(&mut self, scene: &mut Scene, profile: &AmbientProfile) -> NodeId {
        let light = AmbientLight::new(
            resolve_color(profile.color.as_ref(), "ambient light"),
            profile.intensity.unwrap_or(1.0),
        );
        self.insert(scene, Self::AMBIENT_NAME.to_string(), LightSource::Ambient(light), Vec3::ZERO, None, None)
    }

    /// Add the profile's hemisphere light.
    pub fn add_hemisphere(&mut self, scene: &mut Scene, profile: &HemisphereProfile) -> NodeId {
        let light = HemisphereLight::new(
            resolve_color(profile.sky_color.as_ref(), "hemisphere sky"),
            resolve_color(profile.ground_color.as_ref(), "hemisphere ground"),
            profile.intensity.unwrap_or(1.0),
        );
        self.insert(
            scene,
            Self::HEMISPHERE_NAME.to_string(),
            LightSource::Hemisphere(light),
            Vec3::Y,
            None,
            None,
        )
    }

    /// Add one light from a `lights[]` descriptor.
    pub fn add_light(&mut self, scene: &mut Scene, descriptor: &LightDescriptor) -> Result<NodeId, LightError> {
        let kind = LightKind::parse(&descriptor.kind)
            .ok_or_else(|| LightError::UnknownLightType(descriptor.kind.clone()))?;

        let name = descriptor
            .name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", kind.as_str().to_lowercase(), self.lights.len()));
        let color = resolve_color(descriptor.color.as_ref(), &name);
        let intensity = descriptor.intensity.unwrap_or(1.0);
        let default_position = if kind.has_target() { Vec3::Y } else { Vec3::ZERO };
        let position = descriptor.position.map_or(default_position, Vec3::from);
        let target = kind
            .has_target()
            .then(|| descriptor.target.map_or(Vec3::ZERO, Vec3::from));

        let source = match kind {
            LightKind::Ambient => LightSource::Ambient(AmbientLight::new(color, intensity)),
            LightKind::Hemisphere => LightSource::Hemisphere(HemisphereLight::new(
                descriptor
                    .sky_color
                    .as_ref()
                    .map_or(color, |c| resolve_color(Some(c), &name)),
                resolve_color(descriptor.ground_color.as_ref(), &name),
                intensity,
            )),
            LightKind::Directional => LightSource::Directional(DirectionalLight::new(color, intensity)),
            LightKind::Point => {
                let mut light = PointLight::new(color, intensity);
                light.distance = descriptor.distance.unwrap_or(light.distance);
                light.decay = descriptor.decay.unwrap_or(light.decay);
                LightSource::Point(light)
            }
            LightKind::Spot => {
                let mut light = SpotLight::new(color, intensity);
                light.distance = descriptor.distance.unwrap_or(light.distance);
                light.decay = descriptor.decay.unwrap_or(light.decay);
                light.angle = descriptor.angle.unwrap_or(light.angle);
                light.penumbra = descriptor.penumbra.unwrap_or(light.penumbra);
                LightSource::Spot(light)
            }
            LightKind::RectArea => {
                let mut light = RectAreaLight::new(color, intensity);
                light.width = descriptor.width.unwrap_or(light.width);
                light.height = descriptor.height.unwrap_or(light.height);
                LightSource::RectArea(light)
            }
        };

        let helper_size = descriptor
            .helper
            .as_ref()
            .filter(|h| h.visible == Some(true))
            .map(|h| h.size.unwrap_or(1.0));

        let id = self.insert(scene, name, source, position, target, helper_size);

        if let Some(node) = scene.get_mut(id) {
            if matches!(kind, LightKind::Directional | LightKind::Point | LightKind::Spot) {
                node.cast_shadow = descriptor.cast_shadow == Some(true);
            }
            if kind == LightKind::RectArea {
                if let Some(rotation) = descriptor.rotation {
                    node.transform.rotation = rotation.into();
                }
            }
        }
        Ok(id)
    }

    fn insert(
        &mut self,
        scene: &mut Scene,
        name: String,
        source: LightSource,
        position: Vec3,
        target: Option<Vec3>,
        helper_size: Option<f32>,
    ) -> NodeId {
        let kind = source.kind();
        let color = source.color();
        let node = scene.add(
            Node::new(name.clone(), NodeKind::Light(source))
                .with_position(position)
                .with_visible(self.lighting_visible),
        );
        let target = target.map(|t| {
            scene.add(Node::new(format!("{}_target", name), NodeKind::LightTarget).with_position(t))
        });
        let helper = helper_size.map(|size| {
            scene.add(
                Node::new(
                    format!("{}_helper", name),
                    NodeKind::Helper(Helper::Light(LightHelper::new(kind, size, color))),
                )
                .with_position(position)
                .with_visible(self.helpers_visible),
            )
        });

        log::debug!("Added {} \"{}\"", kind.as_str(), name);
        self.lights.push(ManagedLight {
            name,
            kind,
            node,
            target,
            helper,
        });
        node
    }

    /// Remove a light and its target and helper by name.
    pub fn remove_light(&mut self, scene: &mut Scene, name: &str) -> bool {
        let Some(index) = self.lights.iter().position(|l| l.name == name) else {
            return false;
        };
        let light = self.lights.remove(index);
        for id in light.node_ids() {
            scene.remove(id);
        }
        true
    }

    /// Remove every managed light.
    pub fn clear_all_lights(&mut self, scene: &mut Scene) {
        for light in self.lights.drain(..) {
            for id in light.node_ids() {
                scene.remove(id);
            }
        }
    }

    /// Flip every light's visibility. Returns the new lighting flag.
    pub fn toggle_light_visibility(&mut self, scene: &mut Scene) -> bool {
        self.lighting_visible = !self.lighting_visible;
        for light in &self.lights {
            if let Some(node) = scene.get_mut(light.node) {
                let visible = node.is_visible();
                node.set_visible(!visible);
            }
        }
        self.lighting_visible
    }

    /// Flip every helper's visibility. Returns the new helper flag.
    pub fn toggle_helpers_visibility(&mut self, scene: &mut Scene) -> bool {
        self.helpers_visible = !self.helpers_visible;
        for helper in self.lights.iter().filter_map(|l| l.helper) {
            if let Some(node) = scene.get_mut(helper) {
                node.set_visible(self.helpers_visible);
            }
        }
        self.helpers_visible
    }

    /// Number of live lights.
    #[inline]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Live lights in creation order.
    #[inline]
    pub fn lights(&self) -> &[ManagedLight] {
        &self.lights
    }

    /// Look up a live light by name.
    pub fn get(&self, name: &str) -> Option<&ManagedLight> {
        self.lights.iter().find(|l| l.name == name)
    }

    /// Current lighting visibility flag.
    #[inline]
    pub fn is_lighting_visible(&self) -> bool {
        self.lighting_visible
    }

    /// Current helper visibility flag.
    #[inline]
    pub fn helpers_visible(&self) -> bool {
        self.helpers_visible
    }

    /// Pack the visible lights into a GPU uniform.
    pub fn uniforms(&self, scene: &Scene) -> LightsUniform {
        let mut uniform = LightsUniform::new();
        for light in &self.lights {
            let Some(node) = scene.get(light.node).filter(|n| n.is_visible()) else {
                continue;
            };
            let Some(source) = node.kind().as_light() else {
                continue;
            };
            match source {
                LightSource::Ambient(a) => uniform.add_ambient(a.color, a.intensity),
                LightSource::Hemisphere(h) => {
                    uniform.set_hemisphere(h.sky_color, h.ground_color, h.intensity, true)
                }
                _ => {
                    let (_, rotation, position) =
                        scene.world_matrix(light.node).to_scale_rotation_translation();
                    let target = light
                        .target
                        .map_or(position + Vec3::NEG_Y, |t| scene.world_position(t));
                    let placement = LightPlacement {
                        position,
                        target,
                        rotation,
                    };
                    if let Some(slot) = source.to_uniform(&placement) {
                        if uniform.add_light(slot).is_none() {
                            log::warn!("Light limit reached, \"{}\" is not rendered", light.name);
                        }
                    }
                }
            }
        }
        uniform
    }
}
