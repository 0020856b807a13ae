//! Standard PBR material description.

use crate::math::Color;
use bytemuck::{Pod, Zeroable};
use std::collections::BTreeMap;

/// Texture slots a standard material can bind.
///
/// Declaration order is the binding order used by shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    /// Base color.
    Map,
    /// Tangent-space normals.
    NormalMap,
    /// Roughness (green channel).
    RoughnessMap,
    /// Metalness (blue channel).
    MetalnessMap,
    /// Ambient occlusion.
    AoMap,
    /// Emissive color.
    EmissiveMap,
    /// Alpha mask.
    AlphaMap,
    /// Environment reflection.
    EnvMap,
    /// Baked lighting.
    LightMap,
    /// Bump height.
    BumpMap,
    /// Vertex displacement.
    DisplacementMap,
}

impl TextureSlot {
    /// Slots dropped first when a material binds too many textures.
    pub const EXPENDABLE: [TextureSlot; 4] = [
        TextureSlot::AoMap,
        TextureSlot::EmissiveMap,
        TextureSlot::AlphaMap,
        TextureSlot::EnvMap,
    ];
}

/// Material uniform data.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct MaterialUniform {
    /// Base color RGB + unused.
    pub color: [f32; 4],
    /// x=roughness, y=metalness, z=texture mask bits, w=unused.
    pub params: [f32; 4],
}

/// A standard metallic-roughness material.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    /// Material name.
    pub name: String,
    /// Base color.
    pub color: Color,
    /// Perceptual roughness.
    pub roughness: f32,
    /// Metalness.
    pub metalness: f32,
    /// Bound textures, by slot, as indices into the source document.
    textures: BTreeMap<TextureSlot, usize>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardMaterial {
    /// Texture slot budget per material.
    pub const MAX_TEXTURES: usize = 8;

    /// Create a new mid-grey material.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            color: Color::from_hex(0x808080),
            roughness: 0.5,
            metalness: 0.5,
            textures: BTreeMap::new(),
        }
    }

    /// Create with a specific color.
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::new()
        }
    }

    /// Builder: bind a texture.
    pub fn with_texture(mut self, slot: TextureSlot, texture: usize) -> Self {
        self.set_texture(slot, texture);
        self
    }

    /// Bind a texture to a slot.
    pub fn set_texture(&mut self, slot: TextureSlot, texture: usize) {
        self.textures.insert(slot, texture);
    }

    /// Unbind a slot.
    pub fn clear_texture(&mut self, slot: TextureSlot) -> Option<usize> {
        self.textures.remove(&slot)
    }

    /// Get the texture bound to a slot.
    #[inline]
    pub fn texture(&self, slot: TextureSlot) -> Option<usize> {
        self.textures.get(&slot).copied()
    }

    /// Number of bound texture slots.
    #[inline]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Bound slots in binding order.
    pub fn texture_slots(&self) -> impl Iterator<Item = TextureSlot> + '_ {
        self.textures.keys().copied()
    }

    /// If more than [`Self::MAX_TEXTURES`] slots are bound, unbind the
    /// expendable slots. Returns the slots that were cleared.
    pub fn cap_textures(&mut self) -> Vec<TextureSlot> {
        if self.textures.len() <= Self::MAX_TEXTURES {
            return Vec::new();
        }
        TextureSlot::EXPENDABLE
            .iter()
            .filter(|slot| self.textures.remove(slot).is_some())
            .copied()
            .collect()
    }

    /// Get the uniform data.
    pub fn uniform(&self) -> MaterialUniform {
        let mask = self
            .textures
            .keys()
            .fold(0u32, |mask, slot| mask | (1 << *slot as u32));
        MaterialUniform {
            color: [self.color.r, self.color.g, self.color.b, 1.0],
            params: [self.roughness, self.metalness, mask as f32, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overloaded() -> StandardMaterial {
        [
            TextureSlot::Map,
            TextureSlot::NormalMap,
            TextureSlot::RoughnessMap,
            TextureSlot::MetalnessMap,
            TextureSlot::AoMap,
            TextureSlot::EmissiveMap,
            TextureSlot::AlphaMap,
            TextureSlot::EnvMap,
            TextureSlot::LightMap,
        ]
        .into_iter()
        .enumerate()
        .fold(StandardMaterial::new(), |m, (i, slot)| m.with_texture(slot, i))
    }

    #[test]
    fn test_default_is_mid_grey() {
        let m = StandardMaterial::new();
        assert_eq!(m.color.to_hex(), 0x808080);
        assert_eq!(m.roughness, 0.5);
        assert_eq!(m.metalness, 0.5);
    }

    #[test]
    fn test_cap_textures_clears_expendable_slots() {
        let mut m = overloaded();
        assert_eq!(m.texture_count(), 9);
        let cleared = m.cap_textures();
        assert_eq!(cleared, TextureSlot::EXPENDABLE.to_vec());
        assert_eq!(m.texture_count(), 5);
        assert_eq!(m.texture(TextureSlot::Map), Some(0));
        assert_eq!(m.texture(TextureSlot::LightMap), Some(8));
    }

    #[test]
    fn test_cap_textures_within_budget_is_noop() {
        let mut m = StandardMaterial::new()
            .with_texture(TextureSlot::Map, 0)
            .with_texture(TextureSlot::AoMap, 1);
        assert!(m.cap_textures().is_empty());
        assert_eq!(m.texture_count(), 2);
    }
}
