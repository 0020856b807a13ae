//! Ordered list of post-processing passes.

use super::{BloomSettings, BokehSettings, EffectUniform, SsaoSettings};
use crate::profile::PostprocessingProfile;

/// A single pass in the chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectPass {
    /// Scene render into the chain's first target.
    Render,
    /// Bloom.
    Bloom(BloomSettings),
    /// Screen-space ambient occlusion.
    Ssao(SsaoSettings),
    /// FXAA anti-aliasing.
    Fxaa,
    /// SMAA anti-aliasing.
    Smaa,
    /// Depth of field.
    Bokeh(BokehSettings),
}

impl EffectPass {
    /// Get the name of this pass.
    pub fn name(&self) -> &'static str {
        match self {
            EffectPass::Render => "RenderPass",
            EffectPass::Bloom(_) => "UnrealBloomPass",
            EffectPass::Ssao(_) => "SSAOPass",
            EffectPass::Fxaa => "FXAAPass",
            EffectPass::Smaa => "SMAAPass",
            EffectPass::Bokeh(_) => "BokehPass",
        }
    }

    /// Parameters for the pass's uniform buffer.
    pub fn uniform(&self, width: u32, height: u32) -> EffectUniform {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let params = match self {
            EffectPass::Bloom(s) => [s.strength, s.radius, s.threshold, 0.0],
            EffectPass::Ssao(s) => [s.radius, s.intensity, s.bias, 0.0],
            EffectPass::Bokeh(s) => [s.focus, s.aperture, s.max_blur, 0.0],
            EffectPass::Render | EffectPass::Fxaa | EffectPass::Smaa => [0.0; 4],
        };
        EffectUniform {
            params,
            resolution: [1.0 / w, 1.0 / h, w, h],
        }
    }
}

/// The post-processing passes for the active scene profile.
///
/// An empty chain means the scene renders straight to the surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectChain {
    passes: Vec<EffectPass>,
}

impl EffectChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain a profile describes.
    pub fn from_profile(profile: &PostprocessingProfile) -> Self {
        let mut chain = Self::new();
        chain.rebuild(profile);
        chain
    }

    /// Replace all passes with the ones a profile describes.
    pub fn rebuild(&mut self, profile: &PostprocessingProfile) {
        self.passes.clear();
        if !profile.enabled {
            return;
        }

        let effects = &profile.effects;
        if effects.render_pass.is_some_and(|p| p.enabled) {
            self.passes.push(EffectPass::Render);
        }
        if let Some(bloom) = effects.bloom.as_ref().filter(|b| b.enabled) {
            self.passes.push(EffectPass::Bloom(bloom.into()));
        }
        if let Some(ssao) = effects.ssao.as_ref().filter(|s| s.enabled) {
            self.passes.push(EffectPass::Ssao(ssao.into()));
        }
        if effects.fxaa.is_some_and(|p| p.enabled) {
            self.passes.push(EffectPass::Fxaa);
        }
        if effects.smaa.is_some_and(|p| p.enabled) {
            self.passes.push(EffectPass::Smaa);
        }
        if let Some(bokeh) = effects.bokeh.as_ref().filter(|b| b.enabled) {
            self.passes.push(EffectPass::Bokeh(bokeh.into()));
        }

        log::debug!("Effect chain: {:?}", self.names().collect::<Vec<_>>());
    }

    /// Remove all passes.
    pub fn clear(&mut self) {
        self.passes.clear();
    }

    /// Passes in execution order.
    #[inline]
    pub fn passes(&self) -> &[EffectPass] {
        &self.passes
    }

    /// Pass names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(EffectPass::name)
    }

    /// Get a pass by name.
    pub fn get_pass(&self, name: &str) -> Option<&EffectPass> {
        self.passes.iter().find(|p| p.name() == name)
    }

    /// Number of passes.
    #[inline]
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether the chain has no passes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{schemas::fixtures, SceneProfile};

    fn profile() -> PostprocessingProfile {
        let scene: SceneProfile = serde_json::from_value(fixtures::scene("s")).unwrap();
        scene.postprocessing
    }

    #[test]
    fn test_chain_follows_enabled_effects() {
        let chain = EffectChain::from_profile(&profile());
        assert_eq!(
            chain.names().collect::<Vec<_>>(),
            vec!["RenderPass", "UnrealBloomPass", "FXAAPass"]
        );
        match chain.get_pass("UnrealBloomPass") {
            Some(EffectPass::Bloom(s)) => assert_eq!((s.strength, s.threshold), (0.5, 0.85)),
            other => panic!("unexpected pass {:?}", other),
        }
    }

    #[test]
    fn test_rebuild_does_not_accumulate() {
        let mut chain = EffectChain::from_profile(&profile());
        chain.rebuild(&profile());
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_disabled_postprocessing_clears_chain() {
        let mut chain = EffectChain::from_profile(&profile());
        let mut disabled = profile();
        disabled.enabled = false;
        chain.rebuild(&disabled);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_pass_uniform() {
        let pass = EffectPass::Ssao(SsaoSettings::default());
        let uniform = pass.uniform(200, 100);
        assert_eq!(uniform.params, [0.5, 1.0, 0.025, 0.0]);
        assert_eq!(uniform.resolution, [0.005, 0.01, 200.0, 100.0]);
    }
}
