//! Post-processing effect chain.
//!
//! The chain is a description of the passes a scene profile asks for, in the
//! order they run. A host renderer turns each [`EffectPass`] into GPU work.

mod effect_chain;
mod settings;

pub use effect_chain::*;
pub use settings::*;
