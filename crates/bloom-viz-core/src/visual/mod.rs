//! Everything that turns detector output into pixels.

pub mod color;
pub mod particles;
pub mod scene;
pub mod shockwave;
pub mod state;

pub use color::{connotation_color, palette_color, Hsv};
pub use particles::{Particle, ParticleField, ParticleKind};
pub use shockwave::{Shockwave, ShockwaveField};
pub use state::AnimationState;
