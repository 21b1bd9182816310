//! Closed-form envelope trajectories for the two-defender barrier game.
//!
//! Everything here is a pure function of an [`envelope_shared::EnvelopeParams`]
//! and per-call inputs, so independent engagements can be computed on
//! separate threads without coordination.

pub mod analyzer;
pub mod composer;
pub mod frame;
pub mod integrator;
pub mod kinematics;
pub mod policy;
pub mod sampler;

pub use composer::*;
pub use kinematics::*;
pub use policy::*;
pub use sampler::*;
