//! ECS Systems
//!
//! Recommendation, opinion dynamics, fraternization and layout physics.

pub mod fraternize;
pub mod opinion;
pub mod physics;
pub mod recommend;

pub use fraternize::{fraternize, promote_confidants};
pub use opinion::{
    advance_epoch, decay_dissonance, deliver_messages, receive_message, receive_messages,
    MessageOutcome,
};
pub use physics::{
    accumulate_forces, anchor_first_agent, apply_centering, compute_forces, integrate_motion,
    reset_motion, ANCHOR,
};
pub use recommend::{recommend, recommend_with, RecommendStrategy};
