//! Layout Body
//!
//! Position and motion state used by the force-directed layout.

use bevy_ecs::prelude::*;
use glam::DVec2;

/// Physical state of an agent in layout space
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Force accumulated during the current layout tick
    pub force: DVec2,
}

impl Body {
    pub fn at(position: DVec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn distance(&self, other: &Body) -> f64 {
        self.position.distance(other.position)
    }

    pub fn add_force(&mut self, force: DVec2) {
        self.force += force;
    }

    /// Clear motion state at the start of a layout tick
    pub fn reset(&mut self) {
        self.velocity = DVec2::ZERO;
        self.force = DVec2::ZERO;
    }

    pub fn dampen(&mut self, damping: f64) {
        self.velocity = (self.velocity + self.force) * damping;
    }

    /// Move by the current velocity. Returns the distance travelled.
    pub fn transfer_force(&mut self) -> f64 {
        self.position += self.velocity;
        self.force = DVec2::ZERO;
        self.velocity.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_integration() {
        let mut body = Body::at(DVec2::new(10.0, 10.0));
        body.add_force(DVec2::new(4.0, 0.0));
        body.add_force(DVec2::new(0.0, -2.0));
        body.dampen(0.5);

        let moved = body.transfer_force();
        assert_eq!(body.position, DVec2::new(12.0, 9.0));
        assert!((moved - 5.0f64.sqrt()).abs() < 1e-9);
        assert_eq!(body.force, DVec2::ZERO);

        body.reset();
        assert_eq!(body.velocity, DVec2::ZERO);
    }
}
