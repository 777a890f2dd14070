use glam::Vec3;
use tracing::trace;

use crate::controller::input::MoveIntent;
use crate::controller::spatial::{ObstacleId, SpatialIndex};
use crate::model::Avatar;

/// Result of one avatar step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Committed,
    /// Tentative position was inside solid obstacles; position unchanged
    Reverted { blocked_by: Vec<ObstacleId> },
}

/// Square clamp region on the horizontal plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub half_extent: f32,
}

impl Arena {
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        let h = self.half_extent;
        Vec3::new(p.x.clamp(-h, h), p.y, p.z.clamp(-h, h))
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x.abs() <= self.half_extent && p.z.abs() <= self.half_extent
    }
}

/// Moves the avatar from input, clamped to the arena and blocked by solid obstacles.
///
/// One discrete look-ahead per frame: the move is accepted or rejected as a whole,
/// so a fast enough step can pass through a thin obstacle.
#[derive(Debug, Clone)]
pub struct MovementController {
    pub speed: f32,
    pub arena: Arena,
}

impl MovementController {
    pub fn new(speed: f32, arena_half_extent: f32) -> Self {
        Self {
            speed,
            arena: Arena { half_extent: arena_half_extent },
        }
    }

    /// Input-driven candidate: left/right on x, up/down on z, axes independent
    pub fn tentative(&self, from: Vec3, intent: &MoveIntent) -> Vec3 {
        let mut p = from;
        if intent.left {
            p.x -= self.speed;
        }
        if intent.right {
            p.x += self.speed;
        }
        if intent.up {
            p.z -= self.speed;
        }
        if intent.down {
            p.z += self.speed;
        }
        p
    }

    pub fn step(&self, avatar: &mut Avatar, intent: &MoveIntent, index: &SpatialIndex) -> StepOutcome {
        avatar.previous_position = avatar.position;

        let candidate = self.arena.clamp(self.tentative(avatar.position, intent));
        debug_assert!(self.arena.contains(candidate));

        if !index.blocking(candidate) {
            avatar.position = candidate;
            return StepOutcome::Committed;
        }

        let blocked_by: Vec<ObstacleId> = index
            .query(candidate)
            .into_iter()
            .filter(|o| o.has_geometry)
            .map(|o| o.id)
            .collect();
        trace!(?candidate, ?blocked_by, "move rejected");
        avatar.position = avatar.previous_position;
        StepOutcome::Reverted { blocked_by }
    }
}
