use glam::Vec3;
use tracing::{info, trace};

use crate::config::GameConfig;
use crate::controller::input::MoveIntent;
use crate::controller::movement::{MovementController, StepOutcome};
use crate::controller::spatial::SpatialIndex;
use crate::loader::LoadError;
use crate::model::{Avatar, GameObject, ObjectKind, SceneGraph};

/// Everything that exists once the scene is loaded: lives for the rest of the session
pub struct GameSession {
    pub scene: SceneGraph,
    pub avatar: Avatar,
    pub spatial: SpatialIndex,
    pub movement: MovementController,
    /// Frame-driven objects in dispatch order
    pub objects: Vec<GameObject>,
}

impl GameSession {
    /// Fails when the avatar or field node is missing, leaving the caller not ready
    pub fn from_scene(mut scene: SceneGraph, config: &GameConfig) -> Result<Self, LoadError> {
        let avatar_node = scene
            .find_by_name(&config.avatar_node)
            .ok_or_else(|| LoadError::MissingNode(config.avatar_node.clone()))?;
        let field_node = scene
            .find_by_name(&config.field_node)
            .ok_or_else(|| LoadError::MissingNode(config.field_node.clone()))?;

        // Avatar and field live at the top level, so the avatar's local translation
        // and the obstacle boxes share one frame
        scene.detach(avatar_node);
        scene.detach(field_node);

        let mut start = scene.translation(avatar_node);
        start.y = config.avatar_height;
        scene.set_translation(avatar_node, start);

        let spatial = SpatialIndex::build(&scene, field_node, &config.non_collidable);

        let mut objects = vec![
            GameObject::new(ObjectKind::Avatar, avatar_node),
            GameObject::new(ObjectKind::FieldRoot, field_node),
        ];
        objects.extend(
            spatial
                .obstacles()
                .iter()
                .map(|o| GameObject::new(ObjectKind::Obstacle, o.node)),
        );

        info!(?start, obstacles = spatial.len(), "session ready");

        Ok(Self {
            scene,
            avatar: Avatar::new(avatar_node, start),
            spatial,
            movement: MovementController::new(config.speed, config.arena_half_extent),
            objects,
        })
    }

    /// One frame: refresh pass over all objects, then step pass.
    /// Boxes are always current before the avatar queries them.
    pub fn update(&mut self, intent: &MoveIntent) -> StepOutcome {
        for object in &self.objects {
            match object.kind {
                ObjectKind::FieldRoot => self.spatial.refresh(&self.scene),
                ObjectKind::Avatar | ObjectKind::Obstacle => {}
            }
        }

        let mut outcome = StepOutcome::Committed;
        for object in &self.objects {
            match object.kind {
                ObjectKind::Avatar => {
                    outcome = self.movement.step(&mut self.avatar, intent, &self.spatial);
                    self.scene.set_translation(object.node, self.avatar.position);
                }
                ObjectKind::FieldRoot | ObjectKind::Obstacle => {}
            }
        }

        if intent.action {
            trace!(position = ?self.avatar.position, "action pressed");
        }
        outcome
    }

    pub fn avatar_position(&self) -> Vec3 {
        self.avatar.position
    }
}
