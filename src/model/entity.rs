use glam::Vec3;

use super::scene_graph::NodeId;

/// What a game object is, dispatched on by the frame driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// The player-controlled node; stepped every frame
    Avatar,
    /// Parent of all obstacles; refreshes their world boxes every frame
    FieldRoot,
    /// A field child registered in the spatial index; inert on its own
    Obstacle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameObject {
    pub kind: ObjectKind,
    pub node: NodeId,
}

impl GameObject {
    pub fn new(kind: ObjectKind, node: NodeId) -> Self {
        Self { kind, node }
    }
}

/// Player avatar position state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Avatar {
    pub node: NodeId,
    pub position: Vec3,
    /// Position at the start of the last step, restored when a move is rejected
    pub previous_position: Vec3,
}

impl Avatar {
    pub fn new(node: NodeId, position: Vec3) -> Self {
        Self {
            node,
            position,
            previous_position: position,
        }
    }
}
