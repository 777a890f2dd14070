// MODEL: scene data and game objects
pub mod bounds;
pub mod scene_graph;
pub mod entity;

pub use bounds::Aabb;
pub use scene_graph::{NodeId, SceneGraph, SceneNode};
pub use entity::{Avatar, GameObject, ObjectKind};
