use glam::{Mat4, Vec3};
use tracing::{debug, info};

use crate::model::{Aabb, NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObstacleId(pub usize);

/// A field child whose world box can block the avatar
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub node: NodeId,
    pub name: String,
    pub local_bounds: Aabb,
    pub world_transform: Mat4,
    /// Recomputed by [`SpatialIndex::refresh`] every frame
    pub world_bounds: Aabb,
    /// False for group/marker nodes: tracked and queryable, never blocking
    pub has_geometry: bool,
}

/// Containment index over the field's children
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    obstacles: Vec<Obstacle>,
}

impl SpatialIndex {
    /// Register every child of `field_root` except the ones named in `excluded`.
    /// Excluded children (walls) are still part of the scene, they just never collide.
    pub fn build(graph: &SceneGraph, field_root: NodeId, excluded: &[String]) -> Self {
        let mut obstacles = Vec::new();

        for &child in graph.children(field_root) {
            let Some(node) = graph.node(child) else { continue };
            if excluded.iter().any(|name| *name == node.name) {
                debug!(name = %node.name, "skipping non-collidable field child");
                continue;
            }

            let local_bounds = graph
                .local_bounds(child)
                .unwrap_or_else(|| Aabb::from_point(Vec3::ZERO));
            let world_transform = graph.world_transform(child);

            obstacles.push(Obstacle {
                id: ObstacleId(obstacles.len()),
                node: child,
                name: node.name.clone(),
                local_bounds,
                world_transform,
                world_bounds: local_bounds.transformed(&world_transform),
                has_geometry: node.has_geometry(),
            });
        }

        info!(
            obstacles = obstacles.len(),
            solid = obstacles.iter().filter(|o| o.has_geometry).count(),
            "spatial index built"
        );
        Self { obstacles }
    }

    /// Recompute every world box from the node's current world transform.
    /// The field and its children may move between frames.
    pub fn refresh(&mut self, graph: &SceneGraph) {
        for obstacle in self.obstacles.iter_mut() {
            obstacle.world_transform = graph.world_transform(obstacle.node);
            obstacle.world_bounds = obstacle.local_bounds.transformed(&obstacle.world_transform);
        }
    }

    /// All obstacles whose world box contains `point`, in registration order
    pub fn query(&self, point: Vec3) -> Vec<&Obstacle> {
        self.obstacles
            .iter()
            .filter(|o| o.world_bounds.contains_point(point))
            .collect()
    }

    /// True if a solid obstacle contains `point`
    pub fn blocking(&self, point: Vec3) -> bool {
        self.query(point).iter().any(|o| o.has_geometry)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(half: f32) -> Option<Aabb> {
        Some(Aabb::new(Vec3::splat(-half), Vec3::splat(half)))
    }

    fn walls() -> Vec<String> {
        vec!["wall".to_string()]
    }

    fn field() -> (SceneGraph, NodeId) {
        let mut g = SceneGraph::new();
        let root = g.add_node(None, "field", Mat4::IDENTITY, None);
        g.add_node(Some(root), "rock", Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)), cube(1.0));
        g.add_node(Some(root), "wall", Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0)), cube(1.0));
        g.add_node(Some(root), "bush", Mat4::from_translation(Vec3::new(2.5, 0.0, 0.0)), cube(1.0));
        (g, root)
    }

    #[test]
    fn test_walls_are_excluded() {
        let (g, root) = field();
        let index = SpatialIndex::build(&g, root, &walls());

        assert_eq!(index.len(), 2);
        assert!(index.obstacles().iter().all(|o| o.name != "wall"));
        // the wall's box would contain this point
        assert!(index.query(Vec3::new(-2.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_query_returns_all_overlapping() {
        let (g, root) = field();
        let index = SpatialIndex::build(&g, root, &walls());

        let hits: Vec<&str> = index
            .query(Vec3::new(2.2, 0.0, 0.0))
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(hits, vec!["rock", "bush"]);
        assert!(index.query(Vec3::new(0.0, 0.0, 4.0)).is_empty());
    }

    #[test]
    fn test_refresh_tracks_moving_field() {
        let (mut g, root) = field();
        let mut index = SpatialIndex::build(&g, root, &walls());
        let p = Vec3::new(2.0, 0.0, 3.0);
        assert!(!index.blocking(p));

        g.set_local_transform(root, Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)));
        // stale until refreshed
        assert!(!index.blocking(p));
        index.refresh(&g);
        assert!(index.blocking(p));
    }

    #[test]
    fn test_geometry_less_child_is_tracked_but_not_solid() {
        let mut g = SceneGraph::new();
        let root = g.add_node(None, "field", Mat4::IDENTITY, None);
        let group = g.add_node(Some(root), "trigger", Mat4::IDENTITY, None);
        g.add_node(Some(group), "trigger_mesh", Mat4::IDENTITY, cube(0.5));
        g.add_node(Some(root), "marker", Mat4::from_translation(Vec3::new(3.0, 0.0, 3.0)), None);

        let index = SpatialIndex::build(&g, root, &walls());
        assert_eq!(index.len(), 2);

        let hits = index.query(Vec3::ZERO);
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].has_geometry);
        assert!(!index.blocking(Vec3::ZERO));

        // marker with nothing beneath it collapses to its origin
        let marker = index.get(ObstacleId(1)).unwrap();
        assert_eq!(marker.world_bounds, Aabb::from_point(Vec3::new(3.0, 0.0, 3.0)));
    }

    #[test]
    fn test_child_transform_applies_to_local_box() {
        let mut g = SceneGraph::new();
        let root = g.add_node(None, "field", Mat4::from_scale(Vec3::splat(2.0)), None);
        g.add_node(Some(root), "rock", Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)), cube(0.5));

        let index = SpatialIndex::build(&g, root, &walls());
        let rock = &index.obstacles()[0];
        assert_eq!(rock.world_bounds.min, Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(rock.world_bounds.max, Vec3::new(3.0, 1.0, 1.0));
    }
}
