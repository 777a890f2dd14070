use glam::{Mat4, Vec3};

use super::bounds::Aabb;

/// Index of a node inside its [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node
    pub local_transform: Mat4,
    /// Bounding box of the node's own mesh in local space, `None` for groups/markers
    pub geometry: Option<Aabb>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl SceneNode {
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}

/// Flat arena of scene nodes. Stands in for the engine's scene graph:
/// local boxes come from mesh data, world transforms from the parent chain.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        local_transform: Mat4,
        geometry: Option<Aabb>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            local_transform,
            geometry,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Depth-first, first match in document order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Object-to-world matrix: parent chain composed root first
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cur = Some(id);
        while let Some(c) = cur {
            match self.nodes.get(c.0) {
                Some(node) => {
                    m = node.local_transform * m;
                    cur = node.parent;
                }
                None => break,
            }
        }
        m
    }

    /// Box of the node's own mesh, or for a geometry-less node the union of its
    /// descendants' geometry expressed in the node's space.
    pub fn local_bounds(&self, id: NodeId) -> Option<Aabb> {
        let node = self.nodes.get(id.0)?;
        if let Some(g) = node.geometry {
            return Some(g);
        }
        node.children
            .iter()
            .filter_map(|&c| {
                let child = &self.nodes[c.0];
                self.local_bounds(c).map(|b| b.transformed(&child.local_transform))
            })
            .reduce(|a, b| a.union(&b))
    }

    /// Move a node (and its subtree) to the top level. The local transform is kept
    /// as is, so whatever its former ancestors contributed is dropped.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(id.0).and_then(|n| n.parent) else { return };
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
        self.roots.push(id);
    }

    pub fn set_local_transform(&mut self, id: NodeId, m: Mat4) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.local_transform = m;
        }
    }

    pub fn translation(&self, id: NodeId) -> Vec3 {
        self.nodes
            .get(id.0)
            .map(|n| n.local_transform.w_axis.truncate())
            .unwrap_or(Vec3::ZERO)
    }

    /// Replace the translation part of the local transform, keeping rotation and scale
    pub fn set_translation(&mut self, id: NodeId, pos: Vec3) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.local_transform.w_axis = pos.extend(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Option<Aabb> {
        Some(Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)))
    }

    #[test]
    fn test_world_transform_composes_parent_chain() {
        let mut g = SceneGraph::new();
        let root = g.add_node(None, "field", Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)), None);
        let child = g.add_node(Some(root), "rock", Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)), unit_box());

        let p = g.world_transform(child).transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(10.0, 0.0, 2.0));
        assert_eq!(g.children(root), &[child]);
        assert_eq!(g.roots(), &[root]);
    }

    #[test]
    fn test_find_by_name_searches_nested_nodes() {
        let mut g = SceneGraph::new();
        let scene = g.add_node(None, "Scene", Mat4::IDENTITY, None);
        let _ = g.add_node(Some(scene), "field", Mat4::IDENTITY, None);
        let avatar = g.add_node(Some(scene), "avater", Mat4::IDENTITY, unit_box());

        assert_eq!(g.find_by_name("avater"), Some(avatar));
        assert_eq!(g.find_by_name("missing"), None);
    }

    #[test]
    fn test_group_bounds_cover_children() {
        let mut g = SceneGraph::new();
        let group = g.add_node(None, "trees", Mat4::IDENTITY, None);
        g.add_node(Some(group), "a", Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0)), unit_box());
        g.add_node(Some(group), "b", Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)), unit_box());
        let empty = g.add_node(None, "marker", Mat4::IDENTITY, None);

        let b = g.local_bounds(group).unwrap();
        assert_eq!(b.min.x, -2.5);
        assert_eq!(b.max.x, 2.5);
        assert!(g.local_bounds(empty).is_none());
    }

    #[test]
    fn test_detach_drops_ancestor_transform() {
        let mut g = SceneGraph::new();
        let scene = g.add_node(None, "Scene", Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)), None);
        let field = g.add_node(Some(scene), "field", Mat4::IDENTITY, None);
        let rock = g.add_node(Some(field), "rock", Mat4::IDENTITY, unit_box());

        g.detach(field);
        assert_eq!(g.roots(), &[scene, field]);
        assert!(g.children(scene).is_empty());
        assert_eq!(g.node(field).unwrap().parent, None);
        assert_eq!(g.world_transform(rock).transform_point3(Vec3::ZERO), Vec3::ZERO);

        // already top level: no-op
        g.detach(field);
        assert_eq!(g.roots().len(), 2);
    }

    #[test]
    fn test_set_translation_keeps_scale() {
        let mut g = SceneGraph::new();
        let n = g.add_node(None, "avater", Mat4::from_scale(Vec3::splat(2.0)), unit_box());
        g.set_translation(n, Vec3::new(1.0, 0.1, -1.0));

        assert_eq!(g.translation(n), Vec3::new(1.0, 0.1, -1.0));
        let corner = g.world_transform(n).transform_point3(Vec3::splat(0.5));
        assert!(corner.abs_diff_eq(Vec3::new(2.0, 1.1, 0.0), 1e-6));
    }
}
