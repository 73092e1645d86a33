//! Scene graph.
//!
//! Nodes live in an arena and are never removed; a [`NodeId`] stays valid for
//! the life of the graph.  Rotation is stored as XYZ Euler angles, which is
//! what pose targets are expressed in, and converted to a quaternion when a
//! matrix is needed.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Pickable geometry.  Quads lie in the local XY plane, centred, double sided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Quad { width: f32, height: f32 },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name:     String,
    pub position: Vec3,
    /// Euler angles, XYZ order, radians.
    pub rotation: Vec3,
    pub scale:    Vec3,
    pub opacity:  f32,
    pub shape:    Option<Shape>,
    parent:       Option<NodeId>,
    children:     Vec<NodeId>,
}

impl Node {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Node {
            name:     name.to_string(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale:    Vec3::ONE,
            opacity:  1.0,
            shape:    None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn set_quat(&mut self, q: Quat) {
        let (x, y, z) = q.normalize().to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        SceneGraph::new()
    }
}

impl SceneGraph {
    /// A graph holding only the root node.
    pub fn new() -> Self {
        SceneGraph { nodes: vec![Node::new("scene", None)] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn add(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_quad(&mut self, parent: NodeId, name: &str, width: f32, height: f32) -> NodeId {
        let id = self.add(parent, name);
        self.nodes[id.0].shape = Some(Shape::Quad { width, height });
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// True when `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n.0].parent;
        }
        false
    }

    /// `id` and all of its descendants, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out   = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.0].children.iter().rev());
        }
        out
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut m   = self.nodes[id.0].local_matrix();
        let mut cur = self.nodes[id.0].parent;
        while let Some(p) = cur {
            m   = self.nodes[p.0].local_matrix() * m;
            cur = self.nodes[p.0].parent;
        }
        m
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    pub fn world_quat(&self, id: NodeId) -> Quat {
        let (_, rotation, _) = self.world_matrix(id).to_scale_rotation_translation();
        rotation
    }

    /// Product of opacities from the root down to `id`.
    pub fn world_opacity(&self, id: NodeId) -> f32 {
        let mut o   = 1.0;
        let mut cur = Some(id);
        while let Some(n) = cur {
            o  *= self.nodes[n.0].opacity;
            cur = self.nodes[n.0].parent;
        }
        o
    }

    /// Move `child` under `new_parent` without changing where it appears in
    /// the world.  Returns false (and does nothing) for the root or when the
    /// move would create a cycle.
    pub fn attach(&mut self, new_parent: NodeId, child: NodeId) -> bool {
        if child == self.root() || self.is_ancestor(child, new_parent) {
            return false;
        }

        let local = self.world_matrix(new_parent).inverse() * self.world_matrix(child);
        let (scale, rotation, position) = local.to_scale_rotation_translation();

        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[new_parent.0].children.push(child);

        let node = &mut self.nodes[child.0];
        node.parent   = Some(new_parent);
        node.position = position;
        node.scale    = scale;
        node.set_quat(rotation);
        true
    }

    /// Turn `id` so its local +Z axis points at `target` (world space).
    pub fn look_at(&mut self, id: NodeId, target: Vec3) {
        let z = (target - self.world_position(id)).normalize_or_zero();
        if z == Vec3::ZERO {
            return;
        }
        let mut x = Vec3::Y.cross(z);
        if x.length_squared() < 1e-12 {
            x = Vec3::X;
        }
        let x = x.normalize();
        let y = z.cross(x);

        let mut q = Quat::from_mat3(&Mat3::from_cols(x, y, z));
        if let Some(parent) = self.nodes[id.0].parent {
            q = self.world_quat(parent).inverse() * q;
        }
        self.nodes[id.0].set_quat(q);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    fn rotated_group(g: &mut SceneGraph) -> NodeId {
        let group = g.add(g.root(), "group");
        let n = g.get_mut(group);
        n.position = Vec3::new(0.0, 100.0, 0.0);
        n.rotation = Vec3::new(0.0, 0.7, 0.0);
        n.scale    = Vec3::splat(2.0);
        group
    }

    #[test]
    fn attach_preserves_world_transform() {
        let mut g = SceneGraph::new();
        let group = rotated_group(&mut g);
        let child = g.add(group, "photo");
        g.get_mut(child).position = Vec3::new(50.0, -20.0, 10.0);
        g.get_mut(child).rotation = Vec3::new(0.1, 0.2, 0.3);

        let world_pos = g.world_position(child);
        let world_rot = g.world_quat(child);

        assert!(g.attach(g.root(), child));
        assert_eq!(g.get(child).parent(), Some(g.root()));
        assert!(!g.get(group).children().contains(&child));
        assert!(close(g.world_position(child), world_pos));
        assert!(g.world_quat(child).dot(world_rot).abs() > 0.9999);
        assert!(close(g.get(child).scale, Vec3::splat(2.0)));

        // and back again
        assert!(g.attach(group, child));
        assert!(close(g.get(child).position, Vec3::new(50.0, -20.0, 10.0)));
        assert!(close(g.get(child).scale, Vec3::ONE));
    }

    #[test]
    fn attach_refuses_cycles() {
        let mut g = SceneGraph::new();
        let a = g.add(g.root(), "a");
        let b = g.add(a, "b");
        assert!(!g.attach(b, a));
        assert!(!g.attach(a, g.root()));
        assert_eq!(g.get(a).parent(), Some(g.root()));
    }

    #[test]
    fn look_at_faces_target_under_rotated_parent() {
        let mut g = SceneGraph::new();
        let group = rotated_group(&mut g);
        let photo = g.add(group, "photo");
        g.get_mut(photo).position = Vec3::new(30.0, 0.0, 0.0);

        let target = Vec3::new(0.0, 150.0, 1800.0);
        g.look_at(photo, target);

        let facing = g.world_quat(photo) * Vec3::Z;
        let wanted = (target - g.world_position(photo)).normalize();
        assert!(facing.dot(wanted) > 0.999);
    }

    #[test]
    fn descendants_and_opacity() {
        let mut g = SceneGraph::new();
        let a = g.add(g.root(), "a");
        let b = g.add(a, "b");
        let c = g.add(b, "c");
        g.get_mut(a).opacity = 0.5;
        g.get_mut(c).opacity = 0.5;
        assert_eq!(g.descendants(a), vec![a, b, c]);
        assert_eq!(g.world_opacity(c), 0.25);
    }
}
