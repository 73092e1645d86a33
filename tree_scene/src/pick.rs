//! Ray picking against quads in the scene graph.

use std::cmp::Ordering;

use crate::camera::Ray;
use crate::graph::{NodeId, SceneGraph, Shape};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub node:     NodeId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point:    glam::Vec3,
}

/// Intersect a single node's own shape (children are not visited).
pub fn intersect_node(graph: &SceneGraph, id: NodeId, ray: &Ray) -> Option<Hit> {
    let Some(Shape::Quad { width, height }) = graph.get(id).shape else {
        return None;
    };

    let world = graph.world_matrix(id);
    if world.determinant().abs() < 1e-12 {
        return None;
    }
    let inv = world.inverse();
    let o = inv.transform_point3(ray.origin);
    let d = inv.transform_vector3(ray.direction);
    if d.z.abs() < 1e-9 {
        return None;
    }

    let t = -o.z / d.z;
    if t < 0.0 {
        return None;
    }
    let local = o + d * t;
    if local.x.abs() > width * 0.5 || local.y.abs() > height * 0.5 {
        return None;
    }

    let point = world.transform_point3(local);
    Some(Hit { node: id, distance: (point - ray.origin).length(), point })
}

/// Every hit under `roots` (recursively), nearest first.
pub fn intersect(graph: &SceneGraph, roots: &[NodeId], ray: &Ray) -> Vec<Hit> {
    let mut hits: Vec<Hit> = roots
        .iter()
        .flat_map(|&r| graph.descendants(r))
        .filter_map(|id| intersect_node(graph, id, ray))
        .collect();
    hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    hits
}

pub fn pick(graph: &SceneGraph, roots: &[NodeId], ray: &Ray) -> Option<Hit> {
    intersect(graph, roots, ray).into_iter().next()
}

/// Walk up from `id` to the outermost node below `container` (or below the
/// scene root, for an object that has been lifted out of its container).
pub fn decoration_root(graph: &SceneGraph, id: NodeId, container: NodeId) -> NodeId {
    let mut cur = id;
    while let Some(parent) = graph.get(cur).parent() {
        if parent == container || parent == graph.root() {
            break;
        }
        cur = parent;
    }
    cur
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn ray_down_z(x: f32, y: f32) -> Ray {
        Ray { origin: Vec3::new(x, y, 1000.0), direction: Vec3::NEG_Z }
    }

    #[test]
    fn nearest_quad_wins() {
        let mut g = SceneGraph::new();
        let far  = g.add_quad(g.root(), "far", 100.0, 100.0);
        let near = g.add_quad(g.root(), "near", 100.0, 100.0);
        g.get_mut(near).position.z = 200.0;

        let hits = intersect(&g, &[far, near], &ray_down_z(10.0, 10.0));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert!((hits[0].distance - 800.0).abs() < 1e-3);
        assert_eq!(pick(&g, &[far, near], &ray_down_z(10.0, 10.0)).unwrap().node, near);
    }

    #[test]
    fn misses_outside_and_behind() {
        let mut g = SceneGraph::new();
        let q = g.add_quad(g.root(), "q", 100.0, 100.0);
        assert!(pick(&g, &[q], &ray_down_z(60.0, 0.0)).is_none());

        let away = Ray { origin: Vec3::new(0.0, 0.0, 100.0), direction: Vec3::Z };
        assert!(pick(&g, &[q], &away).is_none());
    }

    #[test]
    fn back_face_is_hit_too() {
        let mut g = SceneGraph::new();
        let q = g.add_quad(g.root(), "q", 100.0, 100.0);
        g.get_mut(q).rotation.y = std::f32::consts::PI;
        assert!(pick(&g, &[q], &ray_down_z(0.0, 0.0)).is_some());
    }

    #[test]
    fn hits_nested_children_in_parent_space() {
        let mut g = SceneGraph::new();
        let deco  = g.add(g.root(), "decorations");
        let photo = g.add(deco, "photo");
        g.get_mut(photo).position = Vec3::new(300.0, 0.0, 0.0);
        let quad  = g.add_quad(photo, "image", 110.0, 110.0);

        let hit = pick(&g, &[photo], &ray_down_z(320.0, 20.0)).unwrap();
        assert_eq!(hit.node, quad);
        assert_eq!(decoration_root(&g, hit.node, deco), photo);

        g.attach(g.root(), photo);
        assert_eq!(decoration_root(&g, quad, deco), photo);
    }
}
