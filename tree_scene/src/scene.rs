//! Building the tree scene.
//!
//! ```text
//!   scene
//!   ├── galaxy ── dust
//!   ├── magic  ── sparkle
//!   ├── tree (y = 100)
//!   │     ├── trunk, leaves, outline, lights
//!   │     └── star
//!   ├── decorations (y = 100)
//!   │     └── photo_i ── frame, image
//!   └── snow
//! ```
//!
//! Particle geometry is not part of the graph; a renderer draws each layer's
//! cloud with its node's world transform and opacity.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, SceneGraph};

pub const PHOTO_SIZE: f32 = 110.0;
pub const FRAME_WIDTH: f32 = 130.0;
pub const FRAME_HEIGHT: f32 = 150.0;
pub const GROUP_LIFT: f32 = 100.0;

/// Starting opacities, also the tree-mode targets.
pub const TRUNK_OPACITY: f32 = 1.0;
pub const LEAF_OPACITY: f32 = 0.9;
pub const OUTLINE_OPACITY: f32 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub photo_count: usize,
    pub tree_height: f32,
    pub base_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            photo_count: 8,
            tree_height: 1100.0,
            base_radius: 480.0,
        }
    }
}

impl SceneConfig {
    /// Cone radius at height `h` (measured from the tree's centre).
    pub fn radius_at(&self, h: f32) -> f32 {
        (1.0 - (h + self.tree_height / 2.0) / self.tree_height) * self.base_radius
    }
}

/// Position plus XYZ Euler rotation, local to the decoration group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// A photo ornament.  Its two poses are fixed at build time.
#[derive(Clone, Debug)]
pub struct Decoration {
    index:         usize,
    node:          NodeId,
    image:         NodeId,
    frame:         NodeId,
    home:          NodeId,
    tree_pose:     Pose,
    universe_pose: Pose,
}

impl Decoration {
    pub fn index(&self) -> usize {
        self.index
    }

    /// The group node that moves, picks and gets focused.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The textured photo quad.
    pub fn image(&self) -> NodeId {
        self.image
    }

    pub fn frame(&self) -> NodeId {
        self.frame
    }

    /// The container the decoration was built under.
    pub fn home(&self) -> NodeId {
        self.home
    }

    pub fn tree_pose(&self) -> Pose {
        self.tree_pose
    }

    pub fn universe_pose(&self) -> Pose {
        self.universe_pose
    }
}

/// Nodes carrying a particle cloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layers {
    pub trunk:   NodeId,
    pub leaves:  NodeId,
    pub outline: NodeId,
    pub lights:  NodeId,
    pub star:    NodeId,
    pub dust:    NodeId,
    pub magic:   NodeId,
    pub snow:    NodeId,
}

#[derive(Clone, Debug)]
pub struct TreeScene {
    pub graph:       SceneGraph,
    pub config:      SceneConfig,
    pub tree:        NodeId,
    pub decorations: NodeId,
    pub galaxy:      NodeId,
    pub magic:       NodeId,
    pub layers:      Layers,
    photos:          Vec<Decoration>,
}

impl TreeScene {
    pub fn build<R: Rng>(config: SceneConfig, rng: &mut R) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let galaxy = graph.add(root, "galaxy");
        let dust   = graph.add(galaxy, "dust");
        let magic  = graph.add(root, "magic");
        let sparkle = graph.add(magic, "sparkle");

        let tree    = graph.add(root, "tree");
        let trunk   = graph.add(tree, "trunk");
        let leaves  = graph.add(tree, "leaves");
        let outline = graph.add(tree, "outline");
        let lights  = graph.add(tree, "lights");
        let star    = graph.add(tree, "star");
        graph.get_mut(tree).position.y = GROUP_LIFT;
        graph.get_mut(star).position.y = config.tree_height / 2.0 + 60.0;

        graph.get_mut(trunk).opacity   = TRUNK_OPACITY;
        graph.get_mut(leaves).opacity  = LEAF_OPACITY;
        graph.get_mut(outline).opacity = OUTLINE_OPACITY;
        graph.get_mut(dust).opacity    = 0.0;
        graph.get_mut(sparkle).opacity = 0.0;

        let decorations = graph.add(root, "decorations");
        graph.get_mut(decorations).position.y = GROUP_LIFT;

        let snow = graph.add(root, "snow");

        let photos = (0..config.photo_count)
            .map(|i| build_decoration(&mut graph, decorations, i, &config, rng))
            .collect();

        TreeScene {
            graph,
            config,
            tree,
            decorations,
            galaxy,
            magic,
            layers: Layers { trunk, leaves, outline, lights, star, dust, magic: sparkle, snow },
            photos,
        }
    }

    pub fn photos(&self) -> &[Decoration] {
        &self.photos
    }

    pub fn photo_nodes(&self) -> Vec<NodeId> {
        self.photos.iter().map(Decoration::node).collect()
    }

    /// The decoration whose group node is `node`.
    pub fn decoration(&self, node: NodeId) -> Option<&Decoration> {
        self.photos.iter().find(|d| d.node == node)
    }
}

fn build_decoration<R: Rng>(
    graph:     &mut SceneGraph,
    container: NodeId,
    index:     usize,
    config:    &SceneConfig,
    rng:       &mut R,
) -> Decoration {
    let node  = graph.add(container, &format!("photo_{}", index));
    let image = graph.add_quad(node, "image", PHOTO_SIZE, PHOTO_SIZE);
    let frame = graph.add_quad(node, "frame", FRAME_WIDTH, FRAME_HEIGHT);
    graph.get_mut(image).position = Vec3::new(0.0, 10.0, 1.0);

    let tree_pose     = tree_pose(config, rng);
    let universe_pose = universe_pose(rng);

    let n = graph.get_mut(node);
    n.position = tree_pose.position;
    n.rotation = tree_pose.rotation;

    Decoration { index, node, image, frame, home: container, tree_pose, universe_pose }
}

/// A spot just outside the cone, facing outward, slightly tilted.
fn tree_pose<R: Rng>(config: &SceneConfig, rng: &mut R) -> Pose {
    let h     = (rng.random::<f32>() - 0.5) * config.tree_height * 0.85;
    let r     = config.radius_at(h) + 80.0;
    let angle = rng.random::<f32>() * TAU;

    let rot_x = -0.2 + (rng.random::<f32>() - 0.5) * 0.4;
    let rot_y = -angle + PI / 2.0 + (rng.random::<f32>() - 0.5) * 0.6;
    let rot_z = (rng.random::<f32>() - 0.5) * 0.4;

    Pose {
        position: Vec3::new(angle.cos() * r, h, angle.sin() * r),
        rotation: Vec3::new(rot_x, rot_y, rot_z),
    }
}

fn universe_pose<R: Rng>(rng: &mut R) -> Pose {
    let position = Vec3::new(
        (rng.random::<f32>() - 0.5) * 3000.0,
        (rng.random::<f32>() - 0.5) * 1500.0,
        (rng.random::<f32>() - 0.5) * 1500.0,
    );
    let rotation = Vec3::new(
        rng.random::<f32>() * PI,
        rng.random::<f32>() * PI,
        rng.random::<f32>() * PI,
    );
    Pose { position, rotation }
}
