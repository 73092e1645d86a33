//! Software-rendered visualizer using `minifb`.
//!
//! Tree scene layout:
//!
//! ```text
//! ┌────────────────────────────────────────────────────┬──────────────┐
//! │ GESTURE NAME                                        │  hand inset  │
//! │ (tracking status)                                   │  (D toggles) │
//! │                  * particle tree / universe *       └──────────────┤
//! │                 [photo] [photo]    o cursor                        │
//! │                                                                    │
//! │                     MODE INSTRUCTION                               │
//! │ key legend                                                         │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The card scene draws the board, the pinch cursor and a status line in
//! the same frame.  Painting is split from the window: `paint_*` draw into a
//! [`Canvas`], [`Visualizer::present`] pushes it to the screen.

use std::sync::mpsc::Sender;
use std::time::Duration;

use glam::{Mat4, Vec2, Vec4, Vec4Swizzles};
use hand_gesture::{HandPose, LandmarkFrame, Viewport, HAND_CONNECTIONS};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tree_scene::{ndc_to_px, Cursor, SceneGraph, Shape};

use crate::app::{CardApp, GestureSession, TreeApp};
use crate::canvas::{Canvas, QuadFill};
use crate::config::WindowConfig;
use crate::error::AppError;
use crate::particles::Blend;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const TREE_BG:          u32 = 0x020208;
const CARD_BG:          u32 = 0x101018;
const FRAME_COLOR:      u32 = 0xeeeeee;
const STATUS_COLOR:     u32 = 0xffd700;
const ERROR_COLOR:      u32 = 0xff6666;
const TEXT_COLOR:       u32 = 0xeeeeee;
const LEGEND_COLOR:     u32 = 0x888888;
const CURSOR_IDLE:      u32 = 0xffffff;
const CURSOR_ACTIVE:    u32 = 0xffd700;
const INSET_W:          i32 = 200;
const INSET_H:          i32 = 150;
const INSET_MARGIN:     i32 = 12;
const SKELETON_COLOR:   u32 = 0x00ff88;
const JOINT_COLOR:      u32 = 0xff3366;
const CARD_BORDER:      u32 = 0x333344;
const GRAB_BORDER:      u32 = 0xffd700;
const CARD_COLORS: [u32; 6] = [0x2e4a7a, 0x7a2e4a, 0x2e7a5a, 0x7a6a2e, 0x5a2e7a, 0x2e6a7a];

const TREE_LEGEND: &str = "f=fist  o=open  p/click=point  h=hand  d=debug  q=quit";
const CARD_LEGEND: &str = "enter=start  space=pinch  mouse=move  h=hand  d=debug  q=quit";

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// What the window reported this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub quit:    bool,
    /// Enter pressed: start gesture mode.
    pub start:   bool,
    pub resized: Option<Viewport>,
}

pub struct Visualizer {
    window:       Window,
    canvas:       Canvas,
    sim_tx:       Sender<SimInput>,
    pose:         Option<HandPose>,
    pointer:      (f32, f32),
    hand_visible: bool,
    show_inset:   bool,
}

impl Visualizer {
    pub fn new(cfg: &WindowConfig, sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Leap Tree - gesture particle tree",
            cfg.width, cfg.height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas:       Canvas::new(cfg.width, cfg.height, TREE_BG),
            sim_tx,
            pose:         Some(HandPose::Relaxed),
            pointer:      (0.5, 0.5),
            hand_visible: true,
            show_inset:   true,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    pub fn show_inset(&self) -> bool { self.show_inset }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Poll keyboard and mouse, forward hand input to the simulator.
    pub fn poll_input(&mut self) -> FrameInput {
        let mut input = FrameInput::default();

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if !self.window.is_open() || one_shot(Key::Q) || one_shot(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::Quit);
            input.quit = true;
            return input;
        }
        if one_shot(Key::H) {
            self.hand_visible = !self.hand_visible;
        }
        if one_shot(Key::D) {
            self.show_inset = !self.show_inset;
        }
        input.start = one_shot(Key::Enter);

        let pose = if self.hand_visible { Some(self.held_pose()) } else { None };
        if pose != self.pose {
            self.pose = pose;
            let _ = self.sim_tx.send(SimInput::Pose(pose));
        }

        let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let pointer = (mx / w.max(1.0), my / h.max(1.0));
            if pointer != self.pointer {
                self.pointer = pointer;
                let _ = self.sim_tx.send(SimInput::Pointer { x: pointer.0, y: pointer.1 });
            }
        }

        let (ww, wh) = self.window.get_size();
        if ww > 0 && wh > 0 && (ww, wh) != (self.canvas.width(), self.canvas.height()) {
            self.canvas.resize(ww, wh);
            input.resized = Some(self.viewport());
        }
        input
    }

    fn held_pose(&self) -> HandPose {
        let down = |k: Key| self.window.is_key_down(k);
        if down(Key::F) {
            HandPose::Fist
        } else if down(Key::O) {
            HandPose::Open
        } else if down(Key::Space) {
            HandPose::Pinch
        } else if down(Key::P) || self.window.get_mouse_down(MouseButton::Left) {
            HandPose::Point
        } else {
            HandPose::Relaxed
        }
    }

    pub fn present(&mut self) -> Result<(), AppError> {
        self.window.update_with_buffer(self.canvas.pixels(), self.canvas.width(), self.canvas.height())?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tree scene
// ════════════════════════════════════════════════════════════════════════════

pub fn paint_tree(canvas: &mut Canvas, app: &TreeApp, show_inset: bool, now: Duration) {
    canvas.clear(TREE_BG);

    let ctl   = app.controller();
    let scene = ctl.scene();
    let cam   = ctl.camera();
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let vp    = cam.view_projection();

    // ── Particle layers ───────────────────────────────────────────────────
    let sparkle = ctl.sparkle_size(now);
    for (node, cloud) in app.clouds().layers(&scene.layers) {
        let opacity = scene.graph.world_opacity(node);
        if opacity < 0.01 {
            continue;
        }
        let size = if node == scene.layers.magic { sparkle } else { cloud.size };
        let m = vp * scene.graph.world_matrix(node);

        for (p, &color) in cloud.points.iter().zip(&cloud.colors) {
            let clip = m * p.extend(1.0);
            if clip.w <= cam.near {
                continue;
            }
            let ndc = clip.xy() / clip.w;
            if ndc.x.abs() > 1.05 || ndc.y.abs() > 1.05 {
                continue;
            }
            let px = ndc_to_px(ndc, w, h);
            // attenuated point size: diameter = size · (h/2) / depth
            let r = (size * h * 0.25 / clip.w).clamp(0.5, 16.0);
            canvas.fill_circle(px.x, px.y, r, color, opacity, cloud.blend);
        }
    }

    // ── Photos, far to near ───────────────────────────────────────────────
    let mut order: Vec<_> = scene
        .photos()
        .iter()
        .filter_map(|d| cam.project(scene.graph.world_position(d.node())).map(|p| (p.z, d)))
        .collect();
    order.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, d) in order {
        let alpha = scene.graph.world_opacity(d.node());
        if let Some(c) = quad_corners(&scene.graph, d.frame(), &vp, w, h, cam.near) {
            canvas.fill_quad(c, QuadFill::Solid(FRAME_COLOR), alpha);
        }
        if let (Some(c), Some(tex)) = (quad_corners(&scene.graph, d.image(), &vp, w, h, cam.near), app.photos().get(d.index())) {
            canvas.fill_quad(c, QuadFill::Texture(tex), alpha);
        }
    }

    paint_cursor(canvas, ctl.cursor());

    // ── Text ──────────────────────────────────────────────────────────────
    canvas.draw_text(ctl.status(), 16, 16, 3, STATUS_COLOR);
    if let GestureSession::Failed(_) = app.session() {
        if let Some(msg) = app.session().status() {
            canvas.draw_text(&msg, 16, 40, 2, ERROR_COLOR);
        }
    }
    canvas.draw_text_centered(ctl.mode().instruction(), (w / 2.0) as i32, h as i32 - 64, 3, TEXT_COLOR);
    canvas.draw_text(TREE_LEGEND, 16, h as i32 - 20, 2, LEGEND_COLOR);

    if show_inset {
        paint_inset(canvas, app.hand());
    }
}

/// Screen corners of a quad node (top-left, top-right, bottom-right,
/// bottom-left in its local frame).  `None` if any corner is behind the lens.
pub fn quad_corners(graph: &SceneGraph, node: tree_scene::NodeId, vp: &Mat4, w: f32, h: f32, near: f32) -> Option<[Vec2; 4]> {
    let Some(Shape::Quad { width, height }) = graph.get(node).shape else {
        return None;
    };
    let m = *vp * graph.world_matrix(node);
    let (hw, hh) = (width / 2.0, height / 2.0);
    let local = [(-hw, hh), (hw, hh), (hw, -hh), (-hw, -hh)];

    let mut out = [Vec2::ZERO; 4];
    for (o, (x, y)) in out.iter_mut().zip(local) {
        let clip = m * Vec4::new(x, y, 0.0, 1.0);
        if clip.w <= near {
            return None;
        }
        *o = ndc_to_px(clip.xy() / clip.w, w, h);
    }
    Some(out)
}

fn paint_cursor(canvas: &mut Canvas, cursor: &Cursor) {
    if !cursor.visible {
        return;
    }
    let (x, y) = (cursor.screen_px.x, cursor.screen_px.y);
    if cursor.active {
        canvas.fill_circle(x, y, 14.0, CURSOR_ACTIVE, 0.35, Blend::Normal);
        canvas.draw_ring(x, y, 14.0, 3.0, CURSOR_ACTIVE);
    } else {
        canvas.draw_ring(x, y, 10.0, 2.0, CURSOR_IDLE);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Debug inset — hand skeleton as the user sees it (mirrored)
// ════════════════════════════════════════════════════════════════════════════

fn paint_inset(canvas: &mut Canvas, hand: Option<&LandmarkFrame>) {
    let x0 = canvas.width() as i32 - INSET_W - INSET_MARGIN;
    let y0 = INSET_MARGIN;
    canvas.fill_rect_alpha(x0, y0, INSET_W, INSET_H, 0x000000, 0.7);
    canvas.draw_border(x0, y0, INSET_W, INSET_H, 1, LEGEND_COLOR);

    let Some(hand) = hand else {
        canvas.draw_text("no hand", x0 + 8, y0 + 8, 2, LEGEND_COLOR);
        return;
    };
    let to_px = |i: usize| {
        let p = hand.point(i);
        (
            x0 + ((1.0 - p.x) * INSET_W as f32) as i32,
            y0 + (p.y * INSET_H as f32) as i32,
        )
    };
    for (a, b) in HAND_CONNECTIONS {
        let ((ax, ay), (bx, by)) = (to_px(a), to_px(b));
        canvas.draw_line(ax, ay, bx, by, SKELETON_COLOR);
    }
    for i in 0..hand.points().len() {
        let (x, y) = to_px(i);
        canvas.fill_rect(x - 1, y - 1, 3, 3, JOINT_COLOR);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Card scene
// ════════════════════════════════════════════════════════════════════════════

pub fn paint_cards(canvas: &mut Canvas, app: &CardApp, show_inset: bool) {
    canvas.clear(CARD_BG);
    let board   = app.board();
    let grabbed = board.grabbed();

    // held card on top
    let order = board
        .cards()
        .iter()
        .filter(|c| Some(c.id) != grabbed)
        .chain(board.cards().iter().filter(|c| Some(c.id) == grabbed));

    for card in order {
        let r = card.rect;
        let (x, y, w, h) = (r.x as i32, r.y as i32, r.width as i32, r.height as i32);
        let held = Some(card.id) == grabbed;

        canvas.fill_rect(x, y, w, h, CARD_COLORS[card.id.0 % CARD_COLORS.len()]);
        if held {
            canvas.draw_border(x, y, w, h, 4, GRAB_BORDER);
        } else {
            canvas.draw_border(x, y, w, h, 2, CARD_BORDER);
        }
        let label = format!("card {}", card.id.0 + 1);
        canvas.draw_text_centered(&label, x + w / 2, y + h / 2 - 5, 2, TEXT_COLOR);
    }

    if let Some(c) = app.cursor() {
        if c.pinching {
            canvas.fill_circle(c.x, c.y, 10.0, CURSOR_ACTIVE, 0.8, Blend::Normal);
        }
        canvas.draw_ring(c.x, c.y, 14.0, 2.0, if c.pinching { CURSOR_ACTIVE } else { CURSOR_IDLE });
    }

    let status_color = match app.session() {
        GestureSession::Failed(_) => ERROR_COLOR,
        _                         => TEXT_COLOR,
    };
    canvas.draw_text(&app.status(), 16, 16, 2, status_color);
    canvas.draw_text(CARD_LEGEND, 16, canvas.height() as i32 - 20, 2, LEGEND_COLOR);

    if show_inset && app.session().is_ready() {
        paint_inset(canvas, app.hand());
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
