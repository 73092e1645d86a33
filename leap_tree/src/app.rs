//! Top-level application: the two scenes and the frame loop.
//!
//! A landmark source runs on its own thread and overwrites a
//! [`LatestFrame`] slot.  Once per frame the loop polls the window, feeds a
//! *fresh* detector result (if any) to the active scene, advances animation
//! and repaints.  [`TreeApp`] and [`CardApp`] hold all scene state and know
//! nothing about the window, so they can be driven from tests.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use card_repel::{grid_layout, CardBoard, Layout, PinchCursor, Rect};
use hand_gesture::{LandmarkFrame, LatestFrame, Snapshot, Viewport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use tree_scene::TreeController;

use crate::assets::{load_photos, PhotoTexture};
use crate::config::{AppConfig, CardsConfig};
use crate::error::AppError;
use crate::particles::ParticleClouds;
use crate::source::{spawn_landmark_source, SimInput, SourceError};
#[cfg(not(feature = "leap"))]
use crate::source::SimLandmarkSource;
use crate::visualizer::{paint_cards, paint_tree, Visualizer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneKind {
    #[default]
    Tree,
    Cards,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSession — hand-tracking lifecycle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GestureSession {
    #[default]
    Idle,
    Starting,
    Ready,
    Failed(String),
}

impl GestureSession {
    /// Starting or ready: a second start request is ignored.
    pub fn is_active(&self) -> bool {
        matches!(self, GestureSession::Starting | GestureSession::Ready)
    }

    pub fn is_ready(&self) -> bool {
        *self == GestureSession::Ready
    }

    /// Apply the source's start-up report.  Only meaningful while starting.
    pub fn resolve(&mut self, result: Result<(), SourceError>) {
        if *self != GestureSession::Starting {
            return;
        }
        *self = match result {
            Ok(()) => {
                info!("hand tracking ready");
                GestureSession::Ready
            }
            Err(e) => {
                warn!(error = %e, "hand tracking failed");
                GestureSession::Failed(e.to_string())
            }
        };
    }

    /// One-line status for the window, if there is anything to say.
    pub fn status(&self) -> Option<String> {
        match self {
            GestureSession::Idle        => None,
            GestureSession::Starting    => Some("starting hand tracking...".into()),
            GestureSession::Ready       => Some("ready - raise a hand and pinch to grab a card".into()),
            GestureSession::Failed(msg) => Some(format!("hand tracking failed: {msg}")),
        }
    }
}

/// Pull the source's start-up report, if it has arrived.
fn poll_ready(session: &mut GestureSession, ready: &Receiver<Result<(), SourceError>>) {
    if *session != GestureSession::Starting {
        return;
    }
    match ready.try_recv() {
        Ok(result) => session.resolve(result),
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => session.resolve(Err(SourceError::Stopped)),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TreeApp
// ════════════════════════════════════════════════════════════════════════════

pub struct TreeApp {
    controller: TreeController,
    clouds:     ParticleClouds,
    photos:     Vec<PhotoTexture>,
    session:    GestureSession,
    last_seq:   u64,
    hand:       Option<LandmarkFrame>,
}

impl TreeApp {
    pub fn new(cfg: &AppConfig, viewport: Viewport) -> Self {
        let photos = load_photos(&cfg.photo_dir, cfg.scene.photo_count);
        Self::with_photos(cfg, viewport, photos)
    }

    pub fn with_photos(cfg: &AppConfig, viewport: Viewport, photos: Vec<PhotoTexture>) -> Self {
        let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(1));
        let clouds = ParticleClouds::build(&cfg.particles, &cfg.scene, &mut rng);
        info!(points = cfg.particles.total(), photos = photos.len(), "tree scene built");

        TreeApp {
            controller: TreeController::new(cfg.scene, cfg.gestures.clone(), viewport, cfg.seed),
            clouds,
            photos,
            session:    GestureSession::Starting,
            last_seq:   0,
            hand:       None,
        }
    }

    /// Feed the slot's content.  Only a result newer than the last one seen
    /// reaches the controller.
    pub fn on_snapshot(&mut self, snap: Snapshot, now: Duration) {
        if snap.seq == self.last_seq {
            return;
        }
        self.last_seq = snap.seq;
        self.hand     = snap.frame;
        self.controller.on_hand(snap.frame.as_ref(), now);
    }

    /// One animation frame.
    pub fn tick(&mut self, now: Duration) {
        self.controller.tick(now);
        self.clouds.snow.step();
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.controller.resize(viewport);
    }

    pub fn controller(&self) -> &TreeController {
        &self.controller
    }

    pub fn clouds(&self) -> &ParticleClouds {
        &self.clouds
    }

    pub fn photos(&self) -> &[PhotoTexture] {
        &self.photos
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GestureSession {
        &mut self.session
    }

    /// Last landmark frame received, for the debug inset.
    pub fn hand(&self) -> Option<&LandmarkFrame> {
        self.hand.as_ref()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CardApp
// ════════════════════════════════════════════════════════════════════════════

pub struct CardApp {
    board:    CardBoard,
    cards:    CardsConfig,
    viewport: Viewport,
    session:  GestureSession,
    cursor:   Option<PinchCursor>,
    last_seq: u64,
    hand:     Option<LandmarkFrame>,
}

/// Grid rectangles centred in the viewport.
pub fn centered_grid(cards: &CardsConfig, viewport: Viewport) -> Vec<Rect> {
    let columns = cards.columns.max(1).min(cards.count.max(1));
    let rows    = cards.count.div_ceil(columns);
    let total_w = columns as f32 * cards.width + (columns as f32 - 1.0) * cards.gap;
    let total_h = rows as f32 * cards.height + (rows as f32 - 1.0).max(0.0) * cards.gap;
    let origin  = ((viewport.width - total_w) / 2.0, (viewport.height - total_h) / 2.0);
    grid_layout(cards.count, columns, (cards.width, cards.height), cards.gap, origin)
}

impl CardApp {
    pub fn new(cfg: &AppConfig, viewport: Viewport) -> Self {
        CardApp {
            board:    CardBoard::new(centered_grid(&cfg.cards, viewport), cfg.repel_config()),
            cards:    cfg.cards,
            viewport,
            session:  GestureSession::Idle,
            cursor:   None,
            last_seq: 0,
            hand:     None,
        }
    }

    /// Switch to gesture mode: free the layout and wait for the source.
    /// Returns `false` when gesture mode is already on.
    pub fn start_gestures(&mut self) -> bool {
        if self.session.is_active() {
            return false;
        }
        self.session = GestureSession::Starting;
        if let Err(e) = self.board.enter_free_layout() {
            debug!(error = %e, "gesture mode restarted");
        }
        true
    }

    pub fn on_ready(&mut self, result: Result<(), SourceError>) {
        self.session.resolve(result);
    }

    /// Feed the slot's content.  Ignored unless tracking is ready and the
    /// result is new.
    pub fn on_snapshot(&mut self, snap: Snapshot) {
        if !self.session.is_ready() || snap.seq == self.last_seq {
            return;
        }
        self.last_seq = snap.seq;
        self.hand     = snap.frame;
        self.cursor   = self.board.on_hand(snap.frame.as_ref(), self.viewport);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.board.layout() == Layout::Grid {
            let grid = centered_grid(&self.cards, viewport);
            if let Err(e) = self.board.reflow(&grid) {
                debug!(error = %e, "reflow skipped");
            }
        }
    }

    pub fn board(&self) -> &CardBoard {
        &self.board
    }

    pub fn cursor(&self) -> Option<PinchCursor> {
        self.cursor
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GestureSession {
        &mut self.session
    }

    pub fn hand(&self) -> Option<&LandmarkFrame> {
        self.hand.as_ref()
    }

    pub fn status(&self) -> String {
        self.session
            .status()
            .unwrap_or_else(|| "press enter to start gesture mode".into())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — window + frame loop
// ════════════════════════════════════════════════════════════════════════════

/// Start the landmark source for this build: LeapMotion with the `leap`
/// feature, the keyboard/mouse simulator otherwise.  The simulator owns the
/// window's input channel, so it is only ever started once; a second start
/// reports [`SourceError::Unavailable`].
#[allow(unused_variables)]
fn start_source(slot: &LatestFrame, sim_rx: &mut Option<Receiver<SimInput>>) -> Receiver<Result<(), SourceError>> {
    #[cfg(feature = "leap")]
    {
        spawn_landmark_source(crate::source::LeapLandmarkSource, slot.clone())
    }
    #[cfg(not(feature = "leap"))]
    {
        match sim_rx.take() {
            Some(rx) => spawn_landmark_source(SimLandmarkSource::new(rx), slot.clone()),
            None => {
                let (tx, rx) = mpsc::channel();
                let _ = tx.send(Err(SourceError::Unavailable("hand simulator already claimed".into())));
                rx
            }
        }
    }
}

/// Open the window and run `scene` until the window closes or `Q`/`Esc`.
pub fn run(cfg: AppConfig, scene: SceneKind) -> Result<(), AppError> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let mut sim_rx = Some(sim_rx);
    let mut vis = Visualizer::new(&cfg.window, sim_tx)?;
    let slot = LatestFrame::new();
    let epoch = Instant::now();

    match scene {
        SceneKind::Tree => {
            let mut app = TreeApp::new(&cfg, vis.viewport());
            let ready = start_source(&slot, &mut sim_rx);

            while vis.is_open() {
                let input = vis.poll_input();
                if input.quit {
                    break;
                }
                if let Some(vp) = input.resized {
                    app.resize(vp);
                }
                poll_ready(app.session_mut(), &ready);

                let now = epoch.elapsed();
                app.on_snapshot(slot.latest(), now);
                app.tick(now);

                let show_inset = vis.show_inset();
                paint_tree(vis.canvas_mut(), &app, show_inset, now);
                vis.present()?;
            }
        }
        SceneKind::Cards => {
            let mut app = CardApp::new(&cfg, vis.viewport());
            let mut ready: Option<Receiver<Result<(), SourceError>>> = None;

            while vis.is_open() {
                let input = vis.poll_input();
                if input.quit {
                    break;
                }
                if let Some(vp) = input.resized {
                    app.resize(vp);
                }
                if input.start && app.start_gestures() {
                    ready = Some(start_source(&slot, &mut sim_rx));
                }
                if let Some(rx) = &ready {
                    poll_ready(app.session_mut(), rx);
                }

                app.on_snapshot(slot.latest());

                let show_inset = vis.show_inset();
                paint_cards(vis.canvas_mut(), &app, show_inset);
                vis.present()?;
            }
        }
    }

    info!("window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
