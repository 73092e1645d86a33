//! gesture_replay — run a recorded landmark session through the classifier
//! and the hold debouncer, logging every gesture change and trigger.
//!
//! ```text
//! gesture_replay session.json [--hold-ms 400] [--width 1280 --height 720]
//! ```

use std::time::Duration;

use anyhow::{bail, Context, Result};
use hand_gesture::{
    classify_pinch, classify_pose, Gesture, GestureConfig, HoldDebouncer, Recording, Viewport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Args {
    path:     String,
    hold_ms:  u64,
    viewport: Viewport,
}

fn parse_args() -> Result<Args> {
    let defaults = GestureConfig::default();
    let mut path     = None;
    let mut hold_ms  = defaults.trigger_hold_ms;
    let mut viewport = Viewport::new(1280.0, 720.0);

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |name: &str| it.next().with_context(|| format!("{} needs a value", name));
        match arg.as_str() {
            "--hold-ms" => hold_ms         = value("--hold-ms")?.parse()?,
            "--width"   => viewport.width  = value("--width")?.parse()?,
            "--height"  => viewport.height = value("--height")?.parse()?,
            other if other.starts_with("--") => bail!("unknown flag {}", other),
            other => path = Some(other.to_string()),
        }
    }

    let Some(path) = path else {
        bail!("usage: gesture_replay <recording.json> [--hold-ms N] [--width W --height H]");
    };
    Ok(Args { path, hold_ms, viewport })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let pinch_px = GestureConfig::default().pinch_threshold_px;
    let rec = Recording::load(&args.path)
        .with_context(|| format!("loading {}", args.path))?;

    info!(samples = rec.samples.len(), duration_ms = rec.duration().as_millis() as u64, "replaying");

    let mut hold     = HoldDebouncer::new(Duration::from_millis(args.hold_ms));
    let mut last     = Gesture::None;
    let mut triggers = 0usize;

    for sample in &rec.samples {
        let frame   = sample.results.first_hand();
        let gesture = classify_pose(frame.as_ref());
        let pinch   = classify_pinch(frame.as_ref(), args.viewport, pinch_px);

        if gesture != last {
            info!(t_ms = sample.t_ms, gesture = %gesture, pinch = %pinch, "gesture");
            last = gesture;
        }
        if let Some(trigger) = hold.update(gesture, sample.at()) {
            triggers += 1;
            info!(t_ms = sample.t_ms, ?trigger, "trigger");
        }
    }

    println!("  {} samples, {} triggers", rec.samples.len(), triggers);
    Ok(())
}
