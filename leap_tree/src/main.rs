//! leap_tree — interactive entry point.
//!
//! ```text
//! leap_tree [--cards] [--config <path>] [--quick]
//! ```

use std::io::{self, Write};

use anyhow::Context;
use leap_tree::{run, AppConfig, SceneKind};
use tracing_subscriber::EnvFilter;

struct Args {
    scene:  SceneKind,
    config: Option<String>,
    quick:  bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args { scene: SceneKind::Tree, config: None, quick: false };
    let mut it = std::env::args().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--cards"  => args.scene = SceneKind::Cards,
            "--quick"  => args.quick = true,
            "--config" => args.config = Some(it.next().context("--config needs a path")?),
            other      => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let cfg = match &args.config {
        Some(path) => AppConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None       => AppConfig::default(),
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Leap Tree — gesture-driven particle Christmas tree    ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard/mouse simulation  (use --features leap for hardware)");

    match args.scene {
        SceneKind::Tree => {
            println!("  Scene: tree  ({} photos from {})", cfg.scene.photo_count, cfg.photo_dir.display());
            println!("  Open hand = explode   Fist = return   Point = zoom a photo");
        }
        SceneKind::Cards => {
            println!("  Scene: cards  ({} cards)", cfg.cards.count);
            println!("  Enter = start gesture mode   Pinch = grab and drag");
        }
    }
    println!();

    if !args.quick {
        print!("  Press Enter to open the window… ");
        io::stdout().flush().ok();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
    }

    run(cfg, args.scene)?;
    Ok(())
}
