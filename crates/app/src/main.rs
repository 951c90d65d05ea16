//! Entry point for Kiln.
//! Loads a scene manifest, runs the loop until every scene reports loaded.

mod manifest;

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Result, bail};
use asset::{FileSource, Loader};
use scene::Game;

use crate::manifest::Manifest;

fn parse_path_arg(prefix: &str) -> Option<PathBuf> {
    std::env::args().find_map(|arg| arg.strip_prefix(prefix).map(PathBuf::from))
}

fn parse_u64_arg(prefix: &str, default: u64) -> u64 {
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix(prefix) {
            match val.parse::<u64>() {
                Ok(v) => return v,
                Err(_) => {
                    log::warn!("Invalid value '{}' for {}, using {}", val, prefix, default);
                }
            }
        }
    }
    default
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // --assets=DIR --manifest=FILE --max-frames=N --frame-ms=N
    let assets_dir = parse_path_arg("--assets=").unwrap_or_else(|| PathBuf::from("assets"));
    let manifest_path =
        parse_path_arg("--manifest=").unwrap_or_else(|| assets_dir.join("scene.ron"));
    let max_frames = parse_u64_arg("--max-frames=", 600).max(1);
    let frame_ms = parse_u64_arg("--frame-ms=", 16);
    log::info!(
        "Starting Kiln. assets={}, manifest={}, max_frames={}, frame_ms={}",
        assets_dir.display(),
        manifest_path.display(),
        max_frames,
        frame_ms
    );

    let manifest = Manifest::from_path(&manifest_path)?;
    let mut game = Game::new(Loader::with_source(FileSource::new(&assets_dir)));
    manifest.register(game.loader());
    let scenes = manifest.build(&mut game)?;

    let started = Instant::now();
    let _subscriptions: Vec<_> = scenes
        .iter()
        .map(|scene| {
            scene.set_active(true);
            scene.on_loaded(move |scene| {
                log::info!(
                    "Scene '{}' loaded {} assets after {:?}",
                    scene.name().unwrap_or_default(),
                    scene.asset_count(),
                    started.elapsed()
                );
            })
        })
        .collect();

    game.start();
    let dt = Duration::from_millis(frame_ms);
    let mut frame = 0;
    while frame < max_frames && !scenes.iter().all(|scene| scene.loaded()) {
        game.update(dt.as_secs_f32());
        frame += 1;
        if !dt.is_zero() {
            thread::sleep(dt);
        }
    }

    let pending: Vec<String> = scenes
        .iter()
        .filter(|scene| !scene.loaded())
        .map(|scene| {
            format!(
                "'{}' ({}/{})",
                scene.name().unwrap_or_default(),
                scene.assets_loaded(),
                scene.asset_count()
            )
        })
        .collect();
    game.destroy();

    if !pending.is_empty() {
        bail!(
            "Scenes still loading after {} frames: {}",
            frame,
            pending.join(", ")
        );
    }
    log::info!("All scenes loaded in {} frames. Bye!", frame);
    Ok(())
}
