mod audio;
mod cli;
mod render;
mod ui;
mod utils;

use anyhow::{Context, Result};
use audio::Playback;
use bloom_viz_core::{AnalysisConfig, DetectionConfig, Viewport, Visualizer};
use clap::Parser;
use cli::Cli;
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use render::NannouSurface;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use ui::bindings::{parse_key, Action};
use ui::help_overlay::HelpOverlay;
use ui::stats_overlay::{StatsOverlay, StatsSnapshot};
use utils::Config;

/// nannou's model constructor is a plain fn, so arguments are parsed up front
static CLI: OnceLock<Cli> = OnceLock::new();

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if let Some(track) = &cli.track {
        anyhow::ensure!(track.is_file(), "Track not found: {}", track.display());
    }
    CLI.set(cli)
        .map_err(|_| anyhow::anyhow!("command line already parsed"))?;

    nannou::app(model).run();
    Ok(())
}

struct Model {
    config: Config,
    detection: DetectionConfig,
    analysis: AnalysisConfig,
    seed: Option<u64>,
    play_audio: bool,
    /// Advanced from `view`, which only gets `&Model`
    visualizer: RefCell<Visualizer>,
    track_name: Option<String>,
    playback: Option<Playback>,
    help_overlay: HelpOverlay,
    stats_overlay: RefCell<StatsOverlay>,
}

fn model(app: &App) -> Model {
    let cli = CLI.get().cloned().unwrap_or_default();
    let config = Config::load();

    let (config_width, config_height) = config.window_dimensions();
    let width = cli.width.unwrap_or(config_width);
    let height = cli.height.unwrap_or(config_height);
    let fullscreen = cli.fullscreen(config.fullscreen());
    app.set_exit_on_escape(false);

    let mut win = app
        .new_window()
        .title("bloom-viz")
        .view(view)
        .key_pressed(key_pressed)
        .dropped_file(dropped_file)
        .resized(resized)
        .size(width, height)
        .min_size(320, 240);

    if fullscreen {
        win = win.fullscreen();
    }

    let window_id = match win.build() {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to create window: {}", e);
            std::process::exit(1);
        }
    };

    let bounds = match app.window(window_id) {
        Some(window) => {
            if fullscreen {
                window.set_cursor_visible(false);
            }
            window.rect()
        }
        None => Rect::from_w_h(width as f32, height as f32),
    };
    log::info!(
        "Window size: {}x{} (requested: {}x{})",
        bounds.w(),
        bounds.h(),
        width,
        height
    );

    let detection = config.detection();
    let analysis = config.analysis();
    let visualizer = new_visualizer(None, bounds, &detection, &analysis, cli.seed);

    let mut model = Model {
        play_audio: config.play_audio() && !cli.mute,
        detection,
        analysis,
        seed: cli.seed,
        visualizer: RefCell::new(visualizer),
        track_name: None,
        playback: None,
        help_overlay: HelpOverlay::new(),
        stats_overlay: RefCell::new(StatsOverlay::new(cli.stats)),
        config,
    };

    let initial = cli.track.clone().or_else(|| {
        model
            .config
            .last_track
            .clone()
            .filter(|path| path.is_file())
    });
    if let Some(path) = initial {
        if let Err(e) = load_track(&mut model, &path, bounds) {
            log::error!("{:#}", e);
        }
    }

    model
}

fn new_visualizer(
    track: Option<Arc<bloom_viz_core::AudioBuffer>>,
    bounds: Rect,
    detection: &DetectionConfig,
    analysis: &AnalysisConfig,
    seed: Option<u64>,
) -> Visualizer {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Visualizer::new(
        track,
        Viewport::new(bounds.w(), bounds.h()),
        detection,
        analysis,
        rng,
    )
}

/// Decode `path` and swap in a fresh visualizer and playback stream. On
/// failure the current track keeps running.
fn load_track(model: &mut Model, path: &Path, bounds: Rect) -> Result<()> {
    let track = audio::decode_file(path)
        .with_context(|| format!("Could not load {}", path.display()))?;
    let track = Arc::new(track);

    // Release the old stream before opening the device again
    model.playback = None;
    if model.play_audio {
        match Playback::start(Arc::clone(&track)) {
            Ok(playback) => model.playback = Some(playback),
            Err(e) => log::warn!("Playing without sound: {:#}", e),
        }
    }

    *model.visualizer.get_mut() = new_visualizer(
        Some(track),
        bounds,
        &model.detection,
        &model.analysis,
        model.seed,
    );
    model.track_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    model.config.set_last_track(path);

    log::info!("Now playing {}", path.display());
    Ok(())
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);
    let bounds = app.window_rect();

    let mut visualizer = model.visualizer.borrow_mut();
    let events = {
        let mut surface = NannouSurface::new(&draw, bounds);
        visualizer.advance_and_render(&mut surface)
    };

    if !visualizer.has_track() {
        ui::drop_prompt::draw(&draw, bounds, app.time);
    }

    let mut stats_overlay = model.stats_overlay.borrow_mut();
    stats_overlay.tick();
    stats_overlay.draw(
        &draw,
        bounds,
        &StatsSnapshot {
            events,
            particles: visualizer.particle_count(),
            shockwaves: visualizer.shockwave_count(),
            triggers: visualizer.triggers(),
            elapsed: visualizer.elapsed(),
        },
    );
    model.help_overlay.draw(&draw, model.track_name.as_deref());

    if let Err(e) = draw.to_frame(app, &frame) {
        log::error!("Failed to render frame: {:?}", e);
    }
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    log::info!("Window resized to {}x{}", size.x, size.y);
    model.visualizer.get_mut().resize(size.x, size.y);
}

fn dropped_file(app: &App, model: &mut Model, path: PathBuf) {
    log::info!("Dropped file: {}", path.display());
    if let Err(e) = load_track(model, &path, app.window_rect()) {
        log::error!("{:#}", e);
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let window = app.main_window();
    let fullscreen = window.is_fullscreen();

    match parse_key(key, model.help_overlay.visible, fullscreen) {
        Some(Action::Quit) => app.quit(),
        Some(Action::ToggleHelp) => model.help_overlay.toggle(),
        Some(Action::CloseHelp) => model.help_overlay.hide(),
        Some(Action::ToggleStats) => model.stats_overlay.get_mut().toggle(),
        Some(Action::ToggleFullscreen) => set_fullscreen(&window, !fullscreen),
        Some(Action::ExitFullscreen) => set_fullscreen(&window, false),
        None => {} // Unhandled key
    }
}

fn set_fullscreen(window: &Window, on: bool) {
    window.set_fullscreen(on);
    window.set_cursor_visible(!on);
}
