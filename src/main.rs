mod canvas;
mod chassis;
mod controllers;
mod cues;
mod mixer;
mod output;
mod scope;
mod settings;
mod trace;
mod wave;

use canvas::{MeshCanvas, Viewport};
use clap::Parser;
use controllers::InputController;
use cues::CueTrack;
use macroquad::prelude::*;
use mixer::{MixPolicy, Mixer};
use output::{AudioDeck, AudioEngine, TrackLoader};
use scope::{FrameOutcome, Scope, ScopeMode};
use settings::{Args, Settings};
use tokio::runtime::Runtime;

const HUD_FONT_SIZE: f32 = 18.0;
const HUD_COLOR: Color = Color {
    r: 0.95,
    g: 0.95,
    b: 0.65,
    a: 0.8,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = Settings::from_args(Args::parse());
    let runtime = Runtime::new()?;
    let mut engine = AudioEngine::start()?;
    engine.set_volume(settings.volume);
    let loader = TrackLoader::spawn(&runtime, settings.audio_path.clone());

    macroquad::Window::from_config(settings.window_conf(), run(settings, engine, loader));
    Ok(())
}

async fn run(settings: Settings, mut engine: AudioEngine, mut loader: TrackLoader) {
    let mut input = InputController::new(settings.bindings);
    let mut scope = Scope::new(
        settings.layout,
        Mixer::new(settings.presets, settings.mix),
        CueTrack::standard(),
        settings.on_finish,
    );
    let mut canvas = MeshCanvas::new(viewport());
    let mut audio_status = AudioStatus::Loading;
    let origin = get_time();

    loop {
        poll_track(&mut loader, &mut engine, &mut audio_status);
        let snapshot = input.poll();
        if snapshot.exit {
            log::info!("exit requested");
            break;
        }
        let time = (get_time() - origin) as f32;

        clear_background(scope.layout().background);
        canvas.begin_frame(viewport());
        if scope.step(&snapshot, time, &mut engine, &mut canvas) == FrameOutcome::Finished {
            break;
        }
        draw_mesh(canvas.mesh());
        draw_hud(&scope, audio_status);

        next_frame().await;
    }
}

fn viewport() -> Viewport {
    Viewport::new(screen_width(), screen_height())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AudioStatus {
    Loading,
    Ready,
    Silent,
}

impl AudioStatus {
    fn label(&self) -> &'static str {
        match self {
            AudioStatus::Loading => "LOADING",
            AudioStatus::Ready => "READY",
            AudioStatus::Silent => "NO AUDIO",
        }
    }
}

fn poll_track(loader: &mut TrackLoader, engine: &mut AudioEngine, status: &mut AudioStatus) {
    if !loader.is_pending() {
        return;
    }
    match loader.poll() {
        Some(Ok(track)) => {
            engine.install(track);
            *status = AudioStatus::Ready;
        }
        Some(Err(err)) => {
            log::warn!(
                "continuing without audio, {} could not be loaded: {err:#}",
                loader.path().display()
            );
            *status = AudioStatus::Silent;
        }
        None => {}
    }
}

fn draw_hud(scope: &Scope, audio: AudioStatus) {
    let text = hud_line(scope.mode(), scope.mixer().policy(), audio);
    draw_text(&text, 12.0, screen_height() - 12.0, HUD_FONT_SIZE, HUD_COLOR);
}

fn hud_line(mode: ScopeMode, policy: MixPolicy, audio: AudioStatus) -> String {
    let mode = match mode {
        ScopeMode::Idle => "IDLE",
        ScopeMode::Active => "RUN",
    };
    format!(
        "Z X C MIX  LMB RUN  RMB STOP  ESC QUIT    {mode}  {}  AUDIO {}",
        policy.label(),
        audio.label()
    )
}
