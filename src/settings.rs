use std::path::PathBuf;

use clap::Parser;
use macroquad::window::Conf;

use crate::{
    chassis::PanelLayout, controllers::KeyBindings, mixer::MixPolicy, scope::FinishPolicy,
    wave::WavePresets,
};

#[derive(Parser, Debug)]
#[command(about = "Oscilloscope toy that mixes waves in time with a soundtrack")]
pub struct Args {
    /// WAV file played while the scope is running
    #[arg(long, default_value = "assets/cosmos.wav")]
    pub audio: PathBuf,
    /// Playback gain between 0 and 1
    #[arg(long, default_value_t = 1.0)]
    pub volume: f32,
    /// How two held mix keys are combined
    #[arg(long, value_enum, default_value_t = MixPolicy::Beat)]
    pub mix: MixPolicy,
    /// What happens when the track ends while the scope is running
    #[arg(long, value_enum, default_value_t = FinishPolicy::Exit)]
    pub on_finish: FinishPolicy,
    #[arg(long, default_value_t = 1000)]
    pub width: u32,
    #[arg(long, default_value_t = 800)]
    pub height: u32,
}

/// Everything that shapes one run of the scope.
pub struct Settings {
    pub audio_path: PathBuf,
    pub volume: f32,
    pub mix: MixPolicy,
    pub on_finish: FinishPolicy,
    pub presets: WavePresets,
    pub layout: PanelLayout,
    pub bindings: KeyBindings,
    pub window_size: (u32, u32),
}

impl Settings {
    pub fn from_args(args: Args) -> Self {
        Self {
            audio_path: args.audio,
            volume: args.volume.clamp(0.0, 1.0),
            mix: args.mix,
            on_finish: args.on_finish,
            presets: WavePresets::default(),
            layout: PanelLayout::oscilloscope(),
            bindings: KeyBindings::default(),
            window_size: (args.width.max(1), args.height.max(1)),
        }
    }

    pub fn window_conf(&self) -> Conf {
        Conf {
            window_title: "Sonoscope".into(),
            fullscreen: false,
            sample_count: 4,
            window_width: self.window_size.0 as i32,
            window_height: self.window_size.1 as i32,
            high_dpi: false,
            ..Default::default()
        }
    }
}
