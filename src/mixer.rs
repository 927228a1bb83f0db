use clap::ValueEnum;

use crate::wave::{Wave, WavePresets, beat, superpose};

/// Selector pairs in the order they are tried when several keys are held.
/// With all three held the first pair wins.
const PAIR_PRECEDENCE: [(usize, usize); 3] = [(0, 1), (1, 2), (0, 2)];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MixPolicy {
    #[default]
    Beat,
    Superpose,
}

impl MixPolicy {
    pub fn combine(self, time: f32, first: Wave, second: Wave) -> Wave {
        match self {
            MixPolicy::Beat => beat(time, first, second),
            MixPolicy::Superpose => superpose(time, first, second),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MixPolicy::Beat => "BEAT",
            MixPolicy::Superpose => "SUPERPOSE",
        }
    }
}

pub struct Mixer {
    presets: WavePresets,
    policy: MixPolicy,
}

impl Mixer {
    pub fn new(presets: WavePresets, policy: MixPolicy) -> Self {
        Self { presets, policy }
    }

    pub fn policy(&self) -> MixPolicy {
        self.policy
    }

    /// Picks the wave to trace for the held selectors. Combined waves depend
    /// on `time`, so this runs every frame.
    pub fn select(&self, selectors: [bool; 3], time: f32) -> Wave {
        let held = selectors.iter().filter(|on| **on).count();
        match held {
            0 => self.presets.base,
            1 => selectors
                .iter()
                .position(|on| *on)
                .map(|index| self.presets.selectors[index])
                .unwrap_or(self.presets.base),
            _ => PAIR_PRECEDENCE
                .iter()
                .find(|(first, second)| selectors[*first] && selectors[*second])
                .map(|(first, second)| {
                    self.policy.combine(
                        time,
                        self.presets.selectors[*first],
                        self.presets.selectors[*second],
                    )
                })
                .unwrap_or(self.presets.base),
        }
    }
}
