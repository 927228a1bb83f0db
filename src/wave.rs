#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl Wave {
    pub const fn new(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase: 0.0,
        }
    }
}

/// Amplitude difference of two waves. The first operand keeps its frequency,
/// so `superpose(t, a, b)` and `superpose(t, b, a)` generally differ.
pub fn superpose(_time: f32, a: Wave, b: Wave) -> Wave {
    Wave {
        amplitude: (a.amplitude - b.amplitude).abs(),
        frequency: a.frequency,
        phase: a.phase - b.phase,
    }
}

/// Beat snapshot of two waves at `time`. Both amplitude and frequency swing
/// with `cos(time)`, so the result is only meaningful for this instant.
pub fn beat(time: f32, a: Wave, b: Wave) -> Wave {
    let omega = a.frequency + b.frequency;
    let swing = time.cos();
    Wave {
        amplitude: (a.amplitude + b.amplitude) / 2.0 * swing,
        frequency: omega * swing * 10.0,
        phase: a.phase - b.phase,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavePresets {
    pub base: Wave,
    pub selectors: [Wave; 3],
}

impl Default for WavePresets {
    fn default() -> Self {
        Self {
            base: Wave::new(0.03, 100.0),
            selectors: [
                Wave::new(0.05, 21.0),
                Wave::new(0.25, 42.0),
                Wave::new(0.45, 63.0),
            ],
        }
    }
}
