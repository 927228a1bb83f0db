use macroquad::prelude::{Vec2, vec2};

use crate::wave::Wave;

pub const TRACE_POINTS: usize = 50;
pub const TRACE_START_X: f32 = -0.8;
pub const TRACE_SPAN_X: f32 = 0.85;
const TRACE_OFFSET_Y: f32 = 0.12;

/// Samples the displayed oscilloscope curve for one frame.
///
/// The carrier `cos(2fx + ft)` is shaped by a squared cosine envelope that
/// drifts with time and sits on a fixed vertical bias, so even the base wave
/// never reads as a plain sine.
pub fn sample_trace(wave: Wave, time: f32) -> impl ExactSizeIterator<Item = Vec2> {
    (0..TRACE_POINTS).map(move |index| {
        let x = TRACE_START_X + TRACE_SPAN_X * index as f32 / (TRACE_POINTS - 1) as f32;
        vec2(x, trace_height(wave, x, time))
    })
}

fn trace_height(wave: Wave, x: f32, time: f32) -> f32 {
    let envelope = (x * 7.0 + time * 2.0).cos().powi(2);
    let carrier = (2.0 * wave.frequency * x + wave.frequency * time).cos();
    envelope * wave.amplitude * carrier + TRACE_OFFSET_Y
}
