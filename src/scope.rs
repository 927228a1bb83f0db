use clap::ValueEnum;
use macroquad::prelude::Vec2;

use crate::{
    canvas::Canvas,
    chassis::PanelLayout,
    controllers::InputSnapshot,
    cues::CueTrack,
    mixer::Mixer,
    output::{AudioDeck, PlaybackState},
    trace::{TRACE_POINTS, sample_trace},
};

/// What to do when the track runs out while the scope is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FinishPolicy {
    #[default]
    Exit,
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeMode {
    Idle,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Finished,
}

pub struct Scope {
    layout: PanelLayout,
    mixer: Mixer,
    cues: CueTrack,
    finish: FinishPolicy,
    mode: ScopeMode,
    trace: Vec<Vec2>,
}

impl Scope {
    pub fn new(layout: PanelLayout, mixer: Mixer, cues: CueTrack, finish: FinishPolicy) -> Self {
        Self {
            layout,
            mixer,
            cues,
            finish,
            mode: ScopeMode::Idle,
            trace: Vec::with_capacity(TRACE_POINTS),
        }
    }

    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Runs one frame: syncs playback with the run latch, then draws the
    /// chassis, the screen contents and any due cue prompts.
    pub fn step(
        &mut self,
        input: &InputSnapshot,
        time: f32,
        deck: &mut impl AudioDeck,
        canvas: &mut impl Canvas,
    ) -> FrameOutcome {
        self.layout.draw_chassis(canvas);
        if self.sync_playback(input.run, time, deck) == FrameOutcome::Finished {
            return FrameOutcome::Finished;
        }

        match self.mode {
            ScopeMode::Idle => self.layout.draw_blank_screen(canvas),
            ScopeMode::Active => {
                let wave = self.mixer.select(input.selectors, time);
                self.trace.clear();
                self.trace.extend(sample_trace(wave, time));
                canvas.polyline(&self.trace, self.layout.trace_width, self.layout.trace_color);
            }
        }

        for key in self.cues.active_keys(time) {
            self.layout.highlight_key(canvas, key);
        }
        FrameOutcome::Continue
    }

    fn sync_playback(&mut self, run: bool, time: f32, deck: &mut impl AudioDeck) -> FrameOutcome {
        let state = deck.state();
        if !run {
            if state == PlaybackState::Playing {
                deck.stop();
            }
            if self.mode == ScopeMode::Active {
                log::info!("scope idle");
                self.mode = ScopeMode::Idle;
                self.cues.reset();
            }
            return FrameOutcome::Continue;
        }

        if state == PlaybackState::Finished && self.mode == ScopeMode::Active {
            match self.finish {
                FinishPolicy::Exit => {
                    log::info!("playback finished");
                    return FrameOutcome::Finished;
                }
                FinishPolicy::Restart => log::info!("playback finished, replaying"),
            }
        }
        if state != PlaybackState::Playing {
            deck.play();
        }
        if self.mode == ScopeMode::Idle {
            log::info!("scope active, mixing with {}", self.mixer.policy().label());
            self.mode = ScopeMode::Active;
            self.cues.start(time);
        }
        FrameOutcome::Continue
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use macroquad::prelude::Color;

    use super::*;
    use crate::{
        chassis::{Primitive, Shape},
        mixer::MixPolicy,
        wave::{WavePresets, beat},
    };

    struct FakeDeck {
        state: PlaybackState,
        queries: Cell<usize>,
        plays: usize,
        stops: usize,
    }

    impl FakeDeck {
        fn new(state: PlaybackState) -> Self {
            Self {
                state,
                queries: Cell::new(0),
                plays: 0,
                stops: 0,
            }
        }
    }

    impl AudioDeck for FakeDeck {
        fn state(&self) -> PlaybackState {
            self.queries.set(self.queries.get() + 1);
            self.state
        }

        fn play(&mut self) {
            self.plays += 1;
            self.state = PlaybackState::Playing;
        }

        fn stop(&mut self) {
            self.stops += 1;
            self.state = PlaybackState::Stopped;
        }

        fn set_volume(&mut self, _gain: f32) {}
    }

    #[derive(Debug, PartialEq)]
    enum Command {
        Rect(Vec2, Vec2, Color),
        Circle(Vec2, f32, Color),
        Polyline(Vec<Vec2>, f32, Color),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        commands: Vec<Command>,
    }

    impl RecordingCanvas {
        fn polylines(&self) -> Vec<&Vec<Vec2>> {
            self.commands
                .iter()
                .filter_map(|command| match command {
                    Command::Polyline(points, _, _) => Some(points),
                    _ => None,
                })
                .collect()
        }

        fn contains_primitive(&self, primitive: &Primitive) -> bool {
            matches!(primitive.shape, Shape::Rect { .. })
                && self.commands.contains(&Command::from(primitive))
        }

        fn cue_rects(&self, layout: &PanelLayout) -> usize {
            self.commands
                .iter()
                .filter(|command| {
                    matches!(command, Command::Rect(_, _, color) if *color == layout.cue_color)
                })
                .count()
        }
    }

    impl From<&Primitive> for Command {
        fn from(primitive: &Primitive) -> Self {
            match primitive.shape {
                Shape::Rect { min, max } => Command::Rect(min, max, primitive.color),
                Shape::Circle { center, radius } => {
                    Command::Circle(center, radius, primitive.color)
                }
            }
        }
    }

    impl Canvas for RecordingCanvas {
        fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Color) {
            self.commands.push(Command::Rect(min, max, color));
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.commands.push(Command::Circle(center, radius, color));
        }

        fn polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
            self.commands
                .push(Command::Polyline(points.to_vec(), width, color));
        }
    }

    fn scope(finish: FinishPolicy) -> Scope {
        Scope::new(
            PanelLayout::oscilloscope(),
            Mixer::new(WavePresets::default(), MixPolicy::Beat),
            CueTrack::standard(),
            finish,
        )
    }

    fn running(selectors: [bool; 3]) -> InputSnapshot {
        InputSnapshot {
            selectors,
            run: true,
            exit: false,
        }
    }

    #[test]
    fn idle_frame_queries_playback_without_playing() {
        let mut scope = scope(FinishPolicy::Exit);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let mut canvas = RecordingCanvas::default();
        let outcome = scope.step(&InputSnapshot::default(), 0.5, &mut deck, &mut canvas);
        assert_eq!(outcome, FrameOutcome::Continue);
        assert_eq!(deck.queries.get(), 1);
        assert_eq!(deck.plays, 0);
        assert_eq!(scope.mode(), ScopeMode::Idle);
        assert!(canvas.polylines().is_empty());
        assert!(canvas.contains_primitive(&scope.layout().blank_screen));
    }

    #[test]
    fn chassis_is_drawn_first_every_frame() {
        let mut scope = scope(FinishPolicy::Exit);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let chassis_len = scope.layout().chassis.len();
        for input in [InputSnapshot::default(), running([false; 3])] {
            let mut canvas = RecordingCanvas::default();
            scope.step(&input, 1.0, &mut deck, &mut canvas);
            let chassis: Vec<Command> =
                scope.layout().chassis.iter().map(Command::from).collect();
            assert!(canvas.commands.len() > chassis_len);
            assert_eq!(canvas.commands[..chassis_len], chassis[..]);
        }
    }

    #[test]
    fn run_while_stopped_plays_once_and_activates() {
        let mut scope = scope(FinishPolicy::Exit);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let mut canvas = RecordingCanvas::default();
        scope.step(&running([false; 3]), 0.0, &mut deck, &mut canvas);
        assert_eq!(deck.plays, 1);
        assert_eq!(scope.mode(), ScopeMode::Active);
        let traces = canvas.polylines();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].len(), TRACE_POINTS);
        assert!(!canvas.contains_primitive(&scope.layout().blank_screen));

        scope.step(&running([false; 3]), 0.016, &mut deck, &mut canvas);
        assert_eq!(deck.plays, 1);
    }

    #[test]
    fn run_off_while_playing_stops_once() {
        let mut scope = scope(FinishPolicy::Exit);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let mut canvas = RecordingCanvas::default();
        scope.step(&running([false; 3]), 0.0, &mut deck, &mut canvas);
        scope.step(&InputSnapshot::default(), 0.1, &mut deck, &mut canvas);
        scope.step(&InputSnapshot::default(), 0.2, &mut deck, &mut canvas);
        assert_eq!(deck.stops, 1);
        assert_eq!(scope.mode(), ScopeMode::Idle);
    }

    #[test]
    fn two_selectors_trace_the_beat() {
        let mut scope = scope(FinishPolicy::Exit);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let mut canvas = RecordingCanvas::default();
        let time = 2.5;
        scope.step(&running([true, true, false]), time, &mut deck, &mut canvas);
        let [one, two, _] = WavePresets::default().selectors;
        let expected: Vec<Vec2> = sample_trace(beat(time, one, two), time).collect();
        let alone: Vec<Vec2> = sample_trace(one, time).collect();
        let traces = canvas.polylines();
        assert_eq!(traces[0], &expected);
        assert_ne!(traces[0], &alone);
    }

    #[test]
    fn finished_track_ends_the_loop() {
        let mut scope = scope(FinishPolicy::Exit);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let mut canvas = RecordingCanvas::default();
        scope.step(&running([false; 3]), 0.0, &mut deck, &mut canvas);
        deck.state = PlaybackState::Finished;
        let outcome = scope.step(&running([false; 3]), 60.0, &mut deck, &mut canvas);
        assert_eq!(outcome, FrameOutcome::Finished);
        assert_eq!(deck.plays, 1);
    }

    #[test]
    fn finished_track_restarts_when_asked() {
        let mut scope = scope(FinishPolicy::Restart);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let mut canvas = RecordingCanvas::default();
        scope.step(&running([false; 3]), 0.0, &mut deck, &mut canvas);
        deck.state = PlaybackState::Finished;
        let outcome = scope.step(&running([false; 3]), 60.0, &mut deck, &mut canvas);
        assert_eq!(outcome, FrameOutcome::Continue);
        assert_eq!(deck.plays, 2);
        assert_eq!(scope.mode(), ScopeMode::Active);

        // Cues keep counting from the Idle -> Active change, not the replay.
        let mut canvas = RecordingCanvas::default();
        scope.step(&running([false; 3]), 63.2, &mut deck, &mut canvas);
        assert_eq!(canvas.cue_rects(scope.layout()), 0);
    }

    #[test]
    fn cue_prompts_follow_activation() {
        let mut scope = scope(FinishPolicy::Exit);
        let mut deck = FakeDeck::new(PlaybackState::Stopped);
        let mut canvas = RecordingCanvas::default();
        scope.step(&running([false; 3]), 1.0, &mut deck, &mut canvas);

        let layout = scope.layout().clone();
        let cue = Primitive {
            color: layout.cue_color,
            ..layout.key_buttons[0]
        };

        let mut canvas = RecordingCanvas::default();
        scope.step(&running([false; 3]), 4.2, &mut deck, &mut canvas);
        assert!(canvas.contains_primitive(&cue));
        assert_eq!(canvas.cue_rects(&layout), 1);

        let mut canvas = RecordingCanvas::default();
        scope.step(&InputSnapshot::default(), 4.3, &mut deck, &mut canvas);
        assert!(!canvas.contains_primitive(&cue));
    }
}
