/// A timed prompt that lights up one or more key buttons.
#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    pub at: f32,
    pub keys: Vec<usize>,
}

/// Prompts played against the time since playback started.
#[derive(Clone, Debug)]
pub struct CueTrack {
    cues: Vec<Cue>,
    hold: f32,
    started_at: Option<f32>,
}

impl CueTrack {
    pub fn new(cues: Vec<Cue>, hold: f32) -> Self {
        Self {
            cues,
            hold,
            started_at: None,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            vec![
                Cue {
                    at: 3.0,
                    keys: vec![0],
                },
                Cue {
                    at: 5.0,
                    keys: vec![1],
                },
                Cue {
                    at: 7.0,
                    keys: vec![2, 0],
                },
            ],
            0.5,
        )
    }

    pub fn start(&mut self, now: f32) {
        self.started_at = Some(now);
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }

    pub fn active_keys(&self, now: f32) -> impl Iterator<Item = usize> + '_ {
        let elapsed = self.started_at.map(|start| now - start);
        self.cues
            .iter()
            .filter(move |cue| {
                elapsed.is_some_and(|elapsed| elapsed >= cue.at && elapsed <= cue.at + self.hold)
            })
            .flat_map(|cue| cue.keys.iter().copied())
    }
}
