use macroquad::prelude::*;

#[derive(Clone, Copy, Debug)]
pub struct KeyBindings {
    pub selectors: [KeyCode; 3],
    pub exit: KeyCode,
    pub run_on: MouseButton,
    pub run_off: MouseButton,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            selectors: [KeyCode::Z, KeyCode::X, KeyCode::C],
            exit: KeyCode::Escape,
            run_on: MouseButton::Left,
            run_off: MouseButton::Right,
        }
    }
}

/// Everything the frame loop reads from the user, captured once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub selectors: [bool; 3],
    pub run: bool,
    pub exit: bool,
}

pub struct InputController {
    bindings: KeyBindings,
    run: bool,
}

impl InputController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            run: false,
        }
    }

    pub fn poll(&mut self) -> InputSnapshot {
        self.latch_run(
            is_mouse_button_pressed(self.bindings.run_on),
            is_mouse_button_pressed(self.bindings.run_off),
        );
        InputSnapshot {
            selectors: self.bindings.selectors.map(is_key_down),
            run: self.run,
            exit: is_key_pressed(self.bindings.exit),
        }
    }

    /// The run latch switches on and off with separate buttons. When both are
    /// pressed in the same frame, off wins.
    fn latch_run(&mut self, on_pressed: bool, off_pressed: bool) {
        if on_pressed {
            self.run = true;
        }
        if off_pressed {
            self.run = false;
        }
    }
}
