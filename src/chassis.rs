use macroquad::prelude::{Color, Vec2, vec2};

use crate::canvas::Canvas;

const COLUMNS: usize = 3;
const COLUMN_STEP: f32 = 0.22;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect { min: Vec2, max: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub color: Color,
}

impl Primitive {
    fn rect(x1: f32, y1: f32, x2: f32, y2: f32, color: Color) -> Self {
        Self {
            shape: Shape::Rect {
                min: vec2(x1, y1),
                max: vec2(x2, y2),
            },
            color,
        }
    }

    fn circle(cx: f32, cy: f32, radius: f32, color: Color) -> Self {
        Self {
            shape: Shape::Circle {
                center: vec2(cx, cy),
                radius,
            },
            color,
        }
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        match self.shape {
            Shape::Rect { min, max } => canvas.fill_rect(min, max, self.color),
            Shape::Circle { center, radius } => canvas.fill_circle(center, radius, self.color),
        }
    }
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::new(r, g, b, 1.0)
}

/// Static description of the oscilloscope face. Built once and replayed
/// into the canvas every frame.
#[derive(Clone, Debug)]
pub struct PanelLayout {
    pub background: Color,
    pub chassis: Vec<Primitive>,
    /// Drawn over the screen while the scope is idle.
    pub blank_screen: Primitive,
    pub key_buttons: [Primitive; COLUMNS],
    pub cue_color: Color,
    pub trace_color: Color,
    pub trace_width: f32,
}

impl PanelLayout {
    pub fn oscilloscope() -> Self {
        let mut chassis = vec![
            Primitive::rect(-0.9, -0.8, 0.9, 0.8, rgb(0.95, 0.95, 0.65)),
            Primitive::rect(0.15, -0.75, 0.87, 0.75, rgb(0.9, 0.9, 0.5)),
            Primitive::rect(0.17, -0.72, 0.85, 0.72, rgb(0.9, 0.9, 0.6)),
            Primitive::rect(-0.87, -0.5, 0.12, 0.75, rgb(0.9, 0.9, 0.46)),
            Primitive::rect(-0.8, -0.4, 0.05, 0.65, rgb(0.1, 0.45, 0.25)),
            Primitive::rect(0.72, 0.57, 0.82, 0.67, rgb(1.0, 0.2, 0.2)),
        ];

        let key_buttons: [Primitive; COLUMNS] =
            std::array::from_fn(|column| key_button(column, rgb(1.0, 1.0, 0.76)));
        for (column, button) in key_buttons.iter().enumerate() {
            let x = COLUMN_STEP * column as f32;
            chassis.extend([
                Primitive::rect(0.2 + x, -0.31, 0.39 + x, 0.05, rgb(1.0, 1.0, 0.56)),
                Primitive::circle(0.295 + x, -0.13, 0.086, rgb(0.8, 0.8, 0.4)),
                Primitive::circle(0.295 + x, -0.53, 0.05, rgb(0.7, 0.7, 0.5)),
                Primitive::circle(0.295 + x, -0.53, 0.04, rgb(0.9, 0.9, 0.7)),
                Primitive::circle(0.295 + x, -0.53, 0.02, rgb(0.3, 0.3, 0.2)),
                Primitive::rect(0.26 + x, -0.45, 0.33 + x, -0.38, rgb(1.0, 1.0, 0.76)),
                Primitive::circle(0.295 + x, 0.2, 0.06, rgb(0.5, 0.5, 0.4)),
                *button,
            ]);
        }

        let foot = rgb(0.7, 0.7, 0.5);
        for side in 0..2 {
            let x = 1.4 * side as f32;
            chassis.push(Primitive::rect(-0.8 + x, -0.91, -0.6 + x, -0.81, foot));
        }

        Self {
            background: rgb(0.1, 0.1, 0.1),
            chassis,
            blank_screen: Primitive::rect(-0.8, -0.4, 0.05, 0.65, rgb(0.15, 0.15, 0.15)),
            key_buttons,
            cue_color: rgb(1.0, 0.0, 0.0),
            trace_color: foot,
            trace_width: 5.0,
        }
    }

    pub fn draw_chassis(&self, canvas: &mut impl Canvas) {
        for primitive in &self.chassis {
            primitive.draw(canvas);
        }
    }

    pub fn draw_blank_screen(&self, canvas: &mut impl Canvas) {
        self.blank_screen.draw(canvas);
    }

    pub fn highlight_key(&self, canvas: &mut impl Canvas, index: usize) {
        if let Some(button) = self.key_buttons.get(index) {
            Primitive {
                color: self.cue_color,
                ..*button
            }
            .draw(canvas);
        }
    }
}

fn key_button(column: usize, color: Color) -> Primitive {
    let x = COLUMN_STEP * column as f32;
    Primitive::rect(-0.67 + x, -0.75, -0.52 + x, -0.55, color)
}
