use std::f32::consts::TAU;

use macroquad::prelude::{Color, Mesh, Vec2, Vertex, vec2};

pub const CIRCLE_SEGMENTS: u16 = 25;

/// Receives the primitive draw commands of one frame. Positions are in
/// normalized device coordinates with y pointing up.
pub trait Canvas {
    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// `width` is in pixels.
    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn to_pixels(&self, ndc: Vec2) -> Vec2 {
        vec2(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}

/// Tessellates draw commands into one mesh that lives as long as the
/// canvas. Each frame clears and refills the same vertex and index buffers.
pub struct MeshCanvas {
    viewport: Viewport,
    mesh: Mesh,
    overflowed: bool,
}

impl MeshCanvas {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            mesh: Mesh {
                vertices: Vec::with_capacity(1024),
                indices: Vec::with_capacity(2048),
                texture: None,
            },
            overflowed: false,
        }
    }

    pub fn begin_frame(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.mesh.vertices.clear();
        self.mesh.indices.clear();
        self.overflowed = false;
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Returns the index of the next vertex, or `None` when `count` more
    /// vertices would no longer be addressable by `u16` indices.
    fn reserve(&mut self, count: usize) -> Option<u16> {
        let base = self.mesh.vertices.len();
        if base + count > u16::MAX as usize {
            if !self.overflowed {
                log::warn!("frame mesh is full, dropping shapes");
                self.overflowed = true;
            }
            return None;
        }
        Some(base as u16)
    }

    fn push_pixel(&mut self, pixel: Vec2, color: Color) {
        self.mesh
            .vertices
            .push(Vertex::new(pixel.x, pixel.y, 0.0, 0.0, 0.0, color));
    }

    fn push_ndc(&mut self, ndc: Vec2, color: Color) {
        let pixel = self.viewport.to_pixels(ndc);
        self.push_pixel(pixel, color);
    }

    fn push_quad_indices(&mut self, base: u16) {
        self.mesh
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
}

impl Canvas for MeshCanvas {
    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Color) {
        let Some(base) = self.reserve(4) else {
            return;
        };
        self.push_ndc(vec2(min.x, min.y), color);
        self.push_ndc(vec2(min.x, max.y), color);
        self.push_ndc(vec2(max.x, max.y), color);
        self.push_ndc(vec2(max.x, min.y), color);
        self.push_quad_indices(base);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let Some(base) = self.reserve(CIRCLE_SEGMENTS as usize + 1) else {
            return;
        };
        self.push_ndc(center, color);
        for segment in 0..CIRCLE_SEGMENTS {
            let angle = TAU * segment as f32 / CIRCLE_SEGMENTS as f32;
            self.push_ndc(center + vec2(angle.cos(), angle.sin()) * radius, color);
        }
        for segment in 0..CIRCLE_SEGMENTS {
            self.mesh.indices.extend_from_slice(&[
                base,
                base + segment + 1,
                base + (segment + 1) % CIRCLE_SEGMENTS + 1,
            ]);
        }
    }

    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        let half = width * 0.5;
        for pair in points.windows(2) {
            let Some(base) = self.reserve(4) else {
                return;
            };
            let start = self.viewport.to_pixels(pair[0]);
            let end = self.viewport.to_pixels(pair[1]);
            let direction = (end - start).normalize_or_zero();
            let normal = vec2(-direction.y, direction.x) * half;
            self.push_pixel(start + normal, color);
            self.push_pixel(start - normal, color);
            self.push_pixel(end - normal, color);
            self.push_pixel(end + normal, color);
            self.push_quad_indices(base);
        }
    }
}
