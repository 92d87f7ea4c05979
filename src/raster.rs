// ============================================================================
// SOFTWARE RASTERIZER
// ============================================================================

use crate::error::GaugeError;
use crate::geometry::{Point, Rect};
use crate::scene::{Anchor, DrawCommand, Scene};
use crate::Color;
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::path::Path;

pub struct Canvas<'a> {
    pub frame: &'a mut [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> Canvas<'a> {
    /// `frame` is RGBA, `width * height * 4` bytes.
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        self.frame
            .get(idx..idx + 3)
            .map(|px| Color::new(px[0], px[1], px[2]))
    }

    fn blend(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = 0xff;
    }
}

pub fn load_font(path: &Path) -> Result<Font<'static>, GaugeError> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data)
        .ok_or_else(|| GaugeError::Font(format!("{} is not a TrueType font", path.display())))
}

/// Paints scene commands in order. Text is skipped without a font.
pub fn render_scene(canvas: &mut Canvas, scene: &Scene, font: Option<&Font<'static>>) {
    for command in scene.commands() {
        match command {
            DrawCommand::Clear(color) => canvas.clear(*color),
            DrawCommand::Arc {
                path,
                thickness,
                color,
            } => {
                if !path.is_degenerate() {
                    fill_annular_sector(
                        canvas,
                        path.center,
                        path.radius,
                        *thickness,
                        path.start_deg,
                        path.sweep_deg(),
                        *color,
                    );
                }
            }
            DrawCommand::Ring {
                center,
                radius,
                thickness,
                rotation_deg,
                dash_offset,
                color,
            } => {
                let circumference = 2.0 * std::f64::consts::PI * radius;
                let visible = match dash_offset {
                    Some(offset) if circumference > 0.0 => {
                        (1.0 - offset / circumference).clamp(0.0, 1.0)
                    }
                    Some(_) => 0.0,
                    None => 1.0,
                };
                if visible > 0.0 {
                    fill_annular_sector(
                        canvas,
                        *center,
                        *radius,
                        *thickness,
                        rotation_deg + 90.0,
                        360.0 * visible,
                        *color,
                    );
                }
            }
            DrawCommand::Rect { rect, color } => fill_rect(canvas, *rect, *color),
            DrawCommand::Line {
                from,
                to,
                width,
                dash,
                color,
            } => match dash {
                Some((on, off)) => draw_dashed_line(canvas, *from, *to, *width, *on, *off, *color),
                None => draw_thick_line_aa(canvas, *from, *to, *width, *color),
            },
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => draw_circle(canvas, *center, *radius, *color),
            DrawCommand::Text {
                at,
                text,
                size,
                anchor,
                color,
                ..
            } => {
                if let Some(font) = font {
                    draw_text(canvas, *at, text, font, Scale::uniform(*size as f32), *anchor, *color);
                }
            }
        }
    }
}

/// Stroke of `thickness` centred on `radius`, from `start_deg` clockwise
/// through `sweep_deg` (clock angles, 0 = 12 o'clock).
fn fill_annular_sector(
    canvas: &mut Canvas,
    center: Point,
    radius: f64,
    thickness: f64,
    start_deg: f64,
    sweep_deg: f64,
    color: Color,
) {
    let inner = (radius - thickness / 2.0).max(0.0);
    let outer = radius + thickness / 2.0;
    if outer <= 0.0 || sweep_deg <= 0.0 {
        return;
    }
    let full = sweep_deg >= 360.0;
    let min_x = (center.x - outer - 1.0).floor().max(0.0) as i32;
    let max_x = (center.x + outer + 1.0).ceil().min(canvas.width as f64) as i32;
    let min_y = (center.y - outer - 1.0).floor().max(0.0) as i32;
    let max_y = (center.y + outer + 1.0).ceil().min(canvas.height as f64) as i32;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if !full {
                let clock = dy.atan2(dx).to_degrees() + 90.0;
                let rel = (clock - start_deg).rem_euclid(360.0);
                if rel > sweep_deg {
                    continue;
                }
            }
            let aa = if dist > outer {
                1.0 - (dist - outer).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.blend(x, y, color, aa as f32);
            }
        }
    }
}

fn fill_rect(canvas: &mut Canvas, rect: Rect, color: Color) {
    if rect.is_empty() {
        return;
    }
    let x0 = rect.x.round().max(0.0) as i32;
    let y0 = rect.y.round().max(0.0) as i32;
    let x1 = (rect.x + rect.width).round().min(canvas.width as f64) as i32;
    let y1 = (rect.y + rect.height).round().min(canvas.height as f64) as i32;
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.blend(x, y, color, 1.0);
        }
    }
}

fn draw_thick_line_aa(canvas: &mut Canvas, from: Point, to: Point, thickness: f64, color: Color) {
    let half = (thickness / 2.0) as f32;
    let pad = thickness.ceil() as i32 + 1;
    let (x0, y0, x1, y1) = (from.x as f32, from.y as f32, to.x as f32, to.y as f32);
    let min_x = x0.min(x1) as i32 - pad;
    let max_x = x0.max(x1) as i32 + pad;
    let min_y = y0.min(y1) as i32 - pad;
    let max_y = y0.max(y1) as i32 + pad;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0;
            let py = y as f32 - y0;
            let t = if len_sq > 0.0 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let lx = x0 + t * dx;
            let ly = y0 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - half).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.blend(x, y, color, aa);
            }
        }
    }
}

fn draw_dashed_line(
    canvas: &mut Canvas,
    from: Point,
    to: Point,
    thickness: f64,
    on: f64,
    off: f64,
    color: Color,
) {
    let length = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
    if length <= 0.0 || on <= 0.0 {
        return;
    }
    let (ux, uy) = ((to.x - from.x) / length, (to.y - from.y) / length);
    let mut pos = 0.0;
    while pos < length {
        let end = (pos + on).min(length);
        let a = Point::new(from.x + ux * pos, from.y + uy * pos);
        let b = Point::new(from.x + ux * end, from.y + uy * end);
        draw_thick_line_aa(canvas, a, b, thickness, color);
        pos = end + off.max(0.0);
    }
}

fn draw_circle(canvas: &mut Canvas, center: Point, radius: f64, color: Color) {
    if radius <= 0.0 {
        return;
    }
    let reach = radius.ceil() as i32 + 1;
    let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
    for y in -reach..=reach {
        for x in -reach..=reach {
            let dist = ((x * x + y * y) as f64).sqrt();
            let aa = if dist > radius {
                1.0 - (dist - radius).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.blend(cx + x, cy + y, color, aa as f32);
            }
        }
    }
}

fn text_bounds(glyphs: &[PositionedGlyph]) -> (i32, i32, i32, i32) {
    glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    )
}

/// Text anchored horizontally per `anchor` and vertically centred on `at`.
fn draw_text(
    canvas: &mut Canvas,
    at: Point,
    text: &str,
    font: &Font,
    scale: Scale,
    anchor: Anchor,
    color: Color,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (min_x, max_x, min_y, max_y) = text_bounds(&glyphs);
    if min_x >= max_x || min_y >= max_y {
        return;
    }
    let width_px = max_x - min_x;
    let height_px = max_y - min_y;
    let x = at.x.round() as i32;
    let offset_x = match anchor {
        Anchor::Start => x,
        Anchor::Middle => x - width_px / 2,
        Anchor::End => x - width_px,
    };
    let offset_y = at.y.round() as i32 - height_px / 2;
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.blend(px, py, color, v);
            });
        }
    }
}
