//! Retained-mode drawing commands produced by the gauge variants.
//!
//! A scene can be rasterized into a frame buffer (see `raster`) or written out
//! as an SVG document.

use crate::geometry::{ArcPath, Point, Rect};
use crate::Color;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    Start,
    #[default]
    Middle,
    End,
}

impl Anchor {
    fn as_svg(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    /// Stroked arc.
    Arc {
        path: ArcPath,
        thickness: f64,
        color: Color,
    },
    /// Stroked full circle. With `dash_offset` only the leading
    /// `1 - offset / circumference` of the ring is drawn, starting at
    /// `rotation_deg` (SVG rotation, 0 = 3 o'clock).
    Ring {
        center: Point,
        radius: f64,
        thickness: f64,
        rotation_deg: f64,
        dash_offset: Option<f64>,
        color: Color,
    },
    Rect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        dash: Option<(f64, f64)>,
        color: Color,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Color,
    },
    Text {
        at: Point,
        text: String,
        size: f64,
        anchor: Anchor,
        bold: bool,
        color: Color,
    },
}

impl DrawCommand {
    fn translate(&mut self, dx: f64, dy: f64) {
        let shift = |p: &mut Point| {
            p.x += dx;
            p.y += dy;
        };
        match self {
            DrawCommand::Clear(_) => {}
            DrawCommand::Arc { path, .. } => {
                shift(&mut path.center);
                shift(&mut path.start);
                shift(&mut path.end);
            }
            DrawCommand::Ring { center, .. } | DrawCommand::Circle { center, .. } => shift(center),
            DrawCommand::Rect { rect, .. } => {
                rect.x += dx;
                rect.y += dy;
            }
            DrawCommand::Line { from, to, .. } => {
                shift(from);
                shift(to);
            }
            DrawCommand::Text { at, .. } => shift(at),
        }
    }
}

/// Commands in paint order plus the region they were laid out in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Append `other`, shifted so its origin lands at `(x, y)`.
    pub fn place(&mut self, other: &Scene, x: f64, y: f64) {
        for command in &other.commands {
            let mut command = command.clone();
            command.translate(x, y);
            self.commands.push(command);
        }
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for command in &self.commands {
            let _ = match command {
                DrawCommand::Clear(color) => writeln!(
                    out,
                    r#"<rect x="0" y="0" width="100%" height="100%" fill="{color}"/>"#
                ),
                DrawCommand::Arc {
                    path,
                    thickness,
                    color,
                } => writeln!(
                    out,
                    r#"<path d="{path}" fill="none" stroke="{color}" stroke-width="{thickness}"/>"#
                ),
                DrawCommand::Ring {
                    center,
                    radius,
                    thickness,
                    rotation_deg,
                    dash_offset,
                    color,
                } => {
                    let dash = match dash_offset {
                        Some(offset) => format!(
                            r#" stroke-dasharray="{c}" stroke-dashoffset="{offset}""#,
                            c = 2.0 * std::f64::consts::PI * radius
                        ),
                        None => String::new(),
                    };
                    writeln!(
                        out,
                        r#"<circle cx="{x}" cy="{y}" r="{radius}" fill="none" stroke="{color}" stroke-width="{thickness}"{dash} transform="rotate({rotation_deg} {x} {y})"/>"#,
                        x = center.x,
                        y = center.y
                    )
                }
                DrawCommand::Rect { rect, color } => writeln!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"/>"#,
                    rect.x, rect.y, rect.width, rect.height
                ),
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    dash,
                    color,
                } => {
                    let dash = dash
                        .map(|(on, off)| format!(r#" stroke-dasharray="{on},{off}""#))
                        .unwrap_or_default();
                    writeln!(
                        out,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="{width}"{dash}/>"#,
                        from.x, from.y, to.x, to.y
                    )
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => writeln!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="{color}"/>"#,
                    center.x, center.y
                ),
                DrawCommand::Text {
                    at,
                    text,
                    size,
                    anchor,
                    bold,
                    color,
                } => writeln!(
                    out,
                    r#"<text x="{}" y="{}" font-size="{size}" font-weight="{}" text-anchor="{}" fill="{color}">{}</text>"#,
                    at.x,
                    at.y,
                    if *bold { 700 } else { 400 },
                    anchor.as_svg(),
                    escape_xml(text)
                ),
            };
        }
        out.push_str("</svg>\n");
        out
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::arc_path;

    #[test]
    fn place_translates_every_point() {
        let mut child = Scene::new(10.0, 10.0);
        child.add_command(DrawCommand::Line {
            from: Point::new(1.0, 1.0),
            to: Point::new(2.0, 3.0),
            width: 1.0,
            dash: None,
            color: Color::BLACK,
        });
        child.add_command(DrawCommand::Arc {
            path: arc_path(0.0, 90.0, 5.0, Point::new(5.0, 5.0)),
            thickness: 2.0,
            color: Color::BLACK,
        });

        let mut parent = Scene::new(100.0, 100.0);
        parent.place(&child, 50.0, 20.0);
        match &parent.commands()[0] {
            DrawCommand::Line { from, to, .. } => {
                assert_eq!(*from, Point::new(51.0, 21.0));
                assert_eq!(*to, Point::new(52.0, 23.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
        match &parent.commands()[1] {
            DrawCommand::Arc { path, .. } => assert_eq!(path.center, Point::new(55.0, 25.0)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn svg_output_contains_primitives() {
        let mut scene = Scene::new(40.0, 20.0);
        scene.add_command(DrawCommand::Rect {
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
            color: Color::hex(0x2e7d32),
        });
        scene.add_command(DrawCommand::Text {
            at: Point::new(5.0, 5.0),
            text: "<42>".to_string(),
            size: 12.0,
            anchor: Anchor::End,
            bold: true,
            color: Color::BLACK,
        });
        let svg = scene.to_svg();
        assert!(svg.contains(r##"fill="#2e7d32""##));
        assert!(svg.contains("&lt;42&gt;"));
        assert!(svg.contains(r#"text-anchor="end""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
