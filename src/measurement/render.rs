//! Screen-space draw commands handed to the renderer

use crate::core::ScreenPoint;
use serde::{Deserialize, Serialize};

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 214, 10);
    pub const CYAN: Color = Color::rgb(0, 200, 255);
    pub const MAGENTA: Color = Color::rgb(230, 60, 200);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Styling for one family of overlay primitives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub line_color: Color,
    pub point_color: Color,
    pub label_color: Color,
    pub line_width_px: f32,
    pub point_radius_px: f32,
}

/// Styles for completed, in-progress and calibration geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayTheme {
    pub history: OverlayStyle,
    pub active: OverlayStyle,
    pub calibration: OverlayStyle,
}

impl Default for OverlayTheme {
    fn default() -> Self {
        Self {
            history: OverlayStyle {
                line_color: Color::WHITE,
                point_color: Color::WHITE,
                label_color: Color::WHITE,
                line_width_px: 6.0,
                point_radius_px: 10.0,
            },
            active: OverlayStyle {
                line_color: Color::YELLOW.with_alpha(200),
                point_color: Color::YELLOW,
                label_color: Color::YELLOW,
                line_width_px: 4.0,
                point_radius_px: 12.0,
            },
            calibration: OverlayStyle {
                line_color: Color::MAGENTA,
                point_color: Color::MAGENTA,
                label_color: Color::MAGENTA,
                line_width_px: 4.0,
                point_radius_px: 12.0,
            },
        }
    }
}

/// One primitive in pixel coordinates of the current viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderCommand {
    Line {
        from: ScreenPoint,
        to: ScreenPoint,
        color: Color,
        width_px: f32,
    },
    Point {
        center: ScreenPoint,
        radius_px: f32,
        color: Color,
    },
    Label {
        at: ScreenPoint,
        text: String,
        color: Color,
    },
}

impl RenderCommand {
    pub fn point(center: ScreenPoint, style: &OverlayStyle) -> Self {
        RenderCommand::Point {
            center,
            radius_px: style.point_radius_px,
            color: style.point_color,
        }
    }

    pub fn line(from: ScreenPoint, to: ScreenPoint, style: &OverlayStyle) -> Self {
        RenderCommand::Line {
            from,
            to,
            color: style.line_color,
            width_px: style.line_width_px,
        }
    }

    pub fn label(at: ScreenPoint, text: String, style: &OverlayStyle) -> Self {
        RenderCommand::Label {
            at,
            text,
            color: style.label_color,
        }
    }
}

/// Line, two endpoint markers and a midpoint label
pub fn push_segment(
    out: &mut Vec<RenderCommand>,
    from: ScreenPoint,
    to: ScreenPoint,
    text: String,
    style: &OverlayStyle,
) {
    out.push(RenderCommand::line(from, to, style));
    out.push(RenderCommand::point(from, style));
    out.push(RenderCommand::point(to, style));
    out.push(RenderCommand::label(from.midpoint(&to), text, style));
}
