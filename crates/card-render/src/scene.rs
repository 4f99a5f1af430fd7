//! Declarative draw commands.
//!
//! The compositor describes a card as an ordered list of [`DrawCommand`]s.
//! Nothing here touches pixels; [`crate::raster::Rasterizer`] applies the
//! list to a canvas. Later commands paint over earlier ones.

use std::fmt;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::layout::{Circle, Point, Rect};

/// Fill source for rectangles.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba<u8>),
    /// Two-stop gradient along the line `from -> to`, clamped at both ends.
    LinearGradient {
        from: Point,
        to: Point,
        stops: [Rgba<u8>; 2],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub face: FontFace,
    pub color: Rgba<u8>,
    pub align: TextAlign,
}

/// Shared raster image referenced by a command.
#[derive(Clone, PartialEq)]
pub struct Bitmap(pub Arc<RgbaImage>);

impl Bitmap {
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({}x{})", self.0.width(), self.0.height())
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    /// Corner radii are top-left, top-right, bottom-right, bottom-left.
    FillRoundedRect {
        rect: Rect,
        radii: [f32; 4],
        paint: Paint,
    },
    FillCircle {
        circle: Circle,
        color: Rgba<u8>,
    },
    StrokeCircle {
        circle: Circle,
        width: f32,
        color: Rgba<u8>,
    },
    /// Image center-cropped to a square and clipped to the circle.
    CircleImage {
        circle: Circle,
        image: Bitmap,
    },
    /// Image scaled to fill the rectangle.
    Image {
        rect: Rect,
        image: Bitmap,
    },
    /// Text anchored at a baseline point. Text wider than `max_width` is
    /// condensed to fit.
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
        max_width: Option<f32>,
    },
    Polyline {
        points: Vec<Point>,
        width: f32,
        color: Rgba<u8>,
    },
}

impl DrawCommand {
    /// Area touched by the command. Text reports its anchor only, since
    /// its extent depends on the font.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::FillRect { rect, .. }
            | Self::FillRoundedRect { rect, .. }
            | Self::Image { rect, .. } => *rect,
            Self::FillCircle { circle, .. } | Self::CircleImage { circle, .. } => circle.bounds(),
            Self::StrokeCircle { circle, width, .. } => Circle {
                center: circle.center,
                radius: circle.radius + width / 2.0,
            }
            .bounds(),
            Self::Text { origin, .. } => Rect::new(origin.x, origin.y, 0.0, 0.0),
            Self::Polyline { points, width, .. } => {
                let half = width / 2.0;
                let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
                let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
                let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
                let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
                Rect::new(
                    min_x - half,
                    min_y - half,
                    max_x - min_x + width,
                    max_y - min_y + width,
                )
            }
        }
    }
}

/// An ordered list of commands for a canvas of fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// All text strings, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Indices of commands that reach outside the canvas.
    pub fn out_of_bounds(&self) -> Vec<usize> {
        let canvas = Rect::new(0.0, 0.0, self.width as f32, self.height as f32);
        self.commands
            .iter()
            .enumerate()
            .filter(|(_, command)| !canvas.contains_rect(&command.bounds()))
            .map(|(index, _)| index)
            .collect()
    }
}
