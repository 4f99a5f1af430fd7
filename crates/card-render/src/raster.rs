//! Software rasterizer for draw-command scenes.
//!
//! Shapes are anti-aliased by pixel-center distance; colors are composited
//! with straight-alpha "source over". The canvas starts fully transparent,
//! so the first command of a card scene is always an opaque background.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rusttype::{point, Scale};

use crate::fonts::{text_width, FontSet};
use crate::layout::{Circle, Point, Rect};
use crate::scene::{Bitmap, DrawCommand, Paint, Scene, TextAlign, TextStyle};

/// Applies scenes to pixel buffers.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer<'a> {
    fonts: &'a FontSet,
}

impl<'a> Rasterizer<'a> {
    pub fn new(fonts: &'a FontSet) -> Self {
        Self { fonts }
    }

    pub fn render(&self, scene: &Scene) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(scene.width, scene.height, Rgba([0, 0, 0, 0]));
        for command in &scene.commands {
            self.apply(&mut canvas, command);
        }
        canvas
    }

    fn apply(&self, canvas: &mut RgbaImage, command: &DrawCommand) {
        match command {
            DrawCommand::FillRect { rect, paint } => fill_rect(canvas, rect, paint),
            DrawCommand::FillRoundedRect { rect, radii, paint } => {
                fill_rounded_rect(canvas, rect, radii, paint)
            }
            DrawCommand::FillCircle { circle, color } => fill_circle(canvas, circle, *color),
            DrawCommand::StrokeCircle {
                circle,
                width,
                color,
            } => stroke_circle(canvas, circle, *width, *color),
            DrawCommand::CircleImage { circle, image } => draw_circle_image(canvas, circle, image),
            DrawCommand::Image { rect, image } => draw_image(canvas, rect, image),
            DrawCommand::Text {
                text,
                origin,
                style,
                max_width,
            } => self.draw_text(canvas, text, *origin, style, *max_width),
            DrawCommand::Polyline {
                points,
                width,
                color,
            } => stroke_polyline(canvas, points, *width, *color),
        }
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        origin: Point,
        style: &TextStyle,
        max_width: Option<f32>,
    ) {
        let Some(font) = self.fonts.face(style.face) else {
            tracing::trace!(text, "Skipping text, no font loaded");
            return;
        };

        let natural = text_width(font, style.size, text);
        let condense = match max_width {
            Some(limit) if natural > limit && natural > 0.0 => limit / natural,
            _ => 1.0,
        };
        let width = natural * condense;
        let start_x = match style.align {
            TextAlign::Left => origin.x,
            TextAlign::Center => origin.x - width / 2.0,
        };
        let scale = Scale {
            x: style.size * condense,
            y: style.size,
        };

        for glyph in font.layout(text, scale, point(start_x, origin.y)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    blend(
                        canvas,
                        i64::from(bb.min.x) + i64::from(gx),
                        i64::from(bb.min.y) + i64::from(gy),
                        style.color,
                        coverage,
                    );
                });
            }
        }
    }
}

/// Composite `color` over the pixel at `(x, y)` with the given coverage.
fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let alpha = f32::from(color.0[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let dst_alpha = f32::from(dst.0[3]) / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    for channel in 0..3 {
        let src = f32::from(color.0[channel]);
        let under = f32::from(dst.0[channel]);
        let value = (src * alpha + under * dst_alpha * (1.0 - alpha)) / out_alpha;
        dst.0[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Integer pixel range `[x0, x1) × [y0, y1)` covering `rect`, clipped to the canvas.
fn pixel_span(canvas: &RgbaImage, rect: &Rect) -> (i64, i64, i64, i64) {
    let x0 = (rect.x.floor() as i64).max(0);
    let y0 = (rect.y.floor() as i64).max(0);
    let x1 = (rect.right().ceil() as i64).min(i64::from(canvas.width()));
    let y1 = (rect.bottom().ceil() as i64).min(i64::from(canvas.height()));
    (x0, x1, y0, y1)
}

fn sample(paint: &Paint, x: f32, y: f32) -> Rgba<u8> {
    match paint {
        Paint::Solid(color) => *color,
        Paint::LinearGradient { from, to, stops } => {
            let (dx, dy) = (to.x - from.x, to.y - from.y);
            let length_sq = dx * dx + dy * dy;
            let t = if length_sq > 0.0 {
                (((x - from.x) * dx + (y - from.y) * dy) / length_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            lerp_color(stops[0], stops[1], t)
        }
    }
}

fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().enumerate() {
        let mixed = f32::from(a.0[channel]) + (f32::from(b.0[channel]) - f32::from(a.0[channel])) * t;
        *value = mixed.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Fraction of the unit pixel `[px, px+1)` covered by `[start, end)`.
fn span_coverage(px: f32, start: f32, end: f32) -> f32 {
    (end.min(px + 1.0) - start.max(px)).clamp(0.0, 1.0)
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, paint: &Paint) {
    let (x0, x1, y0, y1) = pixel_span(canvas, rect);
    for y in y0..y1 {
        let cov_y = span_coverage(y as f32, rect.y, rect.bottom());
        for x in x0..x1 {
            let coverage = span_coverage(x as f32, rect.x, rect.right()) * cov_y;
            let color = sample(paint, x as f32 + 0.5, y as f32 + 0.5);
            blend(canvas, x, y, color, coverage);
        }
    }
}

fn rounded_rect_coverage(rect: &Rect, radii: &[f32; 4], cx: f32, cy: f32) -> f32 {
    let [tl, tr, br, bl] = *radii;
    let corner = if cx < rect.x + tl && cy < rect.y + tl {
        Some((rect.x + tl, rect.y + tl, tl))
    } else if cx > rect.right() - tr && cy < rect.y + tr {
        Some((rect.right() - tr, rect.y + tr, tr))
    } else if cx > rect.right() - br && cy > rect.bottom() - br {
        Some((rect.right() - br, rect.bottom() - br, br))
    } else if cx < rect.x + bl && cy > rect.bottom() - bl {
        Some((rect.x + bl, rect.bottom() - bl, bl))
    } else {
        None
    };

    match corner {
        Some((ox, oy, radius)) => {
            let distance = ((cx - ox).powi(2) + (cy - oy).powi(2)).sqrt();
            (radius - distance + 0.5).clamp(0.0, 1.0)
        }
        None => 1.0,
    }
}

fn fill_rounded_rect(canvas: &mut RgbaImage, rect: &Rect, radii: &[f32; 4], paint: &Paint) {
    let (x0, x1, y0, y1) = pixel_span(canvas, rect);
    for y in y0..y1 {
        let cov_y = span_coverage(y as f32, rect.y, rect.bottom());
        for x in x0..x1 {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            let coverage = span_coverage(x as f32, rect.x, rect.right())
                * cov_y
                * rounded_rect_coverage(rect, radii, cx, cy);
            blend(canvas, x, y, sample(paint, cx, cy), coverage);
        }
    }
}

fn distance_to_center(circle: &Circle, x: i64, y: i64) -> f32 {
    let dx = x as f32 + 0.5 - circle.center.x;
    let dy = y as f32 + 0.5 - circle.center.y;
    (dx * dx + dy * dy).sqrt()
}

fn fill_circle(canvas: &mut RgbaImage, circle: &Circle, color: Rgba<u8>) {
    let (x0, x1, y0, y1) = pixel_span(canvas, &circle.bounds());
    for y in y0..y1 {
        for x in x0..x1 {
            let coverage = circle.radius - distance_to_center(circle, x, y) + 0.5;
            blend(canvas, x, y, color, coverage);
        }
    }
}

fn stroke_circle(canvas: &mut RgbaImage, circle: &Circle, width: f32, color: Rgba<u8>) {
    let outer = Circle {
        center: circle.center,
        radius: circle.radius + width / 2.0 + 1.0,
    };
    let (x0, x1, y0, y1) = pixel_span(canvas, &outer.bounds());
    for y in y0..y1 {
        for x in x0..x1 {
            let offset = (distance_to_center(circle, x, y) - circle.radius).abs();
            blend(canvas, x, y, color, width / 2.0 - offset + 0.5);
        }
    }
}

fn draw_circle_image(canvas: &mut RgbaImage, circle: &Circle, image: &Bitmap) {
    let source = image.image();
    let side = source.width().min(source.height());
    if side == 0 {
        return;
    }
    let diameter = (circle.radius * 2.0).ceil().max(1.0) as u32;
    let square = imageops::crop_imm(
        source,
        (source.width() - side) / 2,
        (source.height() - side) / 2,
        side,
        side,
    )
    .to_image();
    let scaled = imageops::resize(&square, diameter, diameter, FilterType::Triangle);

    let left = circle.center.x - circle.radius;
    let top = circle.center.y - circle.radius;
    let (x0, x1, y0, y1) = pixel_span(canvas, &circle.bounds());
    for y in y0..y1 {
        for x in x0..x1 {
            let coverage = circle.radius - distance_to_center(circle, x, y) + 0.5;
            if coverage <= 0.0 {
                continue;
            }
            let sx = ((x as f32 - left).floor().max(0.0) as u32).min(diameter - 1);
            let sy = ((y as f32 - top).floor().max(0.0) as u32).min(diameter - 1);
            blend(canvas, x, y, *scaled.get_pixel(sx, sy), coverage);
        }
    }
}

fn draw_image(canvas: &mut RgbaImage, rect: &Rect, image: &Bitmap) {
    let width = rect.w.round().max(1.0) as u32;
    let height = rect.h.round().max(1.0) as u32;
    let source = image.image();
    let scaled;
    let pixels = if source.dimensions() == (width, height) {
        source
    } else {
        scaled = imageops::resize(source, width, height, FilterType::Nearest);
        &scaled
    };

    let left = rect.x.round() as i64;
    let top = rect.y.round() as i64;
    for (sx, sy, pixel) in pixels.enumerate_pixels() {
        blend(canvas, left + i64::from(sx), top + i64::from(sy), *pixel, 1.0);
    }
}

fn distance_to_segment(px: f32, py: f32, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq > 0.0 {
        (((px - a.x) * dx + (py - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (nx, ny) = (a.x + t * dx, a.y + t * dy);
    ((px - nx).powi(2) + (py - ny).powi(2)).sqrt()
}

fn stroke_polyline(canvas: &mut RgbaImage, points: &[Point], width: f32, color: Rgba<u8>) {
    if points.len() < 2 {
        return;
    }
    let bounds = DrawCommand::Polyline {
        points: points.to_vec(),
        width: width + 2.0,
        color,
    }
    .bounds();
    let (x0, x1, y0, y1) = pixel_span(canvas, &bounds);
    for y in y0..y1 {
        for x in x0..x1 {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            let distance = points
                .windows(2)
                .map(|segment| distance_to_segment(cx, cy, segment[0], segment[1]))
                .fold(f32::INFINITY, f32::min);
            blend(canvas, x, y, color, width / 2.0 - distance + 0.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn render(commands: Vec<DrawCommand>) -> RgbaImage {
        let fonts = FontSet::empty();
        let mut scene = Scene::new(100, 100);
        scene.commands = commands;
        Rasterizer::new(&fonts).render(&scene)
    }

    fn background(color: Rgba<u8>) -> DrawCommand {
        DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            paint: Paint::Solid(color),
        }
    }

    #[test]
    fn test_solid_fill_covers_canvas() {
        let canvas = render(vec![background(RED)]);
        assert_eq!(*canvas.get_pixel(0, 0), RED);
        assert_eq!(*canvas.get_pixel(99, 99), RED);
    }

    #[test]
    fn test_vertical_gradient_runs_top_to_bottom() {
        let canvas = render(vec![DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            paint: Paint::LinearGradient {
                from: Point::new(0.0, 0.0),
                to: Point::new(0.0, 100.0),
                stops: [RED, BLUE],
            },
        }]);
        let top = canvas.get_pixel(50, 0);
        let bottom = canvas.get_pixel(50, 99);
        assert!(top.0[0] > 250 && top.0[2] < 5);
        assert!(bottom.0[2] > 250 && bottom.0[0] < 5);
        assert_eq!(canvas.get_pixel(0, 50), canvas.get_pixel(99, 50));
    }

    #[test]
    fn test_circle_fills_center_not_corners() {
        let canvas = render(vec![
            background(WHITE),
            DrawCommand::FillCircle {
                circle: Circle::new(50.0, 50.0, 30.0),
                color: RED,
            },
        ]);
        assert_eq!(*canvas.get_pixel(50, 50), RED);
        assert_eq!(*canvas.get_pixel(22, 22), WHITE);
    }

    #[test]
    fn test_translucent_fill_blends_with_background() {
        let canvas = render(vec![
            background(WHITE),
            DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 100.0, 100.0),
                paint: Paint::Solid(Rgba([0, 0, 0, 128])),
            },
        ]);
        let pixel = canvas.get_pixel(10, 10);
        assert!((120..=135).contains(&pixel.0[0]));
        assert_eq!(pixel.0[3], 255);
    }

    #[test]
    fn test_rounded_corners_stay_transparent() {
        let canvas = render(vec![DrawCommand::FillRoundedRect {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            radii: [20.0, 20.0, 0.0, 0.0],
            paint: Paint::Solid(RED),
        }]);
        assert_eq!(canvas.get_pixel(0, 0).0[3], 0);
        assert_eq!(*canvas.get_pixel(0, 99), RED);
        assert_eq!(*canvas.get_pixel(50, 50), RED);
    }

    #[test]
    fn test_circle_image_is_clipped() {
        let photo = Bitmap::new(RgbaImage::from_pixel(40, 60, BLUE));
        let canvas = render(vec![
            background(WHITE),
            DrawCommand::CircleImage {
                circle: Circle::new(50.0, 50.0, 25.0),
                image: photo,
            },
        ]);
        assert_eq!(*canvas.get_pixel(50, 50), BLUE);
        assert_eq!(*canvas.get_pixel(27, 27), WHITE);
        assert_eq!(*canvas.get_pixel(90, 50), WHITE);
    }

    #[test]
    fn test_image_is_scaled_into_rect() {
        let qr = Bitmap::new(RgbaImage::from_pixel(10, 10, BLUE));
        let canvas = render(vec![
            background(WHITE),
            DrawCommand::Image {
                rect: Rect::new(20.0, 20.0, 40.0, 40.0),
                image: qr,
            },
        ]);
        assert_eq!(*canvas.get_pixel(20, 20), BLUE);
        assert_eq!(*canvas.get_pixel(59, 59), BLUE);
        assert_eq!(*canvas.get_pixel(60, 60), WHITE);
    }

    #[test]
    fn test_polyline_strokes_both_arms() {
        let canvas = render(vec![
            background(WHITE),
            DrawCommand::Polyline {
                points: vec![
                    Point::new(10.0, 40.0),
                    Point::new(10.0, 10.0),
                    Point::new(40.0, 10.0),
                ],
                width: 3.0,
                color: RED,
            },
        ]);
        assert_eq!(*canvas.get_pixel(10, 30), RED);
        assert_eq!(*canvas.get_pixel(30, 10), RED);
        assert_eq!(*canvas.get_pixel(30, 30), WHITE);
    }

    #[test]
    fn test_text_without_fonts_leaves_canvas_untouched() {
        let canvas = render(vec![
            background(WHITE),
            DrawCommand::Text {
                text: "Hello".to_string(),
                origin: Point::new(10.0, 50.0),
                style: TextStyle {
                    size: 20.0,
                    face: crate::scene::FontFace::Bold,
                    color: RED,
                    align: TextAlign::Left,
                },
                max_width: None,
            },
        ]);
        assert!(canvas.pixels().all(|pixel| *pixel == WHITE));
    }
}
