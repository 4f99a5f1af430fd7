//! Card compositor: turns one student record into a draw-command scene.
//!
//! Composition order is fixed: background, card body and header, photo,
//! detail rows, QR code, footer, corner accents. The compositor never
//! fetches or decodes anything; the photo and QR images arrive already
//! resolved, and a missing one changes which commands are emitted.

use campuscard_student_model::StudentRecord;

use crate::layout::{CardLayout, Point, Rect, DETAIL_LABELS};
use crate::scene::{Bitmap, DrawCommand, FontFace, Paint, Scene, TextAlign, TextStyle};
use crate::theme::{CardTheme, Palette};

pub const SUBTITLE: &str = "STUDENT ID CARD";
pub const QR_LABEL: &str = "Scan for Details";

/// Horizontal padding kept between text and the card body edge.
const TEXT_PADDING: f32 = 20.0;

/// Everything printed on one card.
#[derive(Debug, Clone)]
pub struct CardContent<'a> {
    pub record: &'a StudentRecord,
    pub college_name: &'a str,
    /// Decoded student photo; `None` draws the placeholder disc.
    pub photo: Option<Bitmap>,
    /// Rasterized QR code; `None` leaves the QR region empty.
    pub qr: Option<Bitmap>,
}

/// Builds card scenes for one theme.
#[derive(Debug, Clone, Copy)]
pub struct CardComposer<'a> {
    layout: &'a CardLayout,
    palette: &'a Palette,
    validity_text: &'a str,
}

impl<'a> CardComposer<'a> {
    pub fn new(layout: &'a CardLayout, palette: &'a Palette, validity_text: &'a str) -> Self {
        Self {
            layout,
            palette,
            validity_text,
        }
    }

    pub fn for_theme(theme: CardTheme, validity_text: &'a str) -> Self {
        Self::new(theme.layout(), theme.palette(), validity_text)
    }

    pub fn layout(&self) -> &CardLayout {
        self.layout
    }

    pub fn compose(&self, content: &CardContent<'_>) -> Scene {
        let mut scene = Scene::new(self.layout.width, self.layout.height);
        self.paint_background(&mut scene);
        self.paint_header(&mut scene, content.college_name);
        self.paint_photo(&mut scene, content.photo.as_ref());
        self.paint_details(&mut scene, content.record);
        if let Some(qr) = &content.qr {
            self.paint_qr(&mut scene, qr);
        }
        self.paint_footer(&mut scene);
        self.paint_corners(&mut scene);
        scene
    }

    fn paint_background(&self, scene: &mut Scene) {
        let layout = self.layout;
        let canvas = layout.canvas();

        scene.push(DrawCommand::FillRect {
            rect: canvas,
            paint: Paint::LinearGradient {
                from: Point::new(0.0, 0.0),
                to: Point::new(0.0, canvas.h),
                stops: self.palette.background,
            },
        });

        if let Some(wash) = self.palette.background_wash {
            scene.push(DrawCommand::FillRect {
                rect: canvas,
                paint: Paint::LinearGradient {
                    from: Point::new(0.0, 0.0),
                    to: Point::new(canvas.w, canvas.h),
                    stops: wash,
                },
            });
        }

        for decoration in layout.decorations {
            scene.push(DrawCommand::FillCircle {
                circle: *decoration,
                color: self.palette.decoration,
            });
        }
    }

    fn paint_header(&self, scene: &mut Scene, college_name: &str) {
        let layout = self.layout;
        let body = layout.card_body();
        let radius = layout.card_radius;

        scene.push(DrawCommand::FillRoundedRect {
            rect: body,
            radii: [radius; 4],
            paint: Paint::Solid(self.palette.card),
        });

        let band = layout.header_band();
        scene.push(DrawCommand::FillRoundedRect {
            rect: band,
            radii: [radius, radius, 0.0, 0.0],
            paint: Paint::LinearGradient {
                from: Point::new(band.x, band.y),
                to: Point::new(band.right(), band.bottom()),
                stops: self.palette.header,
            },
        });

        scene.push(DrawCommand::Text {
            text: college_name.to_uppercase(),
            origin: Point::new(layout.center_x(), layout.title_baseline),
            style: TextStyle {
                size: layout.title_size,
                face: FontFace::Bold,
                color: self.palette.title,
                align: TextAlign::Center,
            },
            max_width: Some(band.w - 2.0 * TEXT_PADDING),
        });

        scene.push(DrawCommand::Text {
            text: SUBTITLE.to_string(),
            origin: Point::new(layout.center_x(), layout.subtitle_baseline),
            style: TextStyle {
                size: layout.subtitle_size,
                face: FontFace::Bold,
                color: self.palette.subtitle,
                align: TextAlign::Center,
            },
            max_width: None,
        });
    }

    fn paint_photo(&self, scene: &mut Scene, photo: Option<&Bitmap>) {
        let layout = self.layout;
        let circle = layout.photo;

        let Some(photo) = photo else {
            scene.push(DrawCommand::FillCircle {
                circle,
                color: self.palette.placeholder,
            });
            return;
        };

        if layout.halo_width > 0.0 && self.palette.halo.0[3] > 0 {
            let mut halo = circle;
            halo.radius += layout.photo_border / 2.0 + layout.halo_width / 2.0;
            scene.push(DrawCommand::StrokeCircle {
                circle: halo,
                width: layout.halo_width,
                color: self.palette.halo,
            });
        }

        scene.push(DrawCommand::CircleImage {
            circle,
            image: photo.clone(),
        });
        scene.push(DrawCommand::StrokeCircle {
            circle,
            width: layout.photo_border,
            color: self.palette.accent,
        });
    }

    fn paint_details(&self, scene: &mut Scene, record: &StudentRecord) {
        let layout = self.layout;
        let values = [
            record.name.clone(),
            record.admission_no.clone(),
            record.class_section(),
            record.phone.clone(),
            record.father_name.clone(),
            record.dob_display(),
        ];
        let value_width = layout.card_body().right() - layout.value_x - TEXT_PADDING;

        for (index, (label, value)) in DETAIL_LABELS.iter().zip(values).enumerate() {
            let baseline = layout.row_baseline(index);

            if let (Some(rect), Some(card)) = (layout.row_card_rect(index), layout.row_card) {
                scene.push(DrawCommand::FillRoundedRect {
                    rect,
                    radii: [card.radius; 4],
                    paint: Paint::Solid(self.palette.row_card),
                });
            }

            scene.push(DrawCommand::Text {
                text: (*label).to_string(),
                origin: Point::new(layout.label_x, baseline),
                style: TextStyle {
                    size: layout.text_size,
                    face: FontFace::Bold,
                    color: self.palette.label,
                    align: TextAlign::Left,
                },
                max_width: Some(layout.value_x - layout.label_x - 8.0),
            });
            scene.push(DrawCommand::Text {
                text: value,
                origin: Point::new(layout.value_x, baseline),
                style: TextStyle {
                    size: layout.text_size,
                    face: FontFace::Regular,
                    color: self.palette.value,
                    align: TextAlign::Left,
                },
                max_width: Some(value_width),
            });
        }
    }

    fn paint_qr(&self, scene: &mut Scene, qr: &Bitmap) {
        let layout = self.layout;
        let rect: Rect = layout.qr_box;

        scene.push(DrawCommand::Image {
            rect,
            image: qr.clone(),
        });
        scene.push(DrawCommand::Text {
            text: QR_LABEL.to_string(),
            origin: Point::new(rect.x + rect.w / 2.0, layout.qr_label_baseline()),
            style: TextStyle {
                size: layout.qr_label_size,
                face: FontFace::Regular,
                color: self.palette.muted,
                align: TextAlign::Center,
            },
            max_width: None,
        });
    }

    fn paint_footer(&self, scene: &mut Scene) {
        let layout = self.layout;
        scene.push(DrawCommand::Text {
            text: self.validity_text.to_string(),
            origin: Point::new(layout.center_x(), layout.footer_baseline()),
            style: TextStyle {
                size: layout.footer_size,
                face: FontFace::Italic,
                color: self.palette.footer,
                align: TextAlign::Center,
            },
            max_width: Some(2.0 * (layout.qr_box.x - layout.center_x() - TEXT_PADDING)),
        });
    }

    fn paint_corners(&self, scene: &mut Scene) {
        for corner in self.layout.corner_accents() {
            scene.push(DrawCommand::Polyline {
                points: corner.to_vec(),
                width: self.layout.corner_width,
                color: self.palette.accent,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campuscard_student_model::TenantId;
    use chrono::NaiveDate;
    use image::{Rgba, RgbaImage};

    fn record() -> StudentRecord {
        StudentRecord {
            name: "Asha Rao".to_string(),
            admission_no: "A100".to_string(),
            class_name: "10".to_string(),
            section: "B".to_string(),
            aadhar: String::new(),
            phone: "9876543210".to_string(),
            father_name: "Suresh Rao".to_string(),
            mother_name: "Meena Rao".to_string(),
            dob: NaiveDate::from_ymd_opt(2008, 5, 1).unwrap(),
            address: String::new(),
            email: "asha@example.com".to_string(),
            photo_reference: None,
            college_id: TenantId::from("greenfield"),
            college_name: "Greenfield College".to_string(),
            link_id: String::new(),
            created_at: None,
        }
    }

    fn bitmap(size: u32) -> Bitmap {
        Bitmap::new(RgbaImage::from_pixel(size, size, Rgba([10, 20, 30, 255])))
    }

    fn compose(theme: CardTheme, photo: Option<Bitmap>, qr: Option<Bitmap>) -> Scene {
        let record = record();
        CardComposer::for_theme(theme, "Valid for Academic Year 2024-2025").compose(&CardContent {
            record: &record,
            college_name: "Greenfield College",
            photo,
            qr,
        })
    }

    #[test]
    fn test_classic_scene_text_order() {
        let scene = compose(CardTheme::Classic, Some(bitmap(300)), Some(bitmap(120)));
        assert_eq!(
            scene.texts(),
            vec![
                "GREENFIELD COLLEGE",
                "STUDENT ID CARD",
                "Name:",
                "Asha Rao",
                "Admission No:",
                "A100",
                "Class:",
                "10 - B",
                "Phone:",
                "9876543210",
                "Father:",
                "Suresh Rao",
                "DOB:",
                "5/1/2008",
                "Scan for Details",
                "Valid for Academic Year 2024-2025",
            ]
        );
    }

    #[test]
    fn test_footer_stays_left_of_qr_column() {
        for theme in CardTheme::ALL {
            let layout = theme.layout();
            let scene = compose(theme, None, Some(bitmap(120)));
            let (origin, max_width) = scene
                .commands
                .iter()
                .find_map(|command| match command {
                    DrawCommand::Text {
                        text,
                        origin,
                        max_width,
                        ..
                    } if text.starts_with("Valid for") => Some((*origin, *max_width)),
                    _ => None,
                })
                .unwrap();
            let half = max_width.unwrap() / 2.0;
            assert!(origin.x + half <= layout.qr_box.x - TEXT_PADDING + 0.01, "{theme}");
            assert!(origin.x - half >= 0.0, "{theme}");
        }
    }

    #[test]
    fn test_rows_advance_by_row_pitch() {
        let scene = compose(CardTheme::Classic, None, None);
        let baselines: Vec<f32> = scene
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { origin, style, .. }
                    if style.face == FontFace::Bold && origin.x == 300.0 =>
                {
                    Some(origin.y)
                }
                _ => None,
            })
            .collect();
        assert_eq!(baselines, vec![200.0, 245.0, 290.0, 335.0, 380.0, 425.0]);
    }

    #[test]
    fn test_missing_photo_draws_placeholder_disc() {
        let scene = compose(CardTheme::Classic, None, Some(bitmap(120)));
        assert!(scene.commands.contains(&DrawCommand::FillCircle {
            circle: CardLayout::CLASSIC.photo,
            color: Palette::CLASSIC.placeholder,
        }));
        assert!(!scene
            .commands
            .iter()
            .any(|command| matches!(command, DrawCommand::CircleImage { .. })));
    }

    #[test]
    fn test_photo_is_clipped_and_bordered() {
        let scene = compose(CardTheme::Classic, Some(bitmap(300)), None);
        let index = scene
            .commands
            .iter()
            .position(|command| matches!(command, DrawCommand::CircleImage { .. }))
            .unwrap();
        assert_eq!(
            scene.commands[index + 1],
            DrawCommand::StrokeCircle {
                circle: CardLayout::CLASSIC.photo,
                width: 4.0,
                color: Palette::CLASSIC.accent,
            }
        );
    }

    #[test]
    fn test_missing_qr_omits_box_and_label() {
        let scene = compose(CardTheme::Classic, Some(bitmap(300)), None);
        assert!(!scene.texts().contains(&QR_LABEL));
        assert!(!scene
            .commands
            .iter()
            .any(|command| matches!(command, DrawCommand::Image { .. })));
    }

    #[test]
    fn test_premium_adds_row_cards_halo_and_decorations() {
        let scene = compose(CardTheme::Premium, Some(bitmap(300)), Some(bitmap(126)));
        let rounded = scene
            .commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillRoundedRect { .. }))
            .count();
        // card body + header band + six row cards
        assert_eq!(rounded, 8);

        let strokes = scene
            .commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::StrokeCircle { .. }))
            .count();
        assert_eq!(strokes, 2);

        let circles = scene
            .commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillCircle { .. }))
            .count();
        assert_eq!(circles, CardLayout::PREMIUM.decorations.len());
    }

    #[test]
    fn test_every_command_stays_on_canvas() {
        for theme in CardTheme::ALL {
            for (photo, qr) in [
                (Some(bitmap(300)), Some(bitmap(120))),
                (None, None),
            ] {
                let scene = compose(theme, photo, qr);
                assert!(scene.out_of_bounds().is_empty(), "{theme}: {:?}", scene.out_of_bounds());
            }
        }
    }

    #[test]
    fn test_composition_is_deterministic() {
        let first = compose(CardTheme::Premium, Some(bitmap(300)), Some(bitmap(126)));
        let second = compose(CardTheme::Premium, Some(bitmap(300)), Some(bitmap(126)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_corner_accents_are_last() {
        let scene = compose(CardTheme::Classic, None, None);
        let tail = &scene.commands[scene.commands.len() - 4..];
        assert!(tail
            .iter()
            .all(|command| matches!(command, DrawCommand::Polyline { points, .. } if points.len() == 3)));
    }
}
