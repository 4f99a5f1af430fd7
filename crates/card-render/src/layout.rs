//! Card geometry.
//!
//! Every pixel offset used by the compositor lives in a [`CardLayout`].
//! Coordinates are canvas pixels with the origin at the top-left corner;
//! text positions are baselines, as in a 2D canvas API.

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Whether `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A circle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

impl Circle {
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// Translucent backing drawn behind each detail row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowCard {
    /// Distance the card extends left of the label column.
    pub inset_x: f32,
    /// Distance from the card top to the row baseline.
    pub ascent: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

/// Fixed geometry of one card variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub width: u32,
    pub height: u32,

    /// Inset of the card body from the canvas edge.
    pub margin: f32,
    pub card_radius: f32,
    pub header_height: f32,

    pub title_baseline: f32,
    pub title_size: f32,
    pub subtitle_baseline: f32,
    pub subtitle_size: f32,

    pub photo: Circle,
    pub photo_border: f32,
    /// Width of the translucent ring outside the border (0 disables).
    pub halo_width: f32,

    pub label_x: f32,
    pub value_x: f32,
    pub first_row_baseline: f32,
    pub row_pitch: f32,
    pub text_size: f32,
    pub row_card: Option<RowCard>,

    pub qr_box: Rect,
    pub qr_label_gap: f32,
    pub qr_label_size: f32,

    /// Distance of the footer baseline from the bottom edge.
    pub footer_offset: f32,
    pub footer_size: f32,

    /// Distance of each corner accent's vertex from the canvas edges.
    pub corner_inset: f32,
    pub corner_arm: f32,
    pub corner_width: f32,

    pub decorations: &'static [Circle],
}

/// Labels of the detail rows, in print order.
pub const DETAIL_LABELS: [&str; 6] = ["Name:", "Admission No:", "Class:", "Phone:", "Father:", "DOB:"];

/// Approximate ascent/descent of a line of text relative to its size.
const ASCENT_RATIO: f32 = 0.8;
const DESCENT_RATIO: f32 = 0.25;

impl CardLayout {
    /// Standard card, 1012×638.
    pub const CLASSIC: CardLayout = CardLayout {
        width: 1012,
        height: 638,
        margin: 40.0,
        card_radius: 20.0,
        header_height: 80.0,
        title_baseline: 90.0,
        title_size: 32.0,
        subtitle_baseline: 150.0,
        subtitle_size: 20.0,
        photo: Circle::new(170.0, 270.0, 90.0),
        photo_border: 4.0,
        halo_width: 0.0,
        label_x: 300.0,
        value_x: 480.0,
        first_row_baseline: 200.0,
        row_pitch: 45.0,
        text_size: 20.0,
        row_card: None,
        qr_box: Rect::new(812.0, 458.0, 120.0, 120.0),
        qr_label_gap: 20.0,
        qr_label_size: 14.0,
        footer_offset: 30.0,
        footer_size: 16.0,
        corner_inset: 60.0,
        corner_arm: 20.0,
        corner_width: 3.0,
        decorations: &[],
    };

    /// Premium card, 1080×680.
    pub const PREMIUM: CardLayout = CardLayout {
        width: 1080,
        height: 680,
        margin: 40.0,
        card_radius: 24.0,
        header_height: 90.0,
        title_baseline: 97.0,
        title_size: 34.0,
        subtitle_baseline: 168.0,
        subtitle_size: 20.0,
        photo: Circle::new(195.0, 310.0, 100.0),
        photo_border: 5.0,
        halo_width: 12.0,
        label_x: 340.0,
        value_x: 520.0,
        first_row_baseline: 222.0,
        row_pitch: 48.0,
        text_size: 20.0,
        row_card: Some(RowCard {
            inset_x: 14.0,
            ascent: 28.0,
            width: 560.0,
            height: 40.0,
            radius: 10.0,
        }),
        qr_box: Rect::new(870.0, 484.0, 126.0, 126.0),
        qr_label_gap: 20.0,
        qr_label_size: 14.0,
        footer_offset: 26.0,
        footer_size: 16.0,
        corner_inset: 60.0,
        corner_arm: 22.0,
        corner_width: 3.0,
        decorations: &[
            Circle::new(950.0, 150.0, 110.0),
            Circle::new(140.0, 580.0, 90.0),
            Circle::new(640.0, 620.0, 50.0),
        ],
    };

    pub fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// The card body drawn over the background.
    pub fn card_body(&self) -> Rect {
        Rect::new(
            self.margin,
            self.margin,
            self.width as f32 - 2.0 * self.margin,
            self.height as f32 - 2.0 * self.margin,
        )
    }

    pub fn header_band(&self) -> Rect {
        let body = self.card_body();
        Rect::new(body.x, body.y, body.w, self.header_height)
    }

    pub fn center_x(&self) -> f32 {
        self.width as f32 / 2.0
    }

    /// Outermost extent of the photo including border and halo.
    pub fn photo_extent(&self) -> Circle {
        Circle {
            center: self.photo.center,
            radius: self.photo.radius + self.photo_border / 2.0 + self.halo_width,
        }
    }

    pub fn row_baseline(&self, index: usize) -> f32 {
        self.first_row_baseline + self.row_pitch * index as f32
    }

    /// Backing rectangle of a detail row, when the layout has one.
    pub fn row_card_rect(&self, index: usize) -> Option<Rect> {
        self.row_card.map(|card| {
            Rect::new(
                self.label_x - card.inset_x,
                self.row_baseline(index) - card.ascent,
                card.width,
                card.height,
            )
        })
    }

    /// Vertical band occupied by all detail rows.
    pub fn details_extent(&self) -> Rect {
        let last = DETAIL_LABELS.len() - 1;
        let top = self.row_baseline(0) - self.text_size * ASCENT_RATIO;
        let bottom = self.row_baseline(last) + self.text_size * DESCENT_RATIO;
        let mut extent = Rect::new(
            self.label_x,
            top,
            self.card_body().right() - self.label_x,
            bottom - top,
        );
        if let (Some(first), Some(final_row)) = (self.row_card_rect(0), self.row_card_rect(last)) {
            let top = extent.y.min(first.y);
            let bottom = extent.bottom().max(final_row.bottom());
            extent.x = extent.x.min(first.x);
            extent.y = top;
            extent.h = bottom - top;
        }
        extent
    }

    pub fn qr_label_baseline(&self) -> f32 {
        self.qr_box.bottom() + self.qr_label_gap
    }

    pub fn footer_baseline(&self) -> f32 {
        self.height as f32 - self.footer_offset
    }

    /// The four L-shaped corner accents, each as three points
    /// (arm end, vertex, arm end).
    pub fn corner_accents(&self) -> [[Point; 3]; 4] {
        let (w, h) = (self.width as f32, self.height as f32);
        let (i, a) = (self.corner_inset, self.corner_arm);
        [
            [Point::new(i, i + a), Point::new(i, i), Point::new(i + a, i)],
            [Point::new(w - i - a, i), Point::new(w - i, i), Point::new(w - i, i + a)],
            [Point::new(i, h - i - a), Point::new(i, h - i), Point::new(i + a, h - i)],
            [
                Point::new(w - i - a, h - i),
                Point::new(w - i, h - i),
                Point::new(w - i, h - i - a),
            ],
        ]
    }

    /// Check that every element stays on the canvas and that the photo,
    /// detail rows and QR box do not overlap. Returns one message per
    /// violation.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];
        let canvas = self.canvas();
        let body = self.card_body();

        let photo = self.photo_extent().bounds();
        if !body.contains_rect(&photo) {
            issues.push("photo extends outside the card body".to_string());
        }
        if photo.y < self.header_band().bottom() {
            issues.push("photo overlaps the header band".to_string());
        }

        let details = self.details_extent();
        if photo.right() >= details.x {
            issues.push("photo overlaps the detail column".to_string());
        }
        if details.y <= self.subtitle_baseline {
            issues.push("detail rows start above the subtitle".to_string());
        }
        if details.intersects(&self.qr_box) {
            issues.push("detail rows overlap the QR box".to_string());
        }
        if self.value_x <= self.label_x || self.value_x >= body.right() {
            issues.push("value column is outside the detail column".to_string());
        }

        if !body.contains_rect(&self.qr_box) {
            issues.push("QR box extends outside the card body".to_string());
        }
        if self.qr_label_baseline() > body.bottom() {
            issues.push("QR label falls below the card body".to_string());
        }

        let footer = self.footer_baseline();
        if footer <= self.qr_box.y || footer + self.footer_size * DESCENT_RATIO > canvas.bottom()
        {
            issues.push("footer baseline is outside its band".to_string());
        }

        for corner in self.corner_accents() {
            for point in corner {
                if point.x < body.x || point.x > body.right() || point.y < body.y
                    || point.y > body.bottom()
                {
                    issues.push("corner accent extends outside the card body".to_string());
                }
            }
        }

        for decoration in self.decorations {
            if !canvas.contains_rect(&decoration.bounds()) {
                issues.push("decoration extends outside the canvas".to_string());
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_layouts_satisfy_the_contract() {
        for layout in [&CardLayout::CLASSIC, &CardLayout::PREMIUM] {
            let issues = layout.validate();
            assert!(issues.is_empty(), "{}x{}: {issues:?}", layout.width, layout.height);
        }
    }

    #[test]
    fn test_classic_geometry() {
        let layout = CardLayout::CLASSIC;
        assert_eq!((layout.width, layout.height), (1012, 638));
        assert_eq!(layout.row_baseline(5), 425.0);
        assert_eq!(layout.qr_label_baseline(), 598.0);
        assert_eq!(layout.footer_baseline(), 608.0);
        assert_eq!(layout.corner_accents()[0][1], Point::new(60.0, 60.0));
        assert_eq!(layout.corner_accents()[3][1], Point::new(952.0, 578.0));
    }

    #[test]
    fn test_validate_reports_overlapping_qr_box() {
        let mut layout = CardLayout::CLASSIC;
        layout.qr_box = Rect::new(700.0, 380.0, 120.0, 120.0);
        let issues = layout.validate();
        assert!(issues.iter().any(|i| i.contains("QR box")));
    }

    #[test]
    fn test_row_cards_only_in_premium() {
        assert!(CardLayout::CLASSIC.row_card_rect(0).is_none());
        let card = CardLayout::PREMIUM.row_card_rect(0).unwrap();
        assert_eq!(card.x, 326.0);
        assert_eq!(card.y, 194.0);
    }
}
