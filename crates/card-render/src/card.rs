//! Single-card rendering: fetch photo, encode QR, compose, rasterize, encode PNG.

use std::io::Cursor;
use std::sync::Arc;

use campuscard_common::config::RenderConfig;
use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_student_model::StudentRecord;
use image::{ImageFormat, RgbaImage};

use crate::compositor::{CardComposer, CardContent};
use crate::fonts::FontSet;
use crate::photo::{load_photo, PhotoFetcher};
use crate::qr::{encode_qr, QrPayload};
use crate::raster::Rasterizer;
use crate::scene::{Bitmap, Scene};
use crate::theme::CardTheme;

/// Settings shared by every card of an export.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub validity_text: String,
    pub fonts: Arc<FontSet>,
}

impl RenderOptions {
    /// Load fonts as configured. Font discovery touches the filesystem,
    /// so build this once and share it.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            validity_text: config.validity_text.clone(),
            fonts: Arc::new(FontSet::load(&config.fonts)),
        }
    }

    pub fn without_fonts(validity_text: impl Into<String>) -> Self {
        Self {
            validity_text: validity_text.into(),
            fonts: Arc::new(FontSet::empty()),
        }
    }
}

/// A part of the card that could not be drawn as intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Photo missing, unreachable or undecodable; placeholder disc drawn.
    PhotoPlaceholder,
    /// QR encoding failed; QR box and label left out.
    QrOmitted,
}

/// One rendered card, ready to be appended to an archive.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub file_name: String,
    pub png: Vec<u8>,
    pub degradations: Vec<Degradation>,
}

impl RenderedCard {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// A composed card before rasterization.
#[derive(Debug, Clone)]
pub struct ComposedCard {
    pub scene: Scene,
    pub degradations: Vec<Degradation>,
}

/// Resolve the photo and QR for a record and build its scene.
///
/// Photo and QR failures are logged and recorded as degradations; only an
/// invalid record is an error.
pub fn compose_card(
    record: &StudentRecord,
    college_name: &str,
    theme: CardTheme,
    fetcher: &dyn PhotoFetcher,
    options: &RenderOptions,
) -> CampusCardResult<ComposedCard> {
    record.validate().map_err(|e| {
        CampusCardError::invalid_record(format!("admission no `{}`: {e}", record.admission_no))
    })?;

    let mut degradations = Vec::new();

    let photo = match load_photo(fetcher, record) {
        Ok(image) => Some(Bitmap::new(image)),
        Err(e) => {
            tracing::warn!(
                admission_no = %record.admission_no,
                "Photo unavailable, drawing placeholder: {e}"
            );
            degradations.push(Degradation::PhotoPlaceholder);
            None
        }
    };

    let qr_size = theme.layout().qr_box.w.round() as u32;
    let payload = QrPayload::for_record(record, college_name);
    let qr = match encode_qr(&payload, qr_size) {
        Ok(image) => Some(Bitmap::new(image)),
        Err(e) => {
            tracing::warn!(admission_no = %record.admission_no, "QR omitted: {e}");
            degradations.push(Degradation::QrOmitted);
            None
        }
    };

    let scene = CardComposer::for_theme(theme, &options.validity_text).compose(&CardContent {
        record,
        college_name,
        photo,
        qr,
    });

    Ok(ComposedCard {
        scene,
        degradations,
    })
}

/// Render one ID card to PNG.
pub fn render_card(
    record: &StudentRecord,
    college_name: &str,
    theme: CardTheme,
    fetcher: &dyn PhotoFetcher,
    options: &RenderOptions,
) -> CampusCardResult<RenderedCard> {
    let composed = compose_card(record, college_name, theme, fetcher, options)?;
    let image = Rasterizer::new(&options.fonts).render(&composed.scene);
    let png = encode_png(&image)?;

    tracing::debug!(
        admission_no = %record.admission_no,
        bytes = png.len(),
        degraded = !composed.degradations.is_empty(),
        "Rendered ID card"
    );

    Ok(RenderedCard {
        file_name: record.card_entry_name(),
        png,
        degradations: composed.degradations,
    })
}

pub fn encode_png(image: &RgbaImage) -> CampusCardResult<Vec<u8>> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CampusCardError::render(format!("PNG encoding failed: {e}")))?;
    Ok(png)
}
