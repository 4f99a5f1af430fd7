//! Item producers for the two archive exports.

use campuscard_card_render::{render_card, CardTheme, PhotoFetcher, RenderOptions};
use campuscard_common::error::CampusCardError;
use campuscard_student_model::StudentRecord;
use image::ImageFormat;

use crate::batch::{ArchiveEntry, ItemOutcome, ItemProducer};

/// Renders one ID card PNG per record.
pub struct IdCardProducer<'a> {
    theme: CardTheme,
    fetcher: &'a dyn PhotoFetcher,
    options: &'a RenderOptions,
}

impl<'a> IdCardProducer<'a> {
    pub fn new(theme: CardTheme, fetcher: &'a dyn PhotoFetcher, options: &'a RenderOptions) -> Self {
        Self {
            theme,
            fetcher,
            options,
        }
    }
}

impl ItemProducer for IdCardProducer<'_> {
    fn label(&self) -> &'static str {
        "id-cards"
    }

    fn produce(&self, record: &StudentRecord, college_name: &str) -> ItemOutcome {
        match render_card(record, college_name, self.theme, self.fetcher, self.options) {
            Ok(card) => {
                let degraded = card.is_degraded();
                let entry = ArchiveEntry {
                    name: card.file_name,
                    bytes: card.png,
                };
                if degraded {
                    ItemOutcome::Degraded(entry)
                } else {
                    ItemOutcome::Ready(entry)
                }
            }
            Err(err) => ItemOutcome::Failed(err),
        }
    }
}

/// Copies each student's original photo bytes into the archive.
pub struct PhotoPassthroughProducer<'a> {
    fetcher: &'a dyn PhotoFetcher,
}

impl<'a> PhotoPassthroughProducer<'a> {
    pub fn new(fetcher: &'a dyn PhotoFetcher) -> Self {
        Self { fetcher }
    }
}

impl ItemProducer for PhotoPassthroughProducer<'_> {
    fn label(&self) -> &'static str {
        "images"
    }

    fn produce(&self, record: &StudentRecord, _college_name: &str) -> ItemOutcome {
        let Some(uri) = record.photo_uri() else {
            return ItemOutcome::Skipped {
                reason: "no photo reference".to_string(),
            };
        };
        let bytes = match self.fetcher.fetch(uri) {
            Ok(bytes) => bytes,
            Err(err) => return ItemOutcome::Failed(err),
        };
        match sniff_extension(&bytes) {
            Some(extension) => ItemOutcome::Ready(ArchiveEntry {
                name: record.photo_entry_name(extension),
                bytes,
            }),
            None => ItemOutcome::Failed(CampusCardError::fetch(uri, "not a recognized image format")),
        }
    }
}

/// File extension for raw image bytes, from their magic number. `None`
/// when the bytes are not an image.
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| match format {
            ImageFormat::Jpeg => Some("jpg"),
            other => other.extensions_str().first().copied(),
        })
}
