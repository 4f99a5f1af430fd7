//! Student photo retrieval and decoding.

use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_student_model::StudentRecord;
use image::RgbaImage;

/// Resolves a photo reference to raw image bytes.
///
/// Any transport or lookup failure is reported as an error for that one
/// photo; callers decide whether it degrades a card or skips an entry.
pub trait PhotoFetcher: Send + Sync {
    fn fetch(&self, uri: &str) -> CampusCardResult<Vec<u8>>;
}

impl<F> PhotoFetcher for F
where
    F: Fn(&str) -> CampusCardResult<Vec<u8>> + Send + Sync,
{
    fn fetch(&self, uri: &str) -> CampusCardResult<Vec<u8>> {
        self(uri)
    }
}

/// Decode any supported raster format (PNG, JPEG, WebP).
pub fn decode_photo(bytes: &[u8]) -> CampusCardResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|e| CampusCardError::render(format!("undecodable photo: {e}")))
}

/// Fetch and decode a record's photo.
pub fn load_photo(fetcher: &dyn PhotoFetcher, record: &StudentRecord) -> CampusCardResult<RgbaImage> {
    let uri = record
        .photo_uri()
        .ok_or_else(|| CampusCardError::fetch("", "record has no photo reference"))?;
    let bytes = fetcher.fetch(uri)?;
    decode_photo(&bytes)
}
