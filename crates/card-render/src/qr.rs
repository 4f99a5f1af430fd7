//! QR payload encoding.
//!
//! Each card carries a compact JSON identity payload:
//! `{"name":..,"admissionNo":..,"college":..,"email":..}`.
//! The code is rasterized directly at the card's QR box size with
//! whole-pixel modules, so the compositor never has to rescale it.

use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_student_model::StudentRecord;
use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};

/// Modules of light border required around the symbol.
const QUIET_ZONE: u32 = 4;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Identity fields embedded in a card's QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub name: String,
    pub admission_no: String,
    pub college: String,
    pub email: String,
}

impl QrPayload {
    pub fn for_record(record: &StudentRecord, college_name: &str) -> Self {
        Self {
            name: record.name.clone(),
            admission_no: record.admission_no.clone(),
            college: college_name.to_string(),
            email: record.email.clone(),
        }
    }

    pub fn to_json(&self) -> CampusCardResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encode `payload` as a `size`×`size` QR image.
///
/// Fails when the payload exceeds QR capacity or the symbol cannot fit
/// `size` pixels with at least one pixel per module.
pub fn encode_qr(payload: &QrPayload, size: u32) -> CampusCardResult<RgbaImage> {
    let data = payload.to_json()?;
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| CampusCardError::qr(format!("cannot encode payload: {e}")))?;
    rasterize(&code, size)
}

fn rasterize(code: &QrCode, size: u32) -> CampusCardResult<RgbaImage> {
    let modules = code.width() as u32;
    let module_px = size / (modules + 2 * QUIET_ZONE);
    if module_px == 0 {
        return Err(CampusCardError::qr(format!(
            "{modules}x{modules} symbol does not fit in {size}px"
        )));
    }

    let offset = (size - modules * module_px) / 2;
    let mut image = RgbaImage::from_pixel(size, size, LIGHT);
    for (index, color) in code.to_colors().iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = index as u32 % modules;
        let my = index as u32 / modules;
        for dy in 0..module_px {
            for dx in 0..module_px {
                image.put_pixel(
                    offset + mx * module_px + dx,
                    offset + my * module_px + dy,
                    DARK,
                );
            }
        }
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> QrPayload {
        QrPayload {
            name: "Asha Rao".to_string(),
            admission_no: "A100".to_string(),
            college: "Greenfield College".to_string(),
            email: "asha@example.com".to_string(),
        }
    }

    fn decode(image: &RgbaImage) -> String {
        let luma = image::DynamicImage::ImageRgba8(image.clone()).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            luma.width() as usize,
            luma.height() as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
        let (_meta, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn test_payload_json_is_compact_and_ordered() {
        assert_eq!(
            payload().to_json().unwrap(),
            r#"{"name":"Asha Rao","admissionNo":"A100","college":"Greenfield College","email":"asha@example.com"}"#
        );
    }

    #[test]
    fn test_round_trip_through_standard_reader() {
        let original = payload();
        let image = encode_qr(&original, 120).unwrap();
        assert_eq!(image.dimensions(), (120, 120));

        let decoded: QrPayload = serde_json::from_str(&decode(&image)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_round_trip_preserves_non_ascii_names() {
        let mut original = payload();
        original.name = "Ananya Iyer-Müller".to_string();
        let image = encode_qr(&original, 126).unwrap();
        let decoded: QrPayload = serde_json::from_str(&decode(&image)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode_qr(&payload(), 120).unwrap(), encode_qr(&payload(), 120).unwrap());
    }

    #[test]
    fn test_oversized_payload_fails() {
        let mut original = payload();
        original.name = "x".repeat(3000);
        assert!(matches!(
            encode_qr(&original, 120),
            Err(CampusCardError::Qr { .. })
        ));
    }

    #[test]
    fn test_box_too_small_fails() {
        assert!(matches!(encode_qr(&payload(), 20), Err(CampusCardError::Qr { .. })));
    }
}
