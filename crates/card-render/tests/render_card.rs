use std::io::Cursor;

use campuscard_card_render::card::encode_png;
use campuscard_card_render::qr::QrPayload;
use campuscard_card_render::theme::{CardTheme, Palette};
use campuscard_card_render::{render_card, Degradation, RenderOptions};
use campuscard_common::error::CampusCardError;
use campuscard_student_model::{StudentRecord, TenantId};
use chrono::NaiveDate;
use image::{Rgba, RgbaImage};

fn student() -> StudentRecord {
    StudentRecord {
        name: "Asha Rao".to_string(),
        admission_no: "A100".to_string(),
        class_name: "10".to_string(),
        section: "B".to_string(),
        aadhar: String::new(),
        phone: "9876543210".to_string(),
        father_name: "Suresh Rao".to_string(),
        mother_name: String::new(),
        dob: NaiveDate::from_ymd_opt(2008, 5, 1).unwrap(),
        address: String::new(),
        email: "asha@example.com".to_string(),
        photo_reference: Some("mem://asha.png".to_string()),
        college_id: TenantId::from("greenfield"),
        college_name: "Greenfield College".to_string(),
        link_id: String::new(),
        created_at: None,
    }
}

fn red_photo(_uri: &str) -> Result<Vec<u8>, CampusCardError> {
    encode_png(&RgbaImage::from_pixel(64, 64, Rgba([220, 20, 20, 255])))
}

fn unreachable_photo(uri: &str) -> Result<Vec<u8>, CampusCardError> {
    Err(CampusCardError::fetch(uri, "connection refused"))
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

fn options() -> RenderOptions {
    RenderOptions::without_fonts("Valid for Academic Year 2024-2025")
}

#[test]
fn test_classic_card_has_fixed_dimensions_and_entry_name() {
    let card = render_card(
        &student(),
        "Greenfield College",
        CardTheme::Classic,
        &red_photo,
        &options(),
    )
    .unwrap();

    assert_eq!(card.file_name, "A100_Asha_Rao_ID_Card.png");
    assert!(!card.is_degraded());
    assert_eq!(decode(&card.png).dimensions(), (1012, 638));
}

#[test]
fn test_premium_card_dimensions() {
    let card = render_card(
        &student(),
        "Greenfield College",
        CardTheme::Premium,
        &red_photo,
        &options(),
    )
    .unwrap();
    assert_eq!(decode(&card.png).dimensions(), (1080, 680));
}

#[test]
fn test_photo_is_clipped_into_portrait_circle() {
    let card = render_card(
        &student(),
        "Greenfield College",
        CardTheme::Classic,
        &red_photo,
        &options(),
    )
    .unwrap();
    let image = decode(&card.png);
    assert_eq!(*image.get_pixel(170, 270), Rgba([220, 20, 20, 255]));
}

#[test]
fn test_unreachable_photo_draws_placeholder() {
    let card = render_card(
        &student(),
        "Greenfield College",
        CardTheme::Classic,
        &unreachable_photo,
        &options(),
    )
    .unwrap();

    assert_eq!(card.degradations, vec![Degradation::PhotoPlaceholder]);
    let image = decode(&card.png);
    assert_eq!(*image.get_pixel(170, 270), Palette::CLASSIC.placeholder);
}

#[test]
fn test_missing_photo_reference_draws_placeholder() {
    let mut record = student();
    record.photo_reference = None;
    let card = render_card(
        &record,
        "Greenfield College",
        CardTheme::Premium,
        &red_photo,
        &options(),
    )
    .unwrap();
    assert_eq!(card.degradations, vec![Degradation::PhotoPlaceholder]);
}

#[test]
fn test_card_qr_decodes_to_identity_payload() {
    let card = render_card(
        &student(),
        "Greenfield College",
        CardTheme::Classic,
        &red_photo,
        &options(),
    )
    .unwrap();
    let image = decode(&card.png);
    let qr = image::imageops::crop_imm(&image, 812, 458, 120, 120).to_image();
    let luma = image::DynamicImage::ImageRgba8(qr).to_luma8();

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        luma.width() as usize,
        luma.height() as usize,
        |x, y| luma.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1);
    let (_meta, content) = grids[0].decode().unwrap();
    let payload: QrPayload = serde_json::from_str(&content).unwrap();
    assert_eq!(payload.admission_no, "A100");
    assert_eq!(payload.college, "Greenfield College");
}

#[test]
fn test_oversized_identity_omits_qr_but_still_renders() {
    let mut record = student();
    record.email = "a".repeat(3000);
    let card = render_card(
        &record,
        "Greenfield College",
        CardTheme::Classic,
        &red_photo,
        &options(),
    )
    .unwrap();
    assert_eq!(card.degradations, vec![Degradation::QrOmitted]);

    let image = decode(&card.png);
    // QR box area shows the white card body.
    assert_eq!(*image.get_pixel(830, 476), Palette::CLASSIC.card);
}

#[test]
fn test_record_without_admission_number_is_rejected() {
    let mut record = student();
    record.admission_no = "  ".to_string();
    let result = render_card(
        &record,
        "Greenfield College",
        CardTheme::Classic,
        &red_photo,
        &options(),
    );
    assert!(matches!(result, Err(CampusCardError::InvalidRecord { .. })));
}

#[test]
fn test_rendering_is_deterministic() {
    let render = || {
        render_card(
            &student(),
            "Greenfield College",
            CardTheme::Premium,
            &red_photo,
            &options(),
        )
        .unwrap()
        .png
    };
    assert_eq!(render(), render());
}

#[test]
fn test_png_round_trip_helper() {
    let png = encode_png(&RgbaImage::new(2, 2)).unwrap();
    assert!(image::load(Cursor::new(&png), image::ImageFormat::Png).is_ok());
}
