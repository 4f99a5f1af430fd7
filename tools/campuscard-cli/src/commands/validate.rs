//! Validate stored student records.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use campuscard_card_render::qr::{encode_qr, QrPayload};
use campuscard_card_render::CardTheme;
use campuscard_common::config::AppConfig;
use campuscard_export::JsonRecordStore;
use campuscard_student_model::TenantId;

pub fn run(config: AppConfig, data: Option<PathBuf>) -> anyhow::Result<()> {
    let data_file = super::data_file(&config, data);
    println!("Validating records at: {}", data_file.display());

    let set = JsonRecordStore::new(&data_file).load_all()?;
    let records = set.records;
    println!("  Records: {}", records.len());
    if !set.rejected.is_empty() {
        println!("  Unreadable: {}", set.rejected.len());
    }

    let mut per_tenant: BTreeMap<&TenantId, usize> = BTreeMap::new();
    for record in &records {
        *per_tenant.entry(&record.college_id).or_default() += 1;
    }
    for (tenant, count) in &per_tenant {
        println!("    {tenant}: {count}");
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for entry in &set.rejected {
        let tenant = entry
            .college_id
            .as_ref()
            .map_or_else(|| "unknown college".to_string(), ToString::to_string);
        errors.push(format!(
            "entry #{} {} ({tenant}): {}",
            entry.index,
            entry.admission_no.as_deref().unwrap_or("?"),
            entry.reason
        ));
    }

    for theme in CardTheme::ALL {
        for issue in theme.layout().validate() {
            errors.push(format!("{theme} layout: {issue}"));
        }
    }

    let qr_size = CardTheme::ALL
        .iter()
        .map(|theme| theme.layout().qr_box.w.round() as u32)
        .min()
        .unwrap_or(0);
    let mut entry_names = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let label = format!("#{index} {} ({})", record.admission_no, record.college_id);
        if let Err(e) = record.validate() {
            errors.push(format!("{label}: {e}"));
            continue;
        }
        if !entry_names.insert((record.college_id.clone(), record.card_entry_name())) {
            errors.push(format!(
                "{label}: duplicate card name {}",
                record.card_entry_name()
            ));
        }
        if record.photo_uri().is_none() {
            warnings.push(format!("{label}: no photo; card will show a placeholder"));
        }
        let payload = QrPayload::for_record(record, &record.college_name);
        if let Err(e) = encode_qr(&payload, qr_size) {
            warnings.push(format!("{label}: QR will be omitted ({e})"));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    if errors.is_empty() {
        println!("\nAll records are valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Affected cards will be missing from exports.",
            errors.len()
        );
    }

    Ok(())
}
