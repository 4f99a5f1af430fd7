//! Render a single student's ID card.

use std::path::PathBuf;

use campuscard_card_render::{render_card, Degradation, RenderOptions};
use campuscard_common::config::AppConfig;
use campuscard_export::{JsonRecordStore, RecordSource, UriPhotoFetcher};
use campuscard_student_model::TenantId;

pub async fn run(
    config: AppConfig,
    tenant: String,
    admission_no: String,
    theme: Option<String>,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let theme = super::resolve_theme(&config, theme.as_deref())?;
    let data_file = super::data_file(&config, data);
    println!("Rendering {theme} card for {admission_no} ({tenant})");

    let (path, degradations) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let records =
            JsonRecordStore::new(data_file).fetch_records_for_tenant(&TenantId::new(tenant.as_str()))?;
        let record = records
            .into_iter()
            .find(|r| r.admission_no == admission_no)
            .ok_or_else(|| {
                anyhow::anyhow!("No student with admission number {admission_no} in tenant {tenant}")
            })?;

        let fetcher = UriPhotoFetcher::new(&config.fetch)?;
        let options = RenderOptions::from_config(&config.render);
        let card = render_card(&record, &record.college_name, theme, &fetcher, &options)?;

        let path = output.unwrap_or_else(|| PathBuf::from(&card.file_name));
        std::fs::write(&path, &card.png)?;
        Ok((path, card.degradations))
    })
    .await??;

    for degradation in &degradations {
        match degradation {
            Degradation::PhotoPlaceholder => {
                println!("  [WARN] Photo unavailable; placeholder drawn")
            }
            Degradation::QrOmitted => println!("  [WARN] QR code could not be encoded; omitted"),
        }
    }
    println!("Card written: {}", path.display());

    Ok(())
}
