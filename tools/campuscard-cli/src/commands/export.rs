//! Export a college's records to a file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use campuscard_card_render::RenderOptions;
use campuscard_common::config::AppConfig;
use campuscard_export::batch::{BatchProgress, ProgressCallback};
use campuscard_export::{
    ExportCoordinator, ExportKind, ExportSummary, JsonRecordStore, UriPhotoFetcher,
};
use campuscard_student_model::{sanitize_component, TenantId};

use crate::KindArg;

pub async fn run(
    config: AppConfig,
    tenant: String,
    kind: KindArg,
    theme: Option<String>,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let theme = super::resolve_theme(&config, theme.as_deref())?;
    let kind = match kind {
        KindArg::IdCards => ExportKind::IdCards(theme),
        KindArg::Images => ExportKind::Images,
        KindArg::Excel => ExportKind::Spreadsheet,
    };
    let data_file = super::data_file(&config, data);

    println!("Exporting {kind} for tenant: {tenant}");
    println!("  Records: {}", data_file.display());
    if let ExportKind::IdCards(theme) = kind {
        println!("  Theme: {theme}");
    }

    let tenant = TenantId::new(tenant);
    let (output_path, summary) = tokio::task::spawn_blocking(move || {
        export_to_file(&config, data_file, kind, &tenant, output)
    })
    .await??;

    println!();
    match summary {
        ExportSummary::Archive(report) => {
            println!("  Entries written: {}", report.written);
            if report.degraded > 0 {
                println!("  With placeholders: {}", report.degraded);
            }
            if report.skipped > 0 {
                println!("  Skipped (no photo): {}", report.skipped);
            }
            if !report.failed.is_empty() {
                println!("  Failed:");
                for failure in &report.failed {
                    println!(
                        "    - {} ({}): {}",
                        failure.admission_no, failure.name, failure.reason
                    );
                }
            }
        }
        ExportSummary::Spreadsheet { rows, bytes } => {
            println!("  Rows written: {rows} ({bytes} bytes)");
        }
    }
    println!("Export complete: {}", output_path.display());

    Ok(())
}

fn export_to_file(
    config: &AppConfig,
    data_file: PathBuf,
    kind: ExportKind,
    tenant: &TenantId,
    output: Option<PathBuf>,
) -> anyhow::Result<(PathBuf, ExportSummary)> {
    let coordinator = ExportCoordinator::new(
        Arc::new(JsonRecordStore::new(data_file)),
        Arc::new(UriPhotoFetcher::new(&config.fetch)?),
        RenderOptions::from_config(&config.render),
    );
    let prepared = coordinator.prepare(kind, tenant)?;
    println!("  College: {}", prepared.college_name());
    println!("  Students: {}", prepared.records().len());

    let output_path =
        output.unwrap_or_else(|| PathBuf::from(sanitize_component(&prepared.file_name())));
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let progress: ProgressCallback = Box::new(|p: BatchProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{})  ",
            p.fraction() * 100.0,
            p.processed,
            p.total
        );
        let _ = std::io::stdout().flush();
    });

    tracing::debug!(output = %output_path.display(), kind = kind.name(), "Writing export");
    let writer = BufWriter::new(File::create(&output_path)?);
    match prepared.with_progress(progress).write_to(writer) {
        Ok(summary) => Ok((output_path, summary)),
        Err(e) => {
            let _ = std::fs::remove_file(&output_path);
            Err(anyhow::anyhow!("Export failed: {e}"))
        }
    }
}
