//! Export download endpoints.
//!
//! Every export runs on a blocking worker. The worker first prepares the
//! export and reports the outcome over a oneshot channel, so an unknown
//! tenant still gets a proper 404. Once prepared, output is streamed
//! through a [`ChannelWriter`] into the response body.

use std::io;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use campuscard_card_render::CardTheme;
use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_export::{ExportCoordinator, ExportKind, ExportSummary, PreparedExport};
use campuscard_student_model::TenantId;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use super::AppState;
use crate::error::ApiError;
use crate::stream::{body_channel, header_file_name, BodyChunk, ChannelWriter};

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub tenant: String,
    #[serde(default)]
    pub theme: Option<String>,
}

/// `GET /export/id-cards?tenant=..[&theme=..]` -- zip of rendered ID cards.
pub async fn id_cards(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let theme = match query.theme.as_deref() {
        Some(raw) => raw
            .parse::<CardTheme>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => state.default_theme,
    };
    stream_export(state, ExportKind::IdCards(theme), TenantId::new(query.tenant)).await
}

/// `GET /export/images?tenant=..` -- zip of original student photos.
pub async fn images(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    stream_export(state, ExportKind::Images, TenantId::new(query.tenant)).await
}

/// `GET /export/excel?tenant=..` -- spreadsheet of student records.
pub async fn excel(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    stream_export(state, ExportKind::Spreadsheet, TenantId::new(query.tenant)).await
}

struct Download {
    content_type: &'static str,
    file_name: String,
}

async fn stream_export(
    state: AppState,
    kind: ExportKind,
    tenant: TenantId,
) -> Result<Response, ApiError> {
    let (ready_tx, ready_rx) = oneshot::channel();
    let (body_tx, body_rx) = body_channel();

    tokio::task::spawn_blocking(move || run_export(state, kind, tenant, ready_tx, body_tx));

    let download = ready_rx
        .await
        .map_err(|_| ApiError::Internal("export worker exited before preparing".into()))??;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_file_name(&download.file_name)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::Internal(format!("invalid Content-Disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReceiverStream::new(body_rx)),
    )
        .into_response())
}

fn prepare(state: &AppState, kind: ExportKind, tenant: &TenantId) -> CampusCardResult<PreparedExport> {
    let fetcher = (state.fetchers)()?;
    ExportCoordinator::new(state.records.clone(), fetcher, state.render.clone()).prepare(kind, tenant)
}

fn run_export(
    state: AppState,
    kind: ExportKind,
    tenant: TenantId,
    ready: oneshot::Sender<Result<Download, ApiError>>,
    body: mpsc::Sender<BodyChunk>,
) {
    let prepared = match prepare(&state, kind, &tenant) {
        Ok(prepared) => prepared,
        Err(err) => {
            let _ = ready.send(Err(err.into()));
            return;
        }
    };

    let download = Download {
        content_type: prepared.content_type(),
        file_name: prepared.file_name(),
    };
    if ready.send(Ok(download)).is_err() {
        tracing::debug!(tenant = %tenant, "Request dropped before export started");
        return;
    }

    let abort = body.clone();
    match prepared.write_to(ChannelWriter::new(body)) {
        Ok(ExportSummary::Archive(report)) => {
            tracing::info!(
                tenant = %tenant,
                kind = kind.name(),
                written = report.written,
                failed = report.failed.len(),
                "Export streamed"
            );
        }
        Ok(ExportSummary::Spreadsheet { rows, .. }) => {
            tracing::info!(tenant = %tenant, rows, "Export streamed");
        }
        Err(CampusCardError::SinkClosed) => {
            tracing::info!(tenant = %tenant, kind = kind.name(), "Client disconnected, export aborted");
        }
        Err(err) => {
            tracing::error!(tenant = %tenant, kind = kind.name(), "Export failed mid-stream: {err}");
            let _ = abort.blocking_send(Err(io::Error::new(io::ErrorKind::Other, err.to_string())));
        }
    }
}
