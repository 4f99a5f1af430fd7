pub mod export;
pub mod health;
pub mod students;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use campuscard_card_render::{CardTheme, PhotoFetcher, RenderOptions};
use campuscard_common::config::AppConfig;
use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_export::{JsonRecordStore, RecordSource, UriPhotoFetcher};
use tower_http::trace::TraceLayer;

/// Builds a photo fetcher for one export. Called on the export's worker
/// thread, so blocking clients are created and dropped off the runtime.
pub type FetcherFactory = Arc<dyn Fn() -> CampusCardResult<Arc<dyn PhotoFetcher>> + Send + Sync>;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Student record store.
    pub records: Arc<dyn RecordSource>,
    /// Photo fetcher constructor.
    pub fetchers: FetcherFactory,
    /// Fonts and footer text for rendered cards.
    pub render: RenderOptions,
    /// Theme used when a request names none.
    pub default_theme: CardTheme,
}

impl AppState {
    pub fn new(
        records: Arc<dyn RecordSource>,
        fetchers: FetcherFactory,
        render: RenderOptions,
        default_theme: CardTheme,
    ) -> Self {
        Self {
            records,
            fetchers,
            render,
            default_theme,
        }
    }

    /// State backed by the configured JSON record store and URI fetcher.
    pub fn from_config(config: &AppConfig) -> CampusCardResult<Self> {
        let default_theme = config
            .render
            .default_theme
            .parse::<CardTheme>()
            .map_err(|e| CampusCardError::config(e.to_string()))?;

        let fetch = config.fetch.clone();
        let fetchers: FetcherFactory =
            Arc::new(move || -> CampusCardResult<Arc<dyn PhotoFetcher>> {
                Ok(Arc::new(UriPhotoFetcher::new(&fetch)?))
            });

        Ok(Self::new(
            Arc::new(JsonRecordStore::new(config.data_file.clone())),
            fetchers,
            RenderOptions::from_config(&config.render),
            default_theme,
        ))
    }
}

/// Build the router with all API routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/students", get(students::list_students))
        .route("/export/id-cards", get(export::id_cards))
        .route("/export/images", get(export::images))
        .route("/export/excel", get(export::excel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
