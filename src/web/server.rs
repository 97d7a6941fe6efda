use axum::{routing::get, routing::post, Router};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::czml::{CzmlGenerator, DocumentGenerator};
use crate::predict::{Ephemeris, LowPrecisionEphemeris};
use crate::run::{CatalogRenderer, RunConfig, VisibilityRun, VisualizationTrigger};

use super::api::convert as convert_handlers;
use super::api::history as history_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ephemeris: Arc<dyn Ephemeris>,
    pub generator: Arc<dyn DocumentGenerator>,
    /// Runs share artifact paths, so only one runs at a time.
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            ephemeris: Arc::new(LowPrecisionEphemeris),
            generator: Arc::new(CzmlGenerator::default()),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn trigger(&self) -> VisualizationTrigger {
        VisualizationTrigger::new(
            self.generator.clone(),
            self.config.artifact_store(),
            &self.config.visualization.document_name,
        )
    }

    /// Assemble a run over the configured artifact locations.
    pub fn visibility_run(&self, config: RunConfig) -> VisibilityRun {
        let store = self.config.artifact_store();
        let run = VisibilityRun::new(config, self.ephemeris.clone(), store.clone(), self.trigger());

        if self.config.visualization.render_catalog {
            run.with_observer(Box::new(CatalogRenderer::new(
                self.generator.clone(),
                self.config.storage.tles_dir.clone(),
                store,
                config.visibility.time_offset_seconds,
            )))
        } else {
            run
        }
    }
}

/// Plain file serving; a missing file is a 404.
fn static_files(dir: &Path) -> ServeDir {
    ServeDir::new(dir)
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/convert", post(convert_handlers::convert))
        .route("/history", get(history_handlers::history))
        // Element sets and rendered documents
        .nest_service("/tles", static_files(&state.config.storage.tles_dir))
        .nest_service("/output", static_files(&state.config.storage.output_dir))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    config.ensure_directories()?;

    let app = router(AppState::new(config));

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
