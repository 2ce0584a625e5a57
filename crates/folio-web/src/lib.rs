//! Folio Web Server
//!
//! Axum-based REST API for the content graph, task files, projects and the
//! dashboard layout.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use folio_core::files::watcher;
use folio_core::media::{MAX_UPLOAD_BYTES, UPLOADS_ROUTE};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use config::{ServerConfig, StoreBackend};
use state::AppState;

/// Room for multipart framing and text fields on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let content = get(routes::content::get_graph)
        .post(routes::content::create_content)
        .put(routes::content::update_content)
        .delete(routes::content::delete_content);
    let projects = get(routes::projects::list_projects).post(routes::projects::create_project);

    let api_routes = Router::new()
        // Content graph
        .route("/content", content.clone())
        .route("/content/image", post(routes::images::upload_image))
        .route("/content/batch/positions", put(routes::content::batch_positions))
        .route("/content/{id}", get(routes::content::get_content))
        .route("/content/{id}/view", post(routes::content::record_view))
        .route("/content/{id}/position", put(routes::content::update_position))
        .route("/edges", put(routes::edges::replace_edges))
        // Task files
        .route("/save-txt", post(routes::files::save_txt))
        .route("/txt-files", get(routes::files::list_txt_files))
        .route("/txt-file/{filename}", get(routes::files::read_txt_file))
        // Projects
        .route("/projects", projects.clone())
        .route(
            "/projects/{id}",
            put(routes::projects::update_project).delete(routes::projects::delete_project),
        )
        // Dashboard
        .route(
            "/layout",
            get(routes::layout::get_layout).put(routes::layout::put_layout),
        );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .route("/content/api", content)
        .route("/project/api", projects);

    if let Some(dir) = &state.uploads {
        app = app.nest_service(UPLOADS_ROUTE, ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until Ctrl-C.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;

    let watcher = config
        .watcher
        .map(|watch| watcher::spawn(state.graph.tasks().clone(), watch));

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    tracing::info!("Web server listening on http://{}", config.address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = watcher {
        handle.abort();
    }
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
