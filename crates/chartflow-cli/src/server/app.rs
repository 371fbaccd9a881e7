//! Axum application setup.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Import
        .route("/import", post(handlers::import_path))
        .route("/import/records", post(handlers::import_records))
        .route("/import/sheet", post(handlers::select_sheet))
        .route("/dataset", get(handlers::get_dataset))
        .route("/summary", get(handlers::get_summary))
        // Cleaning
        .route("/corrections", get(handlers::get_corrections))
        .route("/corrections/apply", post(handlers::apply_correction))
        .route("/corrections/apply-all", post(handlers::apply_all_corrections))
        .route("/operations", post(handlers::apply_operation))
        .route("/clean/missing", post(handlers::handle_missing))
        .route("/clean/split", post(handlers::split_column))
        .route("/clean/rename", post(handlers::rename_columns))
        // Analytics
        .route("/statistics", get(handlers::get_statistics))
        .route("/correlation", get(handlers::get_correlation))
        // View
        .route("/view", get(handlers::get_view))
        .route("/view/search", post(handlers::search))
        .route("/view/sort", post(handlers::sort))
        .route("/view/page", get(handlers::get_page))
        .route("/export", get(handlers::export_csv))
        // Charts
        .route(
            "/charts",
            get(handlers::list_charts).post(handlers::create_chart),
        )
        .route("/charts/:id", delete(handlers::delete_chart))
        .route("/charts/:id/data", get(handlers::get_chart_data))
        .route("/render", get(handlers::render_charts));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server. Stops on Ctrl+C.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
