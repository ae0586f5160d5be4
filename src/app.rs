use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, plants};

/// Stock photo URLs handed to clients that have nothing to upload.
const SAMPLE_PLANT_IMAGES: [&str; 8] = [
    "https://images.pexels.com/photos/3076899/pexels-photo-3076899.jpeg",
    "https://images.pexels.com/photos/1005058/pexels-photo-1005058.jpeg",
    "https://images.unsplash.com/photo-1551893665-f843f600794e?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Njd8MHwxfHNlYXJjaHwyfHxzdWNjdWxlbnRzfGVufDB8fHx8MTc0ODY4MTQwOHww&ixlib=rb-4.1.0&q=85",
    "https://images.pexels.com/photos/2132227/pexels-photo-2132227.jpeg",
    "https://images.pexels.com/photos/85773/pexels-photo-85773.jpeg",
    "https://images.pexels.com/photos/931177/pexels-photo-931177.jpeg",
    "https://images.unsplash.com/photo-1490750967868-88aa4486c946?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Njl8MHwxfHNlYXJjaHwyfHxmbG93ZXJzfGVufDB8fHx8MTc0ODY4MTQxMnww&ixlib=rb-4.1.0&q=85",
    "https://images.unsplash.com/photo-1519378058457-4c29a0a2efac?crop=entropy&cs=srgb&fm=jpg&ixid=M3w3NTY2Njl8MHwxfHNlYXJjaHwzfHxmbG93ZXJzfGVufDB8fHx8MTc0ODY4MTQxMnww&ixlib=rb-4.1.0&q=85",
];

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Plant Exchange API" }))
}

async fn sample_images() -> Json<serde_json::Value> {
    Json(json!({ "images": SAMPLE_PLANT_IMAGES }))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(plants::router())
                .route("/", get(root))
                .route("/sample-images", get(sample_images)),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_images_are_well_formed_urls() {
        assert!(!SAMPLE_PLANT_IMAGES.is_empty());
        for url in SAMPLE_PLANT_IMAGES {
            assert!(url.starts_with("https://"));
        }
    }
}
