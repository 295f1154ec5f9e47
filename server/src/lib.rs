//! World clock HTTP server.
//!
//! Serves a bare `HH:MM:SS` per city at `/xml/{city}`, an HTML page per
//! city at `/{city}`, and the few static assets the front page needs.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use common::zones::Zone;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to read asset {path}: {source}")]
    Asset {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Internal Server Error",
        )
            .into_response()
    }
}

#[derive(Clone)]
struct AppState {
    static_dir: Arc<PathBuf>,
    clock: Clock,
}

impl AppState {
    async fn read_asset(&self, relative: &str) -> Result<Vec<u8>, ServeError> {
        let path = self.static_dir.join(relative);
        tokio::fs::read(&path).await.map_err(|source| ServeError::Asset {
            path: path.display().to_string(),
            source,
        })
    }

    async fn asset(&self, relative: &str, status: StatusCode) -> Result<Response, ServeError> {
        let bytes = self.read_asset(relative).await?;
        Ok((status, [(header::CONTENT_TYPE, content_type_for(relative))], bytes).into_response())
    }
}

/// Content type picked from the file name, plain text when unknown.
pub fn content_type_for(file_name: &str) -> &'static str {
    if file_name.ends_with(".html") {
        "text/html; charset=utf-8"
    } else if file_name.ends_with(".css") {
        "text/css; charset=utf-8"
    } else if file_name.ends_with(".js") {
        "text/javascript; charset=utf-8"
    } else {
        "text/plain; charset=utf-8"
    }
}

/// Fill the city page template.
pub fn render_template(template: &str, zone: &Zone, time: &str) -> String {
    template
        .replace("{{title}}", zone.title)
        .replace("{{country}}", zone.code)
        .replace("{{time}}", time)
}

pub fn router(static_dir: impl Into<PathBuf>) -> Router {
    router_with_clock(static_dir, Utc::now)
}

/// Router with an injectable clock, for deterministic pages.
pub fn router_with_clock(static_dir: impl Into<PathBuf>, clock: Clock) -> Router {
    let state = AppState {
        static_dir: Arc::new(static_dir.into()),
        clock,
    };

    Router::new()
        .route("/", get(index))
        .route("/main.css", get(stylesheet))
        .route("/main.js", get(script))
        .route("/xml/:city", get(xml_time))
        .route("/:city", get(city_page))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Result<Response, ServeError> {
    state.asset("html/main.html", StatusCode::OK).await
}

async fn stylesheet(State(state): State<AppState>) -> Result<Response, ServeError> {
    state.asset("css/main.css", StatusCode::OK).await
}

async fn script(State(state): State<AppState>) -> Result<Response, ServeError> {
    state.asset("js/main.js", StatusCode::OK).await
}

async fn xml_time(
    Path(city): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ServeError> {
    let Some(zone) = Zone::lookup(&city) else {
        return not_found(State(state)).await;
    };
    let time = zone.time_at((state.clock)());
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], time).into_response())
}

async fn city_page(
    Path(city): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ServeError> {
    let Some(zone) = Zone::lookup(&city) else {
        return not_found(State(state)).await;
    };
    let bytes = state.read_asset("html/template.html").await?;
    let template = String::from_utf8_lossy(&bytes);
    let page = render_template(&template, zone, &zone.time_at((state.clock)()));
    Ok(([(header::CONTENT_TYPE, content_type_for(".html"))], page).into_response())
}

async fn not_found(State(state): State<AppState>) -> Result<Response, ServeError> {
    state.asset("html/404.html", StatusCode::NOT_FOUND).await
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(listener: tokio::net::TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on {}", addr);
    }
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("html/main.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("css/main.css"), "text/css; charset=utf-8");
        assert_eq!(content_type_for("js/main.js"), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for("notes.txt"), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_render_template() {
        let zone = Zone::lookup("tok").unwrap();
        let page = render_template(
            "<title>{{title}}</title><p id=\"{{country}}\">{{time}}</p><p>{{time}}</p>",
            zone,
            "21:00:00",
        );
        assert_eq!(
            page,
            "<title>東京 (Tokyo)</title><p id=\"tok\">21:00:00</p><p>21:00:00</p>"
        );
    }
}
