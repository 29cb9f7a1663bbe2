//! HTTP endpoint.
//! The whole request path, minus leading and trailing slashes, is the FEN:
//! `GET /rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR%20w%20KQkq%20-%200%201`.
//! A parse failure is a 400 with the error text; success is the encoded image.

use crate::encode::{OutputFormat, encode_to_vec};
use crate::error::EncodeError;
use crate::fen;
use crate::render::{BoardConfig, render};
use crate::sprites::SpriteSet;
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Shared, read-only per-process state.
#[derive(Clone)]
pub struct AppState {
    pub sprites: Arc<SpriteSet>,
    pub board: BoardConfig,
    pub format: OutputFormat,
}

impl AppState {
    pub fn new(sprites: Arc<SpriteSet>, board: BoardConfig, format: OutputFormat) -> Self {
        Self {
            sprites,
            board,
            format,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(render_root))
        .route("/{*fen}", any(render_path))
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, format = %state.format, "listening");
    axum::serve(listener, router(state)).await
}

async fn render_root(State(state): State<AppState>) -> Response {
    render_fen(state, "").await
}

async fn render_path(State(state): State<AppState>, Path(fen): Path<String>) -> Response {
    render_fen(state, &fen).await
}

async fn render_fen(state: AppState, path: &str) -> Response {
    let fen = path.trim_matches('/');
    let board = match fen::parse(fen) {
        Ok(board) => board,
        Err(e) => {
            debug!(fen, error = %e, "rejected fen");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let format = state.format;
    let job = tokio::task::spawn_blocking(move || {
        let img = render(&state.board, &board, &state.sprites);
        encode_to_vec(&img, format)
    });

    match job.await {
        Ok(encoded) => image_response(fen, format, encoded),
        Err(e) => {
            error!(fen, error = %e, "render task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// 200 with the encoded image, or 500 with the encoder's error text.
fn image_response(fen: &str, format: OutputFormat, encoded: Result<Vec<u8>, EncodeError>) -> Response {
    match encoded {
        Ok(bytes) => ([(header::CONTENT_TYPE, format.content_type())], bytes).into_response(),
        Err(e) => {
            error!(fen, error = %e, "encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_encode_failure_is_500_with_message() {
        let failed = Err(EncodeError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed")));
        let response = image_response("8/8/8/8/8/8/8/8", OutputFormat::default(), failed);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "writing image failed: sink closed");
    }

    #[tokio::test]
    async fn test_encoded_bytes_get_format_content_type() {
        let response = image_response("8/8/8/8/8/8/8/8", OutputFormat::Png, Ok(vec![1, 2, 3]));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_text(response).await.as_bytes(), &[1, 2, 3]);
    }
}
