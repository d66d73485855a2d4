//! Avatar image handler

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::config::defaults::{AVATAR_CACHE_CONTROL, AVATAR_CONTENT_TYPE};
use crate::utils::is_valid_avatar_hash;
use crate::web::{
    responses::{handle_error, not_found},
    AppState,
};

/// Serve the avatar image for `hash`
///
/// Malformed hashes are answered with 404 without consulting the service.
/// Every well-formed hash gets an image, falling back to the placeholder.
pub async fn get_avatar(Path(hash): Path<String>, State(state): State<AppState>) -> Response {
    if !is_valid_avatar_hash(&hash) {
        debug!("Rejected malformed avatar hash: {}", hash);
        return not_found("Avatar not found").into_response();
    }

    let service = match state.avatars.get().await {
        Ok(service) => service,
        Err(e) => return handle_error(e),
    };

    let avatar = service.resolve(&hash).await;
    let body = avatar.data().clone();
    let length = body.len();

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, AVATAR_CONTENT_TYPE),
            (header::CACHE_CONTROL, AVATAR_CACHE_CONTROL),
        ],
        body,
    )
        .into_response();

    // compression rewrites the body, so the length is left to the encoder
    if !state.config.web.enable_gzip {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    response
}
