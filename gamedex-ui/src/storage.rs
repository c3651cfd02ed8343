//! Image update flow
//!
//! Writes a replacement image to object storage (the filesystem under the
//! root folder, path convention `images/{game_id}/{file_name}`), then
//! rewrites the game's stored image-reference field to the public URL.
//! Failures propagate as typed errors; the record is never mutated unless
//! the upload succeeded.

use crate::state::AppState;
use gamedex_common::db::update_game_photo;
use gamedex_common::{Error, Result};
use tracing::{error, info};

/// Upload a replacement image for a game and rewrite its image reference
///
/// Returns the public URL of the stored image.
pub async fn update_game_image(
    state: &AppState,
    game_id: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<String> {
    if game_id.is_empty() {
        return Err(Error::InvalidInput("No game ID has been provided".to_string()));
    }
    if file_name.is_empty() || bytes.is_empty() {
        return Err(Error::InvalidInput(
            "A valid image has not been provided".to_string(),
        ));
    }
    // Both identifiers land in a filesystem path and a URL; each must stay
    // a single path segment. Route matching alone does not guarantee this:
    // path parameters arrive percent-decoded.
    if !is_single_path_segment(game_id) {
        return Err(Error::InvalidInput(format!("Invalid game ID: {}", game_id)));
    }
    if !is_single_path_segment(file_name) {
        return Err(Error::InvalidInput(format!("Invalid image file name: {}", file_name)));
    }

    let public_url = match upload_image(state, game_id, file_name, bytes).await {
        Ok(url) => url,
        Err(e) => {
            error!("Error storing image for game {}: {}", game_id, e);
            return Err(e);
        }
    };

    // Only after the upload succeeded is the record touched
    update_game_photo(&state.db, game_id, &public_url).await?;

    info!("Updated image for game {} -> {}", game_id, public_url);
    state.event_bus.emit(gamedex_common::events::CatalogEvent::GameUpdated {
        game_id: game_id.to_string(),
        timestamp: chrono::Utc::now(),
    });

    Ok(public_url)
}

fn is_single_path_segment(value: &str) -> bool {
    !value.contains('/') && !value.contains('\\') && !value.contains("..")
}

/// Write the image bytes under `images/{game_id}/{file_name}` and return
/// the public URL it will be served from
async fn upload_image(
    state: &AppState,
    game_id: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<String> {
    let dir = state.images_dir().join(game_id);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(file_name), bytes).await?;

    Ok(format!("/images/{}/{}", game_id, file_name))
}
