// Route definitions

use warp::Filter;

use crate::error::handle_rejection;
use crate::handlers;
use crate::state::{with_state, SharedState};
use crate::ws;

pub fn configure_routes(
    state: SharedState,
) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
    let max_length = state.settings.max_content_length;
    let api = warp::path("api").and(warp::path("v1"));

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health::health_handler);

    // POST /api/v1/extract (multipart)
    let extract_multipart = api
        .and(warp::path("extract"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(max_length))
        .and_then(handlers::extract::extract_multipart_handler);

    // POST /api/v1/extract/bytes?file_type=
    let extract_raw = api
        .and(warp::path("extract"))
        .and(warp::path("bytes"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::query::<handlers::extract::ExtractQuery>())
        .and(warp::body::content_length_limit(max_length))
        .and(warp::body::bytes())
        .and_then(handlers::extract::extract_raw_handler);

    // POST /api/v1/imageToText (multipart, falls through to raw bytes)
    let image_to_text_multipart = api
        .and(warp::path("imageToText"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::query::<handlers::image::ImageQuery>())
        .and(warp::multipart::form().max_length(max_length))
        .and_then(handlers::image::image_to_text_multipart_handler);

    let image_to_text_raw = api
        .and(warp::path("imageToText"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::query::<handlers::image::ImageQuery>())
        .and(warp::body::content_length_limit(max_length))
        .and(warp::body::bytes())
        .and_then(handlers::image::image_to_text_raw_handler);

    // POST /api/v1/textToImage
    let text_to_image = api
        .and(warp::path("textToImage"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::body::content_length_limit(max_length))
        .and(warp::body::json())
        .and_then(handlers::image::text_to_image_handler);

    // POST /api/v1/voiceToText (multipart, falls through to raw bytes)
    let voice_multipart = api
        .and(warp::path("voiceToText"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::multipart::form().max_length(max_length))
        .and_then(handlers::voice::voice_multipart_handler);

    let voice_raw = api
        .and(warp::path("voiceToText"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::query::<handlers::voice::VoiceQuery>())
        .and(warp::body::content_length_limit(max_length))
        .and(warp::body::bytes())
        .and_then(handlers::voice::voice_raw_handler);

    // GET /ws (upgrade)
    let streaming = warp::path("ws")
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_state(state))
        .map(|upgrade: warp::ws::Ws, state: SharedState| {
            upgrade.on_upgrade(move |socket| ws::client_connected(socket, state))
        });

    health
        .or(extract_raw)
        .or(extract_multipart)
        .or(image_to_text_multipart)
        .or(image_to_text_raw)
        .or(text_to_image)
        .or(voice_multipart)
        .or(voice_raw)
        .or(streaming)
        .recover(handle_rejection)
}
