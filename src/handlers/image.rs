// Image handlers: POST /api/v1/imageToText and /api/v1/textToImage

use bytes::Bytes;
use serde::Deserialize;
use warp::multipart::FormData;
use warp::{Rejection, Reply};

use crate::error::{reject, GatewayError};
use crate::models::{ApiResponse, TextToImageRequest};
use crate::providers::chat::{Detail, EncodedImage};
use crate::state::SharedState;

use super::{read_form, take_field};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub question: Option<String>,
    pub detail: Option<String>,
}

/// Multipart upload: `file` part plus an optional `question` field. A
/// `question` query parameter takes precedence over the form field.
pub async fn image_to_text_multipart_handler(
    state: SharedState,
    query: ImageQuery,
    form: FormData,
) -> Result<impl Reply, Rejection> {
    let mut fields = read_form(form).await?;
    let file = take_field(&mut fields, "file")
        .ok_or_else(|| reject(GatewayError::BadRequest("No file provided".to_string())))?;

    let extension = file.extension().ok_or_else(|| {
        reject(GatewayError::BadRequest(
            "Could not determine file type from file name".to_string(),
        ))
    })?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(reject(GatewayError::BadRequest(format!(
            "Unsupported image type: {}",
            extension
        ))));
    }

    let question = query
        .question
        .or_else(|| take_field(&mut fields, "question").map(|f| f.as_text()));

    let detail = parse_detail(query.detail.as_deref())?;
    let image = EncodedImage::from_bytes(&file.bytes, mime_for_extension(&extension), detail);

    describe(state, image, question).await
}

/// Raw octet-stream upload: the image type is sniffed from the leading bytes.
pub async fn image_to_text_raw_handler(
    state: SharedState,
    query: ImageQuery,
    body: Bytes,
) -> Result<impl Reply, Rejection> {
    if body.is_empty() {
        return Err(reject(GatewayError::BadRequest(
            "Empty image data".to_string(),
        )));
    }

    let mime = sniff_image_mime(&body).ok_or_else(|| {
        reject(GatewayError::BadRequest(
            "Unrecognized image data".to_string(),
        ))
    })?;

    let detail = parse_detail(query.detail.as_deref())?;
    let image = EncodedImage::from_bytes(&body, mime, detail);

    describe(state, image, query.question).await
}

async fn describe(
    state: SharedState,
    image: EncodedImage,
    question: Option<String>,
) -> Result<impl Reply, Rejection> {
    let question = question.filter(|q| !q.trim().is_empty());

    let answer = match question {
        Some(question) => {
            tracing::info!("Answering a direct question about an image");
            state.chat.ask_about_image(&image, &question).await
        }
        None => {
            tracing::info!("Running image classification pipeline");
            state.chat.process_image(&image).await
        }
    }
    .map_err(reject)?;

    Ok(warp::reply::json(&ApiResponse::ok(
        serde_json::Value::String(answer),
    )))
}

/// POST /api/v1/textToImage: generate an image and return the uploaded file
/// record.
pub async fn text_to_image_handler(
    state: SharedState,
    request: TextToImageRequest,
) -> Result<impl Reply, Rejection> {
    if request.text.trim().is_empty() {
        return Err(reject(GatewayError::BadRequest(
            "Text prompt must not be empty".to_string(),
        )));
    }

    tracing::info!(prompt_len = request.text.len(), "Generating image from text");
    let record = state.image.generate(&request.text).await.map_err(reject)?;

    Ok(warp::reply::json(&ApiResponse::ok(record)))
}

fn parse_detail(raw: Option<&str>) -> Result<Detail, Rejection> {
    match raw {
        None => Ok(Detail::High),
        Some(value) => Detail::parse(value).map_err(reject),
    }
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Identify an image format from its leading bytes.
fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF8") {
        Some("image/gif")
    } else if data.starts_with(b"BM") {
        Some("image/bmp")
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
