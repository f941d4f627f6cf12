// Integration tests for the HTTP route tree
//
// These only exercise paths that never leave the process: health, local
// document extraction, and request validation failures that reject before
// any upstream call.

use bayberry::config::Settings;
use bayberry::routes::configure_routes;
use bayberry::state::AppState;
use warp::http::StatusCode;

fn test_settings() -> Settings {
    Settings::from_lookup(|name| {
        match name {
            "BASE_URL" => Some("https://ark.example.com/api/v3"),
            "API_KEY" => Some("test-key"),
            "MODEL_NAME" => Some("vision-pro"),
            "IMAGE_MODEL_NAME" => Some("paint-v2"),
            "DOUBAO_APP_ID" => Some("app"),
            "DOUBAO_TOKEN" => Some("token"),
            _ => None,
        }
        .map(str::to_string)
    })
    .expect("test settings must be valid")
}

fn routes(
) -> impl warp::Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
    configure_routes(AppState::new(test_settings()))
}

#[tokio::test]
async fn test_health() {
    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "API service is running");
}

#[tokio::test]
async fn test_unknown_path_is_enveloped_404() {
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/nope")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_extract_bytes_txt() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/extract/bytes?file_type=txt")
        .body("hello extraction")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["text"], "hello extraction");
    assert_eq!(body["file_type"], "txt");
    assert_eq!(body["metadata"]["lines"], 1);
}

#[tokio::test]
async fn test_extract_bytes_requires_file_type() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/extract/bytes")
        .body("hello")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("file_type"));
}

#[tokio::test]
async fn test_extract_bytes_rejects_unsupported_type() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/extract/bytes?file_type=doc")
        .body("binary")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("doc"));
}

#[tokio::test]
async fn test_extract_multipart_txt() {
    let boundary = "------------------------bayberrytest";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         line one\nline two\r\n\
         --{boundary}--\r\n"
    );

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/extract")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["file_type"], "txt");
    assert_eq!(parsed["text"], "line one\nline two");
}

#[tokio::test]
async fn test_extract_multipart_without_file() {
    let boundary = "------------------------bayberrytest";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\n\
         value\r\n\
         --{boundary}--\r\n"
    );

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/extract")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(parsed["message"], "No file provided");
}

#[tokio::test]
async fn test_image_to_text_rejects_unsupported_extension() {
    let boundary = "------------------------bayberrytest";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"photo.tiff\"\r\n\
         Content-Type: image/tiff\r\n\r\n\
         II*\0\r\n\
         --{boundary}--\r\n"
    );

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/imageToText")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(parsed["success"], false);
    assert!(parsed["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported image type"));
}

#[tokio::test]
async fn test_image_to_text_rejects_unrecognized_bytes() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/imageToText")
        .body("definitely not an image")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_image_to_text_rejects_invalid_detail() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/imageToText?detail=ultra")
        .body(&[0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a][..])
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert!(body["message"].as_str().unwrap().contains("detail"));
}

#[tokio::test]
async fn test_text_to_image_rejects_blank_prompt() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/textToImage")
        .json(&serde_json::json!({"text": "   "}))
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_text_to_image_rejects_missing_field() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/textToImage")
        .json(&serde_json::json!({"prompt": "wrong field"}))
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_voice_to_text_rejects_unknown_format() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/voiceToText?format=flac")
        .body("audio bytes")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert!(body["message"].as_str().unwrap().contains("flac"));
}

#[tokio::test]
async fn test_get_on_post_route_is_enveloped() {
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/textToImage")
        .reply(&routes())
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 405);
}
