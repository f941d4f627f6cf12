//! Shared application state

use std::convert::Infallible;
use std::sync::Arc;

use warp::Filter;

use crate::config::Settings;
use crate::providers::asr::{AsrFileClient, StreamAsrConfig};
use crate::providers::chat::ChatClient;
use crate::providers::image::ImageClient;

/// Provider clients plus settings, shared across all requests
pub struct AppState {
    pub settings: Settings,
    pub chat: ChatClient,
    pub image: ImageClient,
    pub asr: AsrFileClient,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(settings: Settings) -> SharedState {
        let http_client = reqwest::Client::new();

        let chat = ChatClient::new(
            http_client.clone(),
            &settings.base_url,
            settings.api_key.clone(),
            settings.model_name.clone(),
        );
        let image = ImageClient::new(
            http_client.clone(),
            &settings.base_url,
            settings.api_key.clone(),
            settings.image_model_name.clone(),
            settings.fileserver_upload_url.clone(),
        );
        let asr = AsrFileClient::new(
            http_client,
            &settings.doubao_base_url,
            settings.doubao_app_id.clone(),
            settings.doubao_token.clone(),
        );

        Arc::new(Self {
            settings,
            chat,
            image,
            asr,
        })
    }

    /// Connection parameters for a new streaming recognition session.
    pub fn stream_asr_config(&self) -> StreamAsrConfig {
        StreamAsrConfig::new(
            self.settings.doubao_stream_base_url.clone(),
            self.settings.doubao_app_id.clone(),
            self.settings.doubao_token.clone(),
        )
    }
}

/// Filter that hands each request a clone of the shared state.
pub fn with_state(
    state: SharedState,
) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
