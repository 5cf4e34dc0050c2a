use crate::upload::error::RequestFailure;
use crate::upload::response::ExtractResponse;
use crate::upload::types::{UploadRequest, EXTRACT_PATH};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};
use url::Url;

/// Sends one archive to the extract endpoint.
#[async_trait]
pub trait ExtractService: Send + Sync {
    async fn submit(&self, request: UploadRequest) -> Result<ExtractResponse, RequestFailure>;
}

#[derive(Clone)]
pub struct HttpExtractClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpExtractClient {
    pub fn new(server_url: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: server_url.join(EXTRACT_PATH)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ExtractService for HttpExtractClient {
    async fn submit(&self, request: UploadRequest) -> Result<ExtractResponse, RequestFailure> {
        let size = request.bytes.len();
        let part = Part::bytes(request.bytes)
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)
            .map_err(RequestFailure::InvalidPart)?;
        let form = Form::new().part(request.field_name, part);

        info!(
            "Posting '{}' ({} bytes) to {}",
            request.file_name, size, self.endpoint
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(RequestFailure::Transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        // The exchange counts as complete once headers are in; a broken body only loses the payload.
        match response.bytes().await {
            Ok(body) => {
                debug!("Extract endpoint answered {} with {} bytes", status, body.len());
                Ok(ExtractResponse::from_parts(status, &headers, body.to_vec()))
            }
            Err(e) => {
                warn!("Extract endpoint answered {} but the body failed: {}", status, e);
                Ok(ExtractResponse::without_body(status, &headers, e.to_string()))
            }
        }
    }
}
