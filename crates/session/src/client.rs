//! Real HTTP transport implementation
//!
//! Thin reqwest carrier: builds the absolute URL from the configured
//! base, attaches headers and body, and hands back status plus raw
//! bytes. Interpretation of the response belongs to the callers.

use cropsight_common::ClientConfig;

use crate::transport::{
    ApiRequest, ApiResponse, Method, MultipartForm, RequestBody, Transport, TransportError,
};

/// Backend transport over a shared reqwest client.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport from configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_form(form: &MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
        let mut out = reqwest::multipart::Form::new();
        for (name, value) in &form.fields {
            out = out.text(name.clone(), value.clone());
        }
        if let Some(file) = &form.file {
            let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| TransportError::Request(e.to_string()))?;
            out = out.part(file.field.clone(), part);
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(Self::build_form(form)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?
            .to_vec();

        tracing::trace!(path = %request.path, status, "backend request completed");
        Ok(ApiResponse { status, body })
    }
}
