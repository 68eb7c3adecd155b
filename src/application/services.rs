use crate::application::multipart::MultipartForm;
use crate::domain::entities::{Method, RequestConfig, ResponseBody, ResponseResult};
use crate::domain::errors::CliError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

/// A request body already serialized for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Request handed to a transport, with the body already encoded
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<EncodedBody>,
}

/// Raw exchange result produced by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Trait for transports to enable mocking and dependency inversion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<IncomingResponse, CliError>;
}

/// How the request body is encoded for a given config
#[derive(Debug)]
pub enum BodyEncoding<'a> {
    Multipart(MultipartForm<'a>),
    Json(&'a serde_json::Value),
    Empty,
}

impl<'a> BodyEncoding<'a> {
    /// Any form data forces multipart, even a single plain field.
    pub fn select(config: &'a RequestConfig) -> Self {
        if config.has_form_data() {
            let fields = config.form_fields().unwrap_or_default();
            let files = config.form_files().unwrap_or_default();
            return BodyEncoding::Multipart(MultipartForm::from_parts(fields, files));
        }
        match config.json_body() {
            Some(value) => BodyEncoding::Json(value),
            None => BodyEncoding::Empty,
        }
    }

    pub fn encode(&self) -> Result<Option<EncodedBody>, CliError> {
        match self {
            BodyEncoding::Multipart(form) => Ok(Some(form.encode())),
            BodyEncoding::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| CliError::Dispatch(format!("Failed to encode JSON body: {e}")))?;
                Ok(Some(EncodedBody {
                    content_type: "application/json".to_string(),
                    bytes: Bytes::from(bytes),
                }))
            }
            BodyEncoding::Empty => Ok(None),
        }
    }
}

/// Application service that runs one request through a transport
pub struct DispatchService {
    transport: Box<dyn Transport>,
}

impl DispatchService {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn execute(&self, config: &RequestConfig) -> Result<ResponseResult, CliError> {
        let body = BodyEncoding::select(config).encode()?;
        let request = OutgoingRequest {
            method: config.method(),
            path: config.path().as_str().to_string(),
            headers: config.headers().to_vec(),
            query: config.query().to_vec(),
            body,
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            query_pairs = request.query.len(),
            has_body = request.body.is_some(),
            "dispatching request"
        );

        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status, "application responded");

        Ok(ResponseAssembler::assemble(response, config.include_headers()))
    }
}

/// Normalizes a transport response into the emitted result shape
struct ResponseAssembler;

impl ResponseAssembler {
    fn assemble(response: IncomingResponse, include_headers: bool) -> ResponseResult {
        let headers = include_headers.then(|| Self::merge_headers(&response.headers));
        ResponseResult {
            status_code: response.status,
            body: ResponseBody::decode(&response.body),
            headers,
        }
    }

    fn merge_headers(headers: &[(String, String)]) -> BTreeMap<String, String> {
        let mut merged: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            merged
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        merged
    }
}
