use crate::application::services::{
    DispatchService, EncodedBody, IncomingResponse, OutgoingRequest, Transport,
};
use crate::domain::entities::Method as DomainMethod;
use crate::domain::errors::CliError;
use crate::domain::target::Application;
use crate::infrastructure::config::TransportConfig;

use async_trait::async_trait;
use axum::body::Body;
use futures::FutureExt;
use http::header::{
    ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, HOST, HeaderMap, HeaderName, HeaderValue, LOCATION,
    TRANSFER_ENCODING, USER_AGENT,
};
use http::{Method, Request, Response, StatusCode, Uri};
use http_body_util::BodyExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tower::ServiceExt;
use url::Url;

/// In-process implementation of `Transport` that drives an application
/// router directly, without sockets.
pub struct InProcessTransport {
    application: Application,
    config: TransportConfig,
    base_url: Url,
}

impl InProcessTransport {
    pub fn new(application: Application, config: TransportConfig) -> Result<Self, CliError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            CliError::Dispatch(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;
        Ok(Self {
            application,
            config,
            base_url,
        })
    }

    /// Creates a dispatch service backed by this transport
    pub fn create_dispatch_service(self) -> DispatchService {
        DispatchService::new(Box::new(self))
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<IncomingResponse, CliError> {
        let mut exchange = Exchange::from_outgoing(&self.base_url, request);
        let mut redirects = 0;

        loop {
            let http_request = RequestAdapter::to_http_request(&exchange, &self.config)?;
            let response = self.execute(http_request).await?;

            let next = if self.config.follow_redirects {
                RedirectPolicy::next(&exchange, &response)?
            } else {
                None
            };

            match next {
                None => return ResponseAdapter::to_incoming_response(response).await,
                Some(redirected) => {
                    redirects += 1;
                    if redirects > self.config.max_redirects {
                        return Err(CliError::Dispatch(format!(
                            "Exceeded maximum allowed redirects ({})",
                            self.config.max_redirects
                        )));
                    }
                    tracing::debug!(
                        status = response.status().as_u16(),
                        from = %exchange.url,
                        to = %redirected.url,
                        "following redirect"
                    );
                    exchange = redirected;
                }
            }
        }
    }
}

impl InProcessTransport {
    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>, CliError> {
        let router = self.application.router().clone();
        match AssertUnwindSafe(router.oneshot(request)).catch_unwind().await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(infallible)) => match infallible {},
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                tracing::debug!(application = self.application.name(), %reason, "application panicked");
                Err(CliError::Dispatch(format!(
                    "application '{}' panicked while handling the request: {reason}",
                    self.application.name()
                )))
            }
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// One hop of a possibly redirected request
#[derive(Debug, Clone)]
struct Exchange {
    method: DomainMethod,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<EncodedBody>,
}

impl Exchange {
    fn from_outgoing(base_url: &Url, request: OutgoingRequest) -> Self {
        Self {
            method: request.method,
            url: UriAdapter::to_url(base_url, &request.path, &request.query),
            headers: request.headers,
            body: request.body,
        }
    }
}

/// Adapter for converting an exchange into an `http::Request`
struct RequestAdapter;

impl RequestAdapter {
    fn to_http_request(exchange: &Exchange, config: &TransportConfig) -> Result<Request<Body>, CliError> {
        let method = MethodAdapter::to_http_method(exchange.method);
        let uri = UriAdapter::to_http_uri(&exchange.url)?;
        let headers = HeaderAdapter::to_header_map(exchange, config)?;
        let body = BodyAdapter::to_http_body(&exchange.body);

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .map_err(|e| CliError::Dispatch(format!("Failed to build HTTP request: {e}")))?;
        *request.headers_mut() = headers;
        Ok(request)
    }
}

/// Adapter for converting application responses into transport responses
struct ResponseAdapter;

impl ResponseAdapter {
    async fn to_incoming_response(response: Response<Body>) -> Result<IncomingResponse, CliError> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| CliError::Dispatch(format!("Failed to read response body: {e}")))?
            .to_bytes();

        Ok(IncomingResponse {
            status,
            headers,
            body,
        })
    }
}

/// Adapter for converting domain HTTP methods to `http` methods
struct MethodAdapter;

impl MethodAdapter {
    fn to_http_method(domain_method: DomainMethod) -> Method {
        match domain_method {
            DomainMethod::Get => Method::GET,
            DomainMethod::Post => Method::POST,
            DomainMethod::Put => Method::PUT,
            DomainMethod::Patch => Method::PATCH,
            DomainMethod::Delete => Method::DELETE,
            DomainMethod::Options => Method::OPTIONS,
            DomainMethod::Head => Method::HEAD,
            DomainMethod::Trace => Method::TRACE,
        }
    }
}

/// Adapter for placing a path and query pairs on the placeholder authority
struct UriAdapter;

impl UriAdapter {
    fn to_url(base_url: &Url, path: &str, query: &[(String, String)]) -> Url {
        let mut url = base_url.clone();
        let (path, existing_query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        url.set_path(path);
        url.set_query(existing_query);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    fn to_http_uri(url: &Url) -> Result<Uri, CliError> {
        url.as_str()
            .parse::<Uri>()
            .map_err(|e| CliError::Dispatch(format!("Invalid request URI '{url}': {e}")))
    }

    fn authority(url: &Url) -> &str {
        &url[url::Position::BeforeHost..url::Position::AfterPort]
    }
}

/// Adapter for converting encoded bodies to `axum` bodies
struct BodyAdapter;

impl BodyAdapter {
    fn to_http_body(body: &Option<EncodedBody>) -> Body {
        match body {
            Some(encoded) => Body::from(encoded.bytes.clone()),
            None => Body::empty(),
        }
    }
}

/// Adapter for handling HTTP headers
struct HeaderAdapter;

impl HeaderAdapter {
    fn to_header_map(exchange: &Exchange, config: &TransportConfig) -> Result<HeaderMap, CliError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &exchange.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CliError::Dispatch(format!("Invalid header name '{name}': {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| CliError::Dispatch(format!("Invalid value for header '{name}': {e}")))?;
            headers.insert(header_name, header_value);
        }

        Self::insert_default(&mut headers, HOST, UriAdapter::authority(&exchange.url))?;
        Self::insert_default(&mut headers, ACCEPT, "*/*")?;
        Self::insert_default(&mut headers, USER_AGENT, &config.user_agent)?;

        match &exchange.body {
            Some(body) => {
                Self::insert_default(&mut headers, CONTENT_TYPE, &body.content_type)?;
                headers.insert(CONTENT_LENGTH, HeaderValue::from(body.bytes.len()));
            }
            None if matches!(
                exchange.method,
                DomainMethod::Post | DomainMethod::Put | DomainMethod::Patch
            ) =>
            {
                headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
            }
            None => {}
        }

        Ok(headers)
    }

    fn insert_default(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), CliError> {
        if headers.contains_key(&name) {
            return Ok(());
        }
        let value = HeaderValue::from_str(value)
            .map_err(|e| CliError::Dispatch(format!("Invalid value for header '{name}': {e}")))?;
        headers.insert(name, value);
        Ok(())
    }
}

/// Decides whether and how a response redirects the exchange
struct RedirectPolicy;

impl RedirectPolicy {
    fn next(exchange: &Exchange, response: &Response<Body>) -> Result<Option<Exchange>, CliError> {
        let status = response.status();
        if !Self::is_redirect(status) {
            return Ok(None);
        }
        let Some(location) = response.headers().get(LOCATION) else {
            return Ok(None);
        };
        let location = location
            .to_str()
            .map_err(|e| CliError::Dispatch(format!("Invalid redirect location: {e}")))?;
        let url = exchange.url.join(location).map_err(|e| {
            CliError::Dispatch(format!("Invalid redirect location '{location}': {e}"))
        })?;

        let method = Self::redirect_method(exchange.method, status);
        if method == exchange.method {
            return Ok(Some(Exchange {
                url,
                ..exchange.clone()
            }));
        }

        let headers = exchange
            .headers
            .iter()
            .filter(|(name, _)| !Self::is_body_header(name))
            .cloned()
            .collect();
        Ok(Some(Exchange {
            method,
            url,
            headers,
            body: None,
        }))
    }

    fn is_redirect(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::MOVED_PERMANENTLY
                | StatusCode::FOUND
                | StatusCode::SEE_OTHER
                | StatusCode::TEMPORARY_REDIRECT
                | StatusCode::PERMANENT_REDIRECT
        )
    }

    fn redirect_method(method: DomainMethod, status: StatusCode) -> DomainMethod {
        match (status, method) {
            (StatusCode::SEE_OTHER, DomainMethod::Head) => DomainMethod::Head,
            (StatusCode::SEE_OTHER, _) => DomainMethod::Get,
            (StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND, DomainMethod::Post) => DomainMethod::Get,
            (_, method) => method,
        }
    }

    fn is_body_header(name: &str) -> bool {
        [CONTENT_TYPE, CONTENT_LENGTH, TRANSFER_ENCODING]
            .iter()
            .any(|header| name.eq_ignore_ascii_case(header.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::response::Redirect;
    use axum::routing::{get, post};
    use bytes::Bytes;

    fn router() -> Router {
        Router::new()
            .route("/", get(|| async { "root" }))
            .route(
                "/inspect",
                get(|uri: Uri, headers: HeaderMap| async move {
                    let host = headers
                        .get(HOST)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    format!("{uri} host={host}")
                }),
            )
            .route("/hop", get(|| async { Redirect::temporary("/") }))
            .route("/loop", get(|| async { Redirect::temporary("/loop") }))
            .route("/submit", post(|| async { Redirect::to("/result") }))
            .route("/result", get(|| async { "result via GET" }))
            .route("/boom", get(boom))
    }

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    fn transport(config: TransportConfig) -> InProcessTransport {
        InProcessTransport::new(Application::from_factory("test", router), config).unwrap()
    }

    fn request(method: DomainMethod, path: &str) -> OutgoingRequest {
        OutgoingRequest {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn query_pairs_are_appended_to_path_query() {
        let mut outgoing = request(DomainMethod::Get, "/inspect?a=1");
        outgoing.query = vec![
            ("b".to_string(), "two words".to_string()),
            ("b".to_string(), "&".to_string()),
        ];

        let response = transport(TransportConfig::default()).send(outgoing).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            Bytes::from_static(b"http://testserver/inspect?a=1&b=two+words&b=%26 host=testserver")
        );
    }

    #[tokio::test]
    async fn redirects_are_followed() {
        let response = transport(TransportConfig::default())
            .send(request(DomainMethod::Get, "/hop"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from_static(b"root"));
    }

    #[tokio::test]
    async fn see_other_switches_to_get_and_drops_body() {
        let mut outgoing = request(DomainMethod::Post, "/submit");
        outgoing.body = Some(EncodedBody {
            content_type: "application/json".to_string(),
            bytes: Bytes::from_static(b"{}"),
        });

        let response = transport(TransportConfig::default()).send(outgoing).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from_static(b"result via GET"));
    }

    #[tokio::test]
    async fn redirects_can_be_disabled() {
        let response = transport(TransportConfig::default().without_redirects())
            .send(request(DomainMethod::Get, "/hop"))
            .await
            .unwrap();
        assert_eq!(response.status, 307);
    }

    #[tokio::test]
    async fn redirect_loops_are_bounded() {
        let err = transport(TransportConfig::default())
            .send(request(DomainMethod::Get, "/loop"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Request dispatch failed: Exceeded maximum allowed redirects (20)"
        );
    }

    #[tokio::test]
    async fn application_panic_is_a_dispatch_error() {
        let err = transport(TransportConfig::default())
            .send(request(DomainMethod::Get, "/boom"))
            .await
            .unwrap_err();
        match err {
            CliError::Dispatch(message) => assert!(message.contains("kaboom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_an_error() {
        let response = transport(TransportConfig::default())
            .send(request(DomainMethod::Get, "/nowhere"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn invalid_header_value_fails_dispatch() {
        let mut outgoing = request(DomainMethod::Get, "/");
        outgoing.headers = vec![("X-Bad".to_string(), "line\nbreak".to_string())];

        let err = transport(TransportConfig::default()).send(outgoing).await.unwrap_err();
        assert!(matches!(err, CliError::Dispatch(_)));
    }

    #[test]
    fn head_survives_see_other() {
        assert_eq!(
            RedirectPolicy::redirect_method(DomainMethod::Head, StatusCode::SEE_OTHER),
            DomainMethod::Head
        );
        assert_eq!(
            RedirectPolicy::redirect_method(DomainMethod::Put, StatusCode::FOUND),
            DomainMethod::Put
        );
        assert_eq!(
            RedirectPolicy::redirect_method(DomainMethod::Post, StatusCode::TEMPORARY_REDIRECT),
            DomainMethod::Post
        );
    }
}
