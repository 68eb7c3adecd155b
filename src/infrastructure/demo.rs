//! Bundled sample application, registered as the `demo` source.

use axum::extract::RawQuery;
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use url::form_urlencoded;

pub fn app() -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/items", get(list_items))
        .route("/echo", post(echo))
        .route("/headers", get(request_headers))
        .route("/text", get(text))
        .route("/redirect", get(redirect))
        .route("/panic", get(explode));

    #[cfg(feature = "multipart")]
    let router = router.route("/upload", post(upload::upload));

    router
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello from appcall" }))
}

async fn list_items(RawQuery(query): RawQuery) -> Json<Value> {
    let pairs: Vec<Value> = form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .map(|(key, value)| json!([key, value]))
        .collect();
    Json(json!({ "query": pairs }))
}

async fn echo(Json(input): Json<Value>) -> Json<Value> {
    Json(input)
}

async fn request_headers(headers: HeaderMap) -> Json<Value> {
    let map: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();
    Json(Value::Object(map))
}

async fn text() -> &'static str {
    "plain text response"
}

async fn redirect() -> Redirect {
    Redirect::temporary("/")
}

async fn explode() -> &'static str {
    panic!("demo application failure")
}

#[cfg(feature = "multipart")]
mod upload {
    use axum::Json;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    pub async fn upload(mut multipart: Multipart) -> Result<Json<Value>, StatusCode> {
        let mut parts = Vec::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
        {
            let name = field.name().map(str::to_string);
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;

            let part = match filename {
                Some(filename) => json!({
                    "name": name,
                    "filename": filename,
                    "content_type": content_type,
                    "size": data.len(),
                }),
                None => json!({
                    "name": name,
                    "value": String::from_utf8_lossy(&data),
                }),
            };
            parts.push(part);
        }
        Ok(Json(json!({ "parts": parts })))
    }
}
