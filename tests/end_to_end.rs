use appcall::application::builders::request_builder::{RequestArgs, RequestBuilder};
use appcall::application::services::DispatchService;
use appcall::domain::entities::{ResponseBody, ResponseResult};
use appcall::domain::errors::CliError;
use appcall::domain::value_objects::MultipartCapability;
use appcall::infrastructure::config::TransportConfig;
use appcall::infrastructure::in_process::InProcessTransport;
use appcall::infrastructure::loader::{ApplicationLoader, RegistryLoader};
use serde_json::json;

fn dispatcher() -> DispatchService {
    let application = RegistryLoader::with_builtin().load("demo", None).unwrap();
    InProcessTransport::new(application, TransportConfig::default())
        .unwrap()
        .create_dispatch_service()
}

fn get(path: &str) -> RequestArgs {
    RequestArgs {
        method: "GET".to_string(),
        path: path.to_string(),
        ..RequestArgs::default()
    }
}

async fn send(args: RequestArgs) -> Result<ResponseResult, CliError> {
    let config = RequestBuilder::assemble(&args, MultipartCapability::Available)?;
    dispatcher().execute(&config).await
}

// --- plain requests ---

#[tokio::test]
async fn empty_path_hits_root_route() {
    let result = send(get("")).await.unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(
        result.body,
        ResponseBody::Json(json!({"message": "Hello from appcall"}))
    );
    assert!(result.headers.is_none());
}

#[tokio::test]
async fn missing_route_is_a_successful_dispatch() {
    let result = send(get("/does-not-exist")).await.unwrap();
    assert_eq!(result.status_code, 404);
    assert_eq!(result.body, ResponseBody::Text(String::new()));
}

#[tokio::test]
async fn non_json_body_falls_back_to_text() {
    let result = send(get("text")).await.unwrap();
    assert_eq!(
        result.body,
        ResponseBody::Text("plain text response".to_string())
    );
}

#[tokio::test]
async fn repeated_query_keys_reach_the_application_in_order() {
    let result = send(RequestArgs {
        query: vec!["tag=a&tag=b".to_string(), "flag".to_string()],
        ..get("/items")
    })
    .await
    .unwrap();

    assert_eq!(
        result.body,
        ResponseBody::Json(json!({"query": [["tag", "a"], ["tag", "b"], ["flag", ""]]}))
    );
}

#[tokio::test]
async fn custom_headers_are_forwarded() {
    let result = send(RequestArgs {
        headers: vec!["X-Request-Id: 42".to_string()],
        ..get("/headers")
    })
    .await
    .unwrap();

    let ResponseBody::Json(headers) = result.body else {
        panic!("expected JSON body");
    };
    assert_eq!(headers["x-request-id"], "42");
    assert_eq!(headers["host"], "testserver");
}

#[tokio::test]
async fn case_variant_duplicate_header_last_wins() {
    let result = send(RequestArgs {
        headers: vec!["X-A: 1".to_string(), "x-a: 2".to_string()],
        ..get("/headers")
    })
    .await
    .unwrap();

    let ResponseBody::Json(headers) = result.body else {
        panic!("expected JSON body");
    };
    assert_eq!(headers["x-a"], "2");
}

#[tokio::test]
async fn redirect_is_followed() {
    let result = send(get("/redirect")).await.unwrap();
    assert_eq!(result.status_code, 200);
    assert_eq!(
        result.body,
        ResponseBody::Json(json!({"message": "Hello from appcall"}))
    );
}

// --- bodies ---

#[tokio::test]
async fn json_body_round_trips() {
    let result = send(RequestArgs {
        method: "post".to_string(),
        data: Some(r#"{"x": 1, "tags": ["a", "b"]}"#.to_string()),
        ..get("/echo")
    })
    .await
    .unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(
        result.body,
        ResponseBody::Json(json!({"x": 1, "tags": ["a", "b"]}))
    );
}

#[tokio::test]
async fn include_headers_exposes_content_type() {
    let result = send(RequestArgs {
        include_headers: true,
        ..get("/")
    })
    .await
    .unwrap();

    let headers = result.headers.unwrap();
    assert_eq!(headers["content-type"], "application/json");
}

#[cfg(feature = "multipart")]
#[tokio::test]
async fn multipart_fields_and_files_arrive_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

    let result = send(RequestArgs {
        method: "POST".to_string(),
        form: vec![
            "tag=a".to_string(),
            format!("avatar=@{};type=image/png;filename=x.png", path.display()),
            "tag=b".to_string(),
        ],
        ..get("/upload")
    })
    .await
    .unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(
        result.body,
        ResponseBody::Json(json!({"parts": [
            {"name": "tag", "value": "a"},
            {"name": "tag", "value": "b"},
            {"name": "avatar", "filename": "x.png", "content_type": "image/png", "size": 4},
        ]}))
    );
}

// --- failures ---

#[tokio::test]
async fn application_panic_is_a_dispatch_error() {
    let err = send(get("/panic")).await.unwrap_err();
    assert!(matches!(err, CliError::Dispatch(_)));
    assert!(!err.to_string().contains('\n'), "{err}");
}

#[tokio::test]
async fn conflicting_body_fails_before_dispatch() {
    let err = send(RequestArgs {
        method: "POST".to_string(),
        data: Some("{}".to_string()),
        form: vec!["a=b".to_string()],
        ..get("/echo")
    })
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::ConflictingBody));
}
