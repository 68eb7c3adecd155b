use crate::domain::errors::CliError;
use crate::domain::value_objects::RequestPath;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Trace => "TRACE",
        }
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|method| method.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Method {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == normalized)
            .ok_or_else(|| CliError::UnsupportedMethod {
                method: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file read from an `@path` form argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

/// Fully validated request, built once by `RequestBuilder`
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub(crate) method: Method,
    pub(crate) path: RequestPath,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) json_body: Option<Value>,
    pub(crate) form_fields: Option<Vec<(String, String)>>,
    pub(crate) form_files: Option<Vec<(String, FormFile)>>,
    pub(crate) include_headers: bool,
}

impl RequestConfig {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &RequestPath {
        &self.path
    }

    /// Request headers in the order they are sent
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.json_body.as_ref()
    }

    pub fn form_fields(&self) -> Option<&[(String, String)]> {
        self.form_fields.as_deref()
    }

    pub fn form_files(&self) -> Option<&[(String, FormFile)]> {
        self.form_files.as_deref()
    }

    pub fn include_headers(&self) -> bool {
        self.include_headers
    }

    pub fn has_form_data(&self) -> bool {
        self.form_fields.as_ref().is_some_and(|fields| !fields.is_empty())
            || self.form_files.as_ref().is_some_and(|files| !files.is_empty())
    }
}

/// Response payload, decoded as JSON when possible
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Attempts a JSON decode and keeps the raw text when that fails
    pub fn decode(payload: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(payload) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(payload).into_owned()),
        }
    }
}

/// Normalized outcome of one dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseResult {
    pub status_code: u16,
    pub body: ResponseBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}
