use crate::application::parsers::{parse_form, parse_headers, parse_json, parse_query};
use crate::domain::entities::{FormFile, Method, RequestConfig};
use crate::domain::errors::CliError;
use crate::domain::value_objects::{MultipartCapability, RequestPath};
use serde_json::Value;
use std::str::FromStr;

/// Raw, unvalidated request arguments as collected from the command line
#[derive(Debug, Clone, Default)]
pub struct RequestArgs {
    pub method: String,
    pub path: String,
    pub headers: Vec<String>,
    pub query: Vec<String>,
    pub data: Option<String>,
    pub form: Vec<String>,
    pub include_headers: bool,
}

pub struct RequestBuilder {
    method: Method,
    path: RequestPath,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    json_body: Option<Value>,
    form_fields: Option<Vec<(String, String)>>,
    form_files: Option<Vec<(String, FormFile)>>,
    include_headers: bool,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            path: RequestPath::root(),
            headers: Vec::new(),
            query: Vec::new(),
            json_body: None,
            form_fields: None,
            form_files: None,
            include_headers: false,
        }
    }

    /// Validates raw arguments and assembles a `RequestConfig`.
    ///
    /// A JSON body and form arguments together are rejected before either is
    /// parsed, so no referenced file is read in that case.
    pub fn assemble(
        args: &RequestArgs,
        capability: MultipartCapability,
    ) -> Result<RequestConfig, CliError> {
        if args.data.is_some() && !args.form.is_empty() {
            return Err(CliError::ConflictingBody);
        }

        Self::new()
            .method(&args.method)?
            .path(&args.path)
            .headers(&args.headers)?
            .query(&args.query)
            .json(args.data.as_deref())?
            .form(&args.form, capability)?
            .include_headers(args.include_headers)
            .build()
    }

    pub fn method(mut self, method: &str) -> Result<Self, CliError> {
        self.method = Method::from_str(method)?;
        Ok(self)
    }

    pub fn path(mut self, raw_path: &str) -> Self {
        self.path = RequestPath::new(raw_path);
        self
    }

    pub fn headers(mut self, raw_headers: &[String]) -> Result<Self, CliError> {
        for (name, value) in parse_headers(raw_headers)? {
            self.headers.retain(|(existing, _)| *existing != name);
            self.headers.push((name, value));
        }
        Ok(self)
    }

    pub fn query(mut self, raw_query: &[String]) -> Self {
        self.query.extend(parse_query(raw_query));
        self
    }

    pub fn json(mut self, data: Option<&str>) -> Result<Self, CliError> {
        self.json_body = parse_json(data)?;
        Ok(self)
    }

    /// Parses `-F` arguments; a no-op when none were given.
    pub fn form(
        mut self,
        raw_form: &[String],
        capability: MultipartCapability,
    ) -> Result<Self, CliError> {
        if raw_form.is_empty() {
            return Ok(self);
        }
        if !capability.is_available() {
            return Err(CliError::MultipartUnavailable);
        }

        let (fields, files) = parse_form(raw_form)?;
        self.form_fields = Some(fields).filter(|fields| !fields.is_empty());
        self.form_files = Some(files).filter(|files| !files.is_empty());
        Ok(self)
    }

    pub fn include_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }

    pub fn build(self) -> Result<RequestConfig, CliError> {
        if self.json_body.is_some() && (self.form_fields.is_some() || self.form_files.is_some()) {
            return Err(CliError::ConflictingBody);
        }

        Ok(RequestConfig {
            method: self.method,
            path: self.path,
            headers: self.headers,
            query: self.query,
            json_body: self.json_body,
            form_fields: self.form_fields,
            form_files: self.form_files,
            include_headers: self.include_headers,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
