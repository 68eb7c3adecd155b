//! Turns repeatable raw command line values into structured request parts.

use crate::domain::entities::FormFile;
use crate::domain::errors::CliError;
use serde_json::Value;
use std::path::Path;
use url::form_urlencoded;

/// Plain fields and file uploads parsed from `-F` arguments, in input order
pub type ParsedForm = (Vec<(String, String)>, Vec<(String, FormFile)>);

/// Parses `Key: Value` header arguments into pairs in input order.
///
/// A repeated key drops its earlier entry, so the last occurrence wins and
/// ends up last in the sequence.
pub fn parse_headers(raw_headers: &[String]) -> Result<Vec<(String, String)>, CliError> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for raw in raw_headers {
        let (key, value) = raw
            .split_once(':')
            .ok_or_else(|| CliError::MalformedHeader(raw.clone()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::EmptyHeaderName(raw.clone()));
        }
        headers.retain(|(existing, _)| existing != key);
        headers.push((key.to_string(), value.trim().to_string()));
    }
    Ok(headers)
}

/// Parses query-string fragments such as `a=1&b=2`.
///
/// Never fails: blank values are kept and empty segments are skipped.
pub fn parse_query(raw_query: &[String]) -> Vec<(String, String)> {
    raw_query
        .iter()
        .filter(|fragment| !fragment.is_empty())
        .flat_map(|fragment| {
            form_urlencoded::parse(fragment.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn parse_json(data: Option<&str>) -> Result<Option<Value>, CliError> {
    let Some(data) = data else {
        return Ok(None);
    };
    serde_json::from_str(data)
        .map(Some)
        .map_err(|e| CliError::MalformedJson(e.to_string()))
}

/// Parses `key=value` fields and `key=@path[;type=MIME][;filename=NAME]` files.
pub fn parse_form(raw_form: &[String]) -> Result<ParsedForm, CliError> {
    let mut fields = Vec::new();
    let mut files = Vec::new();

    for item in raw_form {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| CliError::MalformedForm(item.clone()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::EmptyFormKey(item.clone()));
        }

        match value.strip_prefix('@') {
            Some(file_spec) => files.push((key.to_string(), read_file_spec(file_spec)?)),
            None => fields.push((key.to_string(), value.to_string())),
        }
    }

    Ok((fields, files))
}

fn read_file_spec(file_spec: &str) -> Result<FormFile, CliError> {
    let mut segments = file_spec.split(';');
    let path_str = segments.next().unwrap_or_default();

    let mut content_type = None;
    let mut custom_filename = None;
    for segment in segments {
        match segment.trim().split_once('=') {
            Some(("type", mime)) if !mime.is_empty() => content_type = Some(mime.to_string()),
            Some(("filename", name)) if !name.is_empty() => custom_filename = Some(name.to_string()),
            _ => {}
        }
    }

    let path = Path::new(path_str);
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read(path).map_err(|source| CliError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let filename = custom_filename.unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.to_string())
    });

    Ok(FormFile {
        filename,
        content,
        content_type,
    })
}
