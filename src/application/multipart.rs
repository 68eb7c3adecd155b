//! `multipart/form-data` encoding for `-F` arguments.
//!
//! Fields are emitted before files and each group keeps its declared order.
//! Repeated names are allowed; the receiving application decides whether
//! they form a multi-value field.

use crate::application::services::EncodedBody;
use crate::domain::entities::FormFile;
use bytes::{BufMut, BytesMut};
use std::path::Path;
use uuid::Uuid;

const CRLF: &[u8] = b"\r\n";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part<'a> {
    Field {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        filename: &'a str,
        content: &'a [u8],
        content_type: Option<&'a str>,
    },
}

impl Part<'_> {
    pub fn name(&self) -> &str {
        match self {
            Part::Field { name, .. } | Part::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MultipartForm<'a> {
    boundary: String,
    parts: Vec<Part<'a>>,
}

impl<'a> MultipartForm<'a> {
    pub fn from_parts(fields: &'a [(String, String)], files: &'a [(String, FormFile)]) -> Self {
        let field_parts = fields.iter().map(|(name, value)| Part::Field { name, value });
        let file_parts = files.iter().map(|(name, file)| Part::File {
            name,
            filename: &file.filename,
            content: &file.content,
            content_type: file.content_type.as_deref(),
        });

        Self {
            boundary: Uuid::new_v4().simple().to_string(),
            parts: field_parts.chain(file_parts).collect(),
        }
    }

    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> &[Part<'a>] {
        &self.parts
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn encode(&self) -> EncodedBody {
        let mut buf = BytesMut::new();
        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(CRLF);
            write_part(&mut buf, part);
            buf.put_slice(CRLF);
        }
        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--");
        buf.put_slice(CRLF);

        EncodedBody {
            content_type: self.content_type(),
            bytes: buf.freeze(),
        }
    }
}

fn write_part(buf: &mut BytesMut, part: &Part<'_>) {
    match part {
        Part::Field { name, value } => {
            let disposition = format!("Content-Disposition: form-data; name=\"{}\"", escape(name));
            buf.put_slice(disposition.as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(CRLF);
            buf.put_slice(value.as_bytes());
        }
        Part::File {
            name,
            filename,
            content,
            content_type,
        } => {
            let disposition = format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                escape(name),
                escape(filename)
            );
            buf.put_slice(disposition.as_bytes());
            buf.put_slice(CRLF);
            let content_type = content_type.map_or_else(|| guess_content_type(filename), str::to_string);
            buf.put_slice(format!("Content-Type: {content_type}").as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(CRLF);
            buf.put_slice(content);
        }
    }
}

fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Infers a content type from the filename extension
pub fn guess_content_type(filename: &str) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let guessed = match extension.as_deref() {
        Some("txt") => "text/plain",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => FALLBACK_CONTENT_TYPE,
    };
    guessed.to_string()
}
