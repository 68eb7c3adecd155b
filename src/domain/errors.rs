use std::io;
use std::path::PathBuf;

/// Recoverable errors raised while assembling or dispatching a request.
///
/// Every variant is an operator-facing input problem. The binary prints the
/// message on one line and exits with the same failure code for all of them.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid header format: '{0}'. Use 'Key: Value'.")]
    MalformedHeader(String),

    #[error("Header name is empty: '{0}'.")]
    EmptyHeaderName(String),

    #[error("Failed to parse JSON: {0}")]
    MalformedJson(String),

    #[error("Invalid -F/--form value: '{0}'. Use 'key=value' or 'key=@path'.")]
    MalformedForm(String),

    #[error("Invalid -F/--form value (empty key): '{0}'.")]
    EmptyFormKey(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read file: {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "The -F/--form option requires multipart support. \
         Rebuild with it enabled: cargo install appcall --features multipart"
    )]
    MultipartUnavailable,

    #[error(
        "-d/--data and -F/--form cannot be used together. \
         Use -d for JSON, or -F for form fields/files."
    )]
    ConflictingBody,

    #[error("Invalid HTTP method: {method}. Supported methods: {supported}")]
    UnsupportedMethod { method: String, supported: String },

    #[error("Failed to load application: {0}")]
    ApplicationLoad(String),

    /// The transport could not complete the exchange. An error status
    /// returned by the application is not a dispatch failure.
    #[error("Request dispatch failed: {0}")]
    Dispatch(String),
}
