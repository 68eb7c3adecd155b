use std::fmt;

/// Represents a normalized absolute request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath(String);

impl RequestPath {
    /// Creates a new RequestPath from operator input
    ///
    /// # Arguments
    /// * `raw` - The path as typed; may be blank or lack a leading slash
    ///
    /// # Returns
    /// * `RequestPath` - Never empty, always starting with `/`
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::root();
        }
        if trimmed.starts_with('/') {
            RequestPath(trimmed.to_string())
        } else {
            RequestPath(format!("/{trimmed}"))
        }
    }

    pub fn root() -> Self {
        RequestPath("/".to_string())
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether this build can encode multipart form bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipartCapability {
    Available,
    Unavailable,
}

impl MultipartCapability {
    /// Reports the capability compiled into this binary
    pub fn detect() -> Self {
        if cfg!(feature = "multipart") {
            MultipartCapability::Available
        } else {
            MultipartCapability::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == MultipartCapability::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "/")]
    #[case("   ", "/")]
    #[case("/", "/")]
    #[case("users", "/users")]
    #[case("  /users/1  ", "/users/1")]
    #[case("items?tag=a", "/items?tag=a")]
    fn path_is_normalized(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(RequestPath::new(raw).as_str(), expected);
    }

    #[cfg(feature = "multipart")]
    #[test]
    fn default_build_has_multipart() {
        assert!(MultipartCapability::detect().is_available());
    }
}
