use crate::domain::entities::ResponseResult;
use anyhow::{Result, anyhow};
use colored::Colorize;

/// Renders a result as 2-space indented JSON, keeping non-ASCII text as-is
pub fn render_result(result: &ResponseResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(|e| anyhow!("Failed to format JSON: {}", e))
}

pub fn print_result(result: &ResponseResult) -> Result<()> {
    println!("{}", render_result(result)?);
    Ok(())
}

/// Reduces an error message to its first line
pub fn render_error(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

/// Writes a single-line error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{}", render_error(message).red());
}
