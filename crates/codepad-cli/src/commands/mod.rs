//! CLI command handlers
//!
//! One module per subcommand group. Each handler takes the shared
//! `ProjectStore` built in `main`.

pub mod file;
pub mod project;
pub mod setting;

use std::io::{self, Write};

/// Ask a yes/no question on stdin; anything but `y` is a no
pub fn confirm(question: &str) -> io::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Parse a value as JSON, falling back to a plain string
pub fn parse_json_or_string(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_or_string() {
        assert_eq!(parse_json_or_string("16"), json!(16));
        assert_eq!(parse_json_or_string("{\"a\":true}"), json!({"a": true}));
        assert_eq!(parse_json_or_string("dark"), json!("dark"));
    }
}
