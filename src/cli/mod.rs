mod args;

pub use args::{Cli, Commands};

use anyhow::{Context, Result};

/// Split a `Name: value` header argument.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header must look like 'Name: value', got: {}", raw))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Header name is empty in: {}", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-API-KEY: custom").unwrap(),
            ("X-API-KEY".to_string(), "custom".to_string())
        );
        assert_eq!(
            parse_header("Accept:application/json").unwrap(),
            ("Accept".to_string(), "application/json".to_string())
        );
        assert_eq!(
            parse_header("X-Empty:").unwrap(),
            ("X-Empty".to_string(), String::new())
        );
        assert!(parse_header("no separator").is_err());
        assert!(parse_header(": value").is_err());
    }
}
