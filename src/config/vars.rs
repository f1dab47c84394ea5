//! Environment variable interpolation for config files.
//!
//! Supports the following syntax:
//! - `$VAR` or `${VAR}` - substitute with env var value, error if missing
//! - `${VAR:-default}` - use default if VAR is unset OR empty
//! - `${VAR-default}` - use default only if VAR is unset (empty is OK)
//! - `$$` - escape sequence for literal `$`
//!
//! Credentials (cluster password, IAM role ARN) are the expected use case,
//! so missing variables are collected and reported all at once rather than
//! failing on the first one.

use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$                           # Escape sequence $$
        |
        \$\{                           # Opening ${
            ([A-Za-z_][A-Za-z0-9_]*)   # Variable name (capture group 1)
            (?:                        # Optional default value group
                (:?-)                  # :- or just - (capture group 2)
                ([^}]*)                # Default value (capture group 3)
            )?
        \}                             # Closing }
        |
        \$([A-Za-z_][A-Za-z0-9_]*)     # Unbraced $VAR (capture group 4)
        ",
    )
    .expect("Invalid regex pattern")
});

/// Interpolate environment variables in the given text.
///
/// Returns the interpolated text, or the accumulated list of errors so the
/// user can see every missing variable at once.
pub fn interpolate(input: &str) -> Result<String, Vec<String>> {
    let mut errors = Vec::new();

    let text = VAR_PATTERN
        .replace_all(input, |caps: &Captures| {
            expand(caps, &mut errors)
        })
        .to_string();

    if errors.is_empty() {
        Ok(text)
    } else {
        Err(errors)
    }
}

/// Expand a single `$...` match, pushing a description of any failure.
fn expand(caps: &Captures, errors: &mut Vec<String>) -> String {
    let full_match = caps.get(0).map(|m| m.as_str()).unwrap_or_default();

    if full_match == "$$" {
        return "$".to_string();
    }

    // Variable name from either braced or unbraced form
    let var_name = caps
        .get(1)
        .or_else(|| caps.get(4))
        .map(|m| m.as_str())
        .unwrap_or("");

    let default_syntax = caps.get(2).map(|m| m.as_str());
    let default_value = caps.get(3).map(|m| m.as_str());

    match env::var(var_name) {
        Ok(value) => {
            // Config values end up inside SQL text, so reject newlines
            if value.contains('\n') || value.contains('\r') {
                errors.push(format!(
                    "environment variable '{var_name}' contains newlines, which is not allowed"
                ));
                return full_match.to_string();
            }

            if value.is_empty() && default_syntax == Some(":-") {
                return default_value.unwrap_or("").to_string();
            }

            value
        }
        Err(_) => {
            if let Some(default) = default_value {
                default.to_string()
            } else {
                errors.push(format!("environment variable '{var_name}' is not set"));
                full_match.to_string()
            }
        }
    }
}
