//! Environment variable interpolation for config files.
//!
//! Supported syntax:
//! - `$VAR` or `${VAR}` - substitute with env var value, error if missing
//! - `${VAR:-default}` - use default if VAR is unset or empty
//! - `$$` - escape sequence for literal `$`

use std::env;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ConfigError;

/// Matches `$$`, `${VAR}`, `${VAR:-default}`, and bare `$VAR`.
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$                                            # escape sequence
        |
        \$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}    # braced form
        |
        \$([A-Za-z_][A-Za-z0-9_]*)                      # bare form
        ",
    )
    .expect("invalid interpolation pattern")
});

/// Interpolate environment variables in the given text.
///
/// Missing variables are accumulated so the user sees every problem in
/// one pass rather than one per run.
pub fn interpolate(input: &str) -> Result<String, ConfigError> {
    let mut missing: Vec<String> = Vec::new();

    let text = VAR_PATTERN.replace_all(input, |caps: &Captures| {
        if &caps[0] == "$$" {
            return "$".to_string();
        }

        let name = caps
            .get(1)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or("");
        let default = caps.get(2).map(|m| m.as_str());

        match (env::var(name), default) {
            (Ok(value), Some(fallback)) if value.is_empty() => fallback.to_string(),
            (Ok(value), _) => value,
            (Err(_), Some(fallback)) => fallback.to_string(),
            (Err(_), None) => {
                missing.push(format!("missing environment variable: {name}"));
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(text.into_owned())
    } else {
        Err(ConfigError::EnvInterpolation {
            message: missing.join("\n"),
        })
    }
}
