//! Tokenizing and value-parsing helpers shared by the setting grammars.

use globset::GlobBuilder;

use crate::error::ConfigError;

/// Escape sequence allowing a single token to carry embedded spaces.
const SPACE_ESCAPE: &str = "[:space:]";

/// Splits a line on runs of whitespace, discarding empty tokens.
#[must_use]
pub fn split(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

/// Splits like [`split`] and then rewrites the `[:space:]` escape inside
/// each token to a literal space, so multi-word values (descriptions,
/// messages) survive whitespace tokenization.
#[must_use]
pub fn split_compressed(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(|token| {
            if token.contains(SPACE_ESCAPE) {
                token.replace(SPACE_ESCAPE, " ")
            } else {
                token.to_owned()
            }
        })
        .collect()
}

/// Parses a boolean token case-insensitively.
///
/// Accepted true spellings: `yes`, `true`, `1`, `on`; false spellings:
/// `no`, `false`, `0`, `off`. Anything else is an error.
pub fn parse_bool(token: &str) -> Result<bool, ConfigError> {
    match token.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::value(format!(
            "invalid boolean value '{token}'"
        ))),
    }
}

/// Parses an integer token, rejecting anything non-numeric.
pub fn parse_int(token: &str) -> Result<i64, ConfigError> {
    token
        .parse::<i64>()
        .map_err(|_| ConfigError::value(format!("invalid numeric value '{token}'")))
}

/// Parses a non-negative integer token.
pub fn parse_nonneg(token: &str) -> Result<i64, ConfigError> {
    let value = parse_int(token)?;
    if value < 0 {
        return Err(ConfigError::value(format!(
            "value '{token}' must be zero or larger"
        )));
    }
    Ok(value)
}

/// Parses a size expressed in the config's kilobyte base unit.
///
/// A bare number is taken as kilobytes; `K`, `M`, and `G` suffixes
/// (case-insensitive) scale accordingly. `*` means unlimited and maps
/// to `-1`.
pub fn parse_size(token: &str) -> Result<i64, ConfigError> {
    if token == "*" {
        return Ok(-1);
    }

    let (digits, multiplier) = match token.chars().next_back() {
        Some('k' | 'K') => (&token[..token.len() - 1], 1),
        Some('m' | 'M') => (&token[..token.len() - 1], 1024),
        Some('g' | 'G') => (&token[..token.len() - 1], 1024 * 1024),
        Some(ch) if ch.is_ascii_digit() => (token, 1),
        _ => {
            return Err(ConfigError::value(format!("invalid size '{token}'")));
        }
    };

    let value: i64 = digits
        .parse()
        .map_err(|_| ConfigError::value(format!("invalid size '{token}'")))?;
    if value < 0 {
        return Err(ConfigError::value(format!(
            "size '{token}' must not be negative"
        )));
    }
    value
        .checked_mul(multiplier)
        .ok_or_else(|| ConfigError::value(format!("size '{token}' is out of range")))
}

/// Formats a kilobyte count with the largest exact unit suffix.
///
/// Inverse of [`parse_size`] for representable values: `-1` renders as
/// `*` and `parse_size(format_size(x)) == x` holds for `x >= -1`.
#[must_use]
pub fn format_size(kilobytes: i64) -> String {
    const MEGA: i64 = 1024;
    const GIGA: i64 = 1024 * 1024;
    if kilobytes == -1 {
        "*".to_owned()
    } else if kilobytes != 0 && kilobytes % GIGA == 0 {
        format!("{}G", kilobytes / GIGA)
    } else if kilobytes != 0 && kilobytes % MEGA == 0 {
        format!("{}M", kilobytes / MEGA)
    } else {
        format!("{kilobytes}K")
    }
}

/// Anchored glob match: `*` matches any run of characters, `?` exactly
/// one. The whole text must match, never a substring.
///
/// Patterns that fail to compile match nothing.
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    let Ok(glob) = GlobBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
    else {
        return false;
    };
    glob.compile_matcher().is_match(text)
}

/// Returns `true` when any of the patterns matches the text
/// (case-sensitively).
#[must_use]
pub fn wildcard_match_any<S: AsRef<str>>(patterns: &[S], text: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| wildcard_match(pattern.as_ref(), text, false))
}
