use std::io;
use std::path::{Path, PathBuf};

use acl::MalformedAcl;
use thiserror::Error;

/// Errors produced while loading or validating a configuration file.
///
/// Only [`ConfigError::NoSetting`] is recoverable during a bulk parse (the
/// loader logs the keyword and skips the line); every other variant aborts
/// the load. Errors raised for a specific line are wrapped in
/// [`ConfigError::At`] carrying the file path and line number.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("unable to open config file '{}': {source}", .path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The keyword does not name any known setting.
    #[error("unknown setting '{keyword}'")]
    NoSetting {
        /// The unrecognised keyword, lower-cased.
        keyword: String,
    },
    /// A required setting never appeared in the file.
    #[error("missing required setting '{keyword}'")]
    Required {
        /// The missing keyword.
        keyword: &'static str,
    },
    /// A directive carried the wrong number of arguments.
    #[error("wrong number of parameters for '{keyword}'")]
    ParameterCount {
        /// The offending keyword.
        keyword: String,
    },
    /// A value failed validation (bad number, unknown enumeration,
    /// malformed ACL, out-of-range port, ...).
    #[error("{message}")]
    InvalidValue {
        /// Human-readable description naming the offending value.
        message: String,
    },
    /// A parse error annotated with its position in the config file.
    #[error("{} line {line}: {source}", .path.display())]
    At {
        /// Config file the error occurred in.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The wrapped error.
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    pub(crate) fn value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    pub(crate) fn parameter_count(keyword: impl Into<String>) -> Self {
        Self::ParameterCount {
            keyword: keyword.into(),
        }
    }

    pub(crate) fn at(self, path: &Path, line: usize) -> Self {
        Self::At {
            path: path.to_path_buf(),
            line,
            source: Box::new(self),
        }
    }

    /// Returns the line number the error was reported at, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::At { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<MalformedAcl> for ConfigError {
    fn from(err: MalformedAcl) -> Self {
        Self::value(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigError;
    use std::path::Path;

    #[test]
    fn at_wrapper_includes_path_and_line() {
        let err = ConfigError::value("bad value").at(Path::new("ebftpd.conf"), 12);
        let rendered = err.to_string();
        assert!(rendered.contains("ebftpd.conf"));
        assert!(rendered.contains("line 12"));
        assert!(rendered.contains("bad value"));
        assert_eq!(err.line(), Some(12));
    }

    #[test]
    fn unwrapped_errors_have_no_line() {
        let err = ConfigError::parameter_count("max_users");
        assert_eq!(err.line(), None);
        assert!(err.to_string().contains("max_users"));
    }
}
