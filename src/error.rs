#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the reporter crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by every stage of the reporting pipeline.
///
/// Variants fall into two failure domains: collecting audit data (`Config`,
/// `PayloadIo`, `PayloadParse`, `Api`) and publishing the report (`Csv`,
/// `Api`, `Conflict`). The binary surfaces the display string of whichever
/// error ends the run.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Returned when run options are missing or malformed.
    #[error("invalid configuration: {message}")]
    Config {
        /// Human readable message describing the configuration problem.
        message: String
    },
    /// Wraps I/O errors that occur while reading the workflow event payload.
    #[error("failed to read event payload from {path:?}: {source}")]
    PayloadIo {
        /// Location of the event payload file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps JSON decoding errors of the workflow event payload.
    #[error("failed to parse event payload at {path:?}: {source}")]
    PayloadParse {
        /// Location of the event payload file.
        path:   PathBuf,
        /// Source decoding error from serde_json.
        source: serde_json::Error
    },
    /// GitHub API failures other than write conflicts.
    #[error("GitHub API error: {message}")]
    Api {
        /// Human readable message describing the API failure.
        message: String
    },
    /// The report path changed underneath the write request.
    #[error("conflicting write to {path}: {message}")]
    Conflict {
        /// Repository path of the report file.
        path:    String,
        /// Message reported by the API.
        message: String
    },
    /// Wraps CSV serialization errors.
    #[error("failed to serialize report: {source}")]
    Csv {
        /// Underlying CSV writer error.
        source: csv::Error
    }
}

impl Error {
    /// Constructs a configuration error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the configuration failure.
    pub fn config<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Config {
            message: message.into()
        }
    }

    /// Constructs an API error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the API failure.
    pub fn api<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Api {
            message: message.into()
        }
    }

    /// Reports whether repeating the failed operation may succeed.
    ///
    /// Only write conflicts qualify; every other variant is deterministic for
    /// the given inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<csv::Error> for Error {
    fn from(source: csv::Error) -> Self {
        Self::Csv {
            source
        }
    }
}

/// Creates an [`Error::PayloadIo`] variant capturing the failing path and
/// source.
pub fn payload_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::PayloadIo {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::PayloadParse`] variant capturing the failing path and
/// source.
pub fn payload_parse_error(path: &Path, source: serde_json::Error) -> Error {
    Error::PayloadParse {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn config_constructor_populates_message() {
        let error = Error::config("days must be positive");
        match error {
            Error::Config {
                ref message
            } => {
                assert_eq!(message, "days must be positive");
            }
            other => panic!("expected config error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::api("rate limited");
        assert_eq!(error.to_string(), error.to_display_string());
        assert_eq!(error.to_display_string(), "GitHub API error: rate limited");
    }

    #[test]
    fn only_conflicts_are_retryable() {
        let conflict = Error::Conflict {
            path:    "reports/acme.csv".to_owned(),
            message: "is at 1234 but expected 5678".to_owned()
        };
        assert!(conflict.is_retryable());
        assert!(!Error::api("boom").is_retryable());
        assert!(!Error::config("bad").is_retryable());
    }

    #[test]
    fn payload_io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/event.json");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::payload_io_error(path, io_error);

        match error {
            Error::PayloadIo {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected payload io error, got {other:?}")
        }
    }

    #[test]
    fn payload_parse_error_helper_keeps_path() {
        let path = std::path::Path::new("/tmp/event.json");
        let source = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let error = super::payload_parse_error(path, source);
        assert!(matches!(error, Error::PayloadParse { .. }));
        assert!(error.to_string().contains("/tmp/event.json"));
    }

    #[test]
    fn csv_conversion_maps_to_csv_variant() {
        let io_error = std::io::Error::other("disk full");
        let mapped: Error = csv::Error::from(io_error).into();
        assert!(matches!(mapped, Error::Csv { .. }));
    }
}
