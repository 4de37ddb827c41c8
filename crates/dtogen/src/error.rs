// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error surface of the generator.
//!
//! Everything here is structural: broken source, malformed markers, colliding
//! type names, invalid configuration. Per-member problems (an unresolvable
//! synthetic chain, a method signature that cannot be mapped) are not errors;
//! they are logged and the member is skipped, mirroring the soft contract
//! between entity and DTO.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal generation failure.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A source file or output path could not be read or written.
    #[error("failed to access {path}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A source file is not parseable Rust.
    #[error("failed to parse {path}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying syntax error.
        #[source]
        source: syn::Error,
    },

    /// Two model types share a qualified name, or two entities map to the
    /// same DTO name.
    #[error("duplicate type definition: {name}")]
    DuplicateType {
        /// Colliding qualified or generated name.
        name: String,
    },

    /// The configuration could not be built.
    #[error("invalid configuration: {message}")]
    Config {
        /// Human-readable description of the problem.
        message: String,
    },

    /// A marker attribute does not match its schema.
    #[error("malformed marker attribute")]
    Attr(#[from] darling::Error),

    /// An emitted module failed to re-parse before writing.
    ///
    /// This indicates a bug in the emitters, not in user input.
    #[error("generated module `{name}` is not valid Rust")]
    InvalidOutput {
        /// Module that failed validation.
        name: String,
        /// Underlying syntax error.
        #[source]
        source: syn::Error,
    },
}

impl GeneratorError {
    /// Wraps an I/O failure with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_displays_path() {
        let err = GeneratorError::io(
            "/tmp/model.rs",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "failed to access /tmp/model.rs");
    }

    #[test]
    fn duplicate_type_names_the_collision() {
        let err = GeneratorError::DuplicateType {
            name: "domain::User".into(),
        };
        assert!(err.to_string().contains("domain::User"));
    }

    #[test]
    fn darling_errors_convert() {
        let err: GeneratorError = darling::Error::unknown_field("bogus").into();
        assert!(matches!(err, GeneratorError::Attr(_)));
    }
}
