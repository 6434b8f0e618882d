// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types and the diagnostic reporting channel.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for i18n operations.
pub type Result<T> = std::result::Result<T, I18nError>;

/// Top-level error type for the translation facade.
#[derive(Debug, Error)]
pub enum I18nError {
	#[error(transparent)]
	InvalidRequest(#[from] InvalidRequestError),

	#[error(transparent)]
	Diagnostic(#[from] Diagnostic),

	#[error("Failed to build catalog for locale '{locale}': {source}")]
	Catalog {
		locale: String,
		#[source]
		source: gettext::Error,
	},

	#[error("Invalid Plural-Forms for locale '{locale}': {source}")]
	PluralForms {
		locale: String,
		#[source]
		source: PluralFormsError,
	},

	#[error("Invalid locale data: {0}")]
	InvalidLocaleData(String),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Raised when a translate call carries no usable source string.
///
/// This is a programming error on the caller's side rather than a runtime
/// condition to recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("translate() called without a string value as the original text (received {received})")]
pub struct InvalidRequestError {
	pub received: String,
}

/// Non-fatal conditions routed through [`ErrorReporter`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
	#[error(
		"Deprecated invocation: translate() accepts (string, [string], [options]); \
		 received {received}"
	)]
	DeprecatedInvocation { received: String },

	#[error(
		"Invalid invocation: plural translations require an options object with a count; \
		 received {received}"
	)]
	AmbiguousPlural { received: String },

	#[error("Plural translation of '{original}' requested without a count")]
	MissingCount { original: String },

	#[error("Interpolation failed for '{format}': {source}")]
	Interpolation {
		format: String,
		#[source]
		source: SprintfError,
	},
}

/// Errors produced while interpolating values into a format string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SprintfError {
	#[error("unexpected placeholder at byte {0}")]
	UnexpectedPlaceholder(usize),

	#[error("missing argument {0}")]
	MissingArgument(usize),

	#[error("property '{0}' does not exist")]
	MissingProperty(String),

	#[error("mixing positional and named placeholders is not supported")]
	MixedPlaceholders,

	#[error("expecting number for '%{conversion}' but found {found}")]
	ExpectingNumber { conversion: char, found: String },
}

/// Errors in a gettext `Plural-Forms` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluralFormsError {
	#[error("missing 'plural=' expression")]
	MissingExpression,

	#[error("invalid nplurals value '{0}'")]
	InvalidCount(String),

	#[error("syntax error in '{expression}' at byte {offset}")]
	Syntax { expression: String, offset: usize },

	#[error("'%' requires a non-zero integer literal on the right")]
	InvalidModulus,
}

/// The single channel every diagnostic goes through.
///
/// In strict mode a diagnostic becomes an error returned to the caller; in
/// lenient mode it is logged as a warning and the call carries on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorReporter {
	strict: bool,
}

impl ErrorReporter {
	pub fn new(strict: bool) -> Self {
		Self { strict }
	}

	pub fn is_strict(&self) -> bool {
		self.strict
	}

	/// Report a diagnostic.
	///
	/// Returns `Err` only in strict mode.
	pub fn report(&self, diagnostic: Diagnostic) -> Result<()> {
		if self.strict {
			return Err(diagnostic.into());
		}
		tracing::warn!(%diagnostic, "i18n diagnostic");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tracing_test::traced_test;

	fn missing_count() -> Diagnostic {
		Diagnostic::MissingCount {
			original: "apple".to_string(),
		}
	}

	#[test]
	fn test_strict_reporter_returns_error() {
		let reporter = ErrorReporter::new(true);
		let err = reporter.report(missing_count()).unwrap_err();
		assert!(matches!(
			err,
			I18nError::Diagnostic(Diagnostic::MissingCount { .. })
		));
	}

	#[traced_test]
	#[test]
	fn test_lenient_reporter_logs_warning() {
		let reporter = ErrorReporter::default();
		assert!(!reporter.is_strict());
		assert!(reporter.report(missing_count()).is_ok());
		assert!(logs_contain("requested without a count"));
	}

	#[test]
	fn test_interpolation_diagnostic_message() {
		let diagnostic = Diagnostic::Interpolation {
			format: "%d apples".to_string(),
			source: SprintfError::ExpectingNumber {
				conversion: 'd',
				found: "\"many\"".to_string(),
			},
		};
		let message = diagnostic.to_string();
		assert!(message.contains("%d apples"));
		assert!(message.contains("expecting number"));
	}

	#[test]
	fn test_invalid_request_message() {
		let err = I18nError::from(InvalidRequestError {
			received: "[]".to_string(),
		});
		assert!(err.to_string().contains("without a string value"));
	}
}
