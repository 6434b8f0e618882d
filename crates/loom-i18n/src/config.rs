// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Engine configuration.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CAPACITY;
use crate::locale::DEFAULT_LOCALE;

/// Environment variable overriding the default locale slug.
pub const ENV_DEFAULT_LOCALE: &str = "LOOM_I18N_DEFAULT_LOCALE";
/// Environment variable enabling strict mode.
pub const ENV_STRICT: &str = "LOOM_I18N_STRICT";
/// Environment variable overriding the translation cache capacity.
pub const ENV_CACHE_CAPACITY: &str = "LOOM_I18N_CACHE_CAPACITY";

/// Errors that can occur while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	/// Invalid value
	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },
}

impl ConfigError {
	/// Create an invalid value error
	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}

/// Configuration for an [`I18n`](crate::I18n) engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
	/// Slug used when no locale (or no slug) is supplied.
	pub default_locale_slug: String,
	/// Strict mode: diagnostics become errors instead of warnings.
	pub throw_errors: bool,
	/// Maximum number of cached translations.
	pub cache_capacity: NonZeroUsize,
}

impl Default for I18nConfig {
	fn default() -> Self {
		Self {
			default_locale_slug: DEFAULT_LOCALE.to_string(),
			throw_errors: false,
			cache_capacity: DEFAULT_CAPACITY,
		}
	}
}

impl I18nConfig {
	/// Load the defaults and apply `LOOM_I18N_*` environment overrides.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::default().with_overrides(|key| std::env::var(key).ok())
	}

	/// Apply overrides from an arbitrary key lookup.
	///
	/// Empty values are ignored.
	pub fn with_overrides(
		mut self,
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<Self, ConfigError> {
		let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

		if let Some(slug) = get(ENV_DEFAULT_LOCALE) {
			self.default_locale_slug = slug.trim().to_string();
		}

		if let Some(strict) = get(ENV_STRICT) {
			self.throw_errors = parse_bool(&strict).ok_or_else(|| {
				let reason = format!("expected a boolean, got '{strict}'");
				ConfigError::invalid_value(ENV_STRICT, reason)
			})?;
		}

		if let Some(capacity) = get(ENV_CACHE_CAPACITY) {
			self.cache_capacity = capacity.trim().parse::<NonZeroUsize>().map_err(|e| {
				ConfigError::invalid_value(ENV_CACHE_CAPACITY, format!("'{capacity}': {e}"))
			})?;
		}

		Ok(self)
	}

	pub fn with_default_locale(mut self, slug: impl Into<String>) -> Self {
		self.default_locale_slug = slug.into();
		self
	}

	pub fn with_throw_errors(mut self, throw_errors: bool) -> Self {
		self.throw_errors = throw_errors;
		self
	}

	pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
		self.cache_capacity = capacity;
		self
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}
