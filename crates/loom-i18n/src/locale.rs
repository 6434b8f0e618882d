// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The active locale: catalog, backend binding, number settings and cache.

use std::num::NonZeroUsize;

use crate::cache::TranslationCache;
use crate::catalog::{CatalogBackend, LocaleData};
use crate::error::Result;
use crate::request::TranslationRequest;

/// Default locale used when none is supplied.
pub const DEFAULT_LOCALE: &str = "en";

/// Reserved catalog key carrying the locale's decimal point.
pub const DECIMAL_POINT_KEY: &str = "number_format_decimals";

/// Reserved catalog key carrying the locale's thousands separator.
pub const THOUSANDS_SEP_KEY: &str = "number_format_thousands_sep";

/// Separators derived from the active catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormatSettings {
	pub decimal_point: String,
	pub thousands_sep: String,
}

impl Default for NumberFormatSettings {
	fn default() -> Self {
		Self {
			decimal_point: ".".to_string(),
			thousands_sep: ",".to_string(),
		}
	}
}

impl NumberFormatSettings {
	/// Resolve the reserved keys through the backend, keeping the defaults
	/// for keys that come back untranslated.
	fn derive(backend: &CatalogBackend) -> Self {
		let defaults = Self::default();
		let lookup = |key: &str, fallback: String| {
			let translated = backend.resolve(&TranslationRequest::text(key));
			if translated == key {
				fallback
			} else {
				translated
			}
		};

		Self {
			decimal_point: lookup(DECIMAL_POINT_KEY, defaults.decimal_point),
			thousands_sep: lookup(THOUSANDS_SEP_KEY, defaults.thousands_sep),
		}
	}
}

/// Mutable locale state owned by one engine.
#[derive(Debug)]
pub struct LocaleState {
	default_slug: String,
	locale_slug: String,
	locale: LocaleData,
	backend: CatalogBackend,
	number_format: NumberFormatSettings,
	cache: TranslationCache,
}

impl LocaleState {
	/// Start on the default locale with an empty catalog.
	pub fn new(default_slug: impl Into<String>, cache_capacity: NonZeroUsize) -> Self {
		let default_slug = default_slug.into();
		Self {
			locale_slug: default_slug.clone(),
			locale: LocaleData::new(default_slug.clone()),
			default_slug,
			backend: CatalogBackend::empty(),
			number_format: NumberFormatSettings::default(),
			cache: TranslationCache::new(cache_capacity),
		}
	}

	/// Replace the active locale.
	///
	/// `None`, or data without a slug, selects the default locale with an
	/// empty catalog. Re-setting the current non-default slug is a no-op.
	/// Returns whether the state changed.
	pub fn set_locale(&mut self, locale: Option<LocaleData>) -> Result<bool> {
		let locale = match locale {
			Some(data) if data.locale_slug().is_some() => data,
			_ => LocaleData::new(self.default_slug.clone()),
		};
		let slug = locale.locale_slug().unwrap_or(&self.default_slug).to_string();

		if slug != self.default_slug && slug == self.locale_slug {
			tracing::debug!(locale = %slug, "locale unchanged, skipping reload");
			return Ok(false);
		}

		let backend = CatalogBackend::from_locale(&locale)?;
		self.number_format = NumberFormatSettings::derive(&backend);
		self.backend = backend;
		self.locale = locale;
		self.cache.clear();

		tracing::debug!(
			locale = %slug,
			messages = self.locale.len(),
			decimal_point = %self.number_format.decimal_point,
			thousands_sep = %self.number_format.thousands_sep,
			"locale set"
		);
		self.locale_slug = slug;
		Ok(true)
	}

	/// Merge messages into the live catalog.
	///
	/// The slug and number settings are left as they are, even if the
	/// additions overwrite the reserved number format keys.
	pub fn add_translations(&mut self, additions: LocaleData) -> Result<()> {
		let added = additions.len();
		let mut merged = self.locale.clone();
		merged.merge(additions);

		self.backend = CatalogBackend::from_locale(&merged)?;
		self.locale = merged;
		self.cache.clear();

		tracing::debug!(locale = %self.locale_slug, added, "translations added");
		Ok(())
	}

	/// Drop every cached translation.
	pub fn clear_cache(&mut self) {
		self.cache.clear();
	}

	pub fn locale(&self) -> &LocaleData {
		&self.locale
	}

	pub fn locale_slug(&self) -> &str {
		&self.locale_slug
	}

	pub fn number_format(&self) -> &NumberFormatSettings {
		&self.number_format
	}

	pub fn backend(&self) -> &CatalogBackend {
		&self.backend
	}

	pub fn cache(&self) -> &TranslationCache {
		&self.cache
	}

	pub fn cache_mut(&mut self) -> &mut TranslationCache {
		&mut self.cache
	}
}
