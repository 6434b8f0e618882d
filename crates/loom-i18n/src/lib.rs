// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale-aware translation and number formatting for Loom.
//!
//! [`I18n`] holds one active locale at a time. It resolves singular, plural
//! and contextual strings through a GNU gettext catalog, interpolates
//! sprintf-style arguments, runs translate hooks, caches the results, and
//! notifies listeners whenever the locale or its catalog changes so UI code
//! can re-render.
//!
//! # Locale data
//!
//! Locales use the Jed JSON layout. The `""` key carries metadata, every
//! other key maps a message id to `[plural_id_or_null, forms...]`:
//!
//! ```json
//! {
//!   "": { "localeSlug": "de", "plural_forms": "nplurals=2; plural=(n != 1);" },
//!   "Settings": [null, "Einstellungen"],
//!   "file": ["files", "Datei", "Dateien"],
//!   "number_format_decimals": [null, ","],
//!   "number_format_thousands_sep": [null, "."]
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use loom_i18n::{I18n, LocaleData, TranslateOptions};
//!
//! let i18n = I18n::new();
//! i18n.set_locale(LocaleData::from_json(r#"{
//!     "": { "localeSlug": "de" },
//!     "Settings": [null, "Einstellungen"],
//!     "%d file": ["%d files", "%d Datei", "%d Dateien"],
//!     "number_format_decimals": [null, ","],
//!     "number_format_thousands_sep": [null, "."]
//! }"#).unwrap()).unwrap();
//!
//! assert_eq!(i18n.translate("Settings").unwrap(), "Einstellungen");
//!
//! let options = TranslateOptions::new().count(3).args(serde_json::json!([3]));
//! let files = i18n.translate(("%d file", "%d files", options)).unwrap();
//! assert_eq!(files, "3 Dateien");
//!
//! assert_eq!(i18n.number_format(1500.0), "1.500");
//! ```

mod cache;
mod catalog;
mod config;
mod engine;
mod error;
mod hooks;
mod locale;
mod notifier;
mod number_format;
mod plural;
mod request;
mod sprintf;

pub use cache::{TranslationCache, DEFAULT_CAPACITY};
pub use catalog::{
	context_key, CatalogBackend, CatalogEntry, LocaleData, LocaleMetadata, CONTEXT_SEPARATOR,
	METADATA_KEY,
};
pub use config::{ConfigError, I18nConfig, ENV_CACHE_CAPACITY, ENV_DEFAULT_LOCALE, ENV_STRICT};
pub use engine::I18n;
pub use error::{
	Diagnostic, ErrorReporter, I18nError, InvalidRequestError, PluralFormsError, Result,
	SprintfError,
};
pub use hooks::{HookPipeline, TranslateHook};
pub use locale::{
	LocaleState, NumberFormatSettings, DECIMAL_POINT_KEY, DEFAULT_LOCALE, THOUSANDS_SEP_KEY,
};
pub use notifier::{ChangeNotifier, ListenerId};
pub use number_format::{format_number, NumberFormatOptions, MAX_DECIMALS};
pub use plural::{BinaryOp, PluralExpr, PluralRule};
pub use request::{
	normalize, InterpolationArgs, LookupMode, NestedPlural, Normalized, OriginalText,
	TranslateArg, TranslateCall, TranslateOptions, TranslationRequest,
};
pub use sprintf::{format_values, sprintf};
