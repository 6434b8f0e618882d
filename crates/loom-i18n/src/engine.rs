// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The translation engine facade.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::catalog::LocaleData;
use crate::config::I18nConfig;
use crate::error::{Diagnostic, ErrorReporter, Result};
use crate::hooks::HookPipeline;
use crate::locale::{LocaleState, NumberFormatSettings};
use crate::notifier::{ChangeNotifier, ListenerId};
use crate::number_format::{format_number, NumberFormatOptions};
use crate::request::{normalize, Normalized, TranslateCall, TranslationRequest};
use crate::sprintf::sprintf;

/// Translation engine: one active locale, a translation cache, translate
/// hooks and `change` listeners.
///
/// `I18n` is a cheap handle; clones share the same state. It is meant to be
/// created once and threaded through a UI tree on a single thread.
#[derive(Clone)]
pub struct I18n {
	inner: Rc<Inner>,
}

struct Inner {
	config: RefCell<I18nConfig>,
	state: RefCell<LocaleState>,
	hooks: RefCell<HookPipeline>,
	notifier: ChangeNotifier,
}

impl I18n {
	/// Engine on the default configuration and the default locale.
	pub fn new() -> Self {
		Self::with_config(I18nConfig::default())
	}

	pub fn with_config(config: I18nConfig) -> Self {
		let state = LocaleState::new(config.default_locale_slug.clone(), config.cache_capacity);
		Self {
			inner: Rc::new(Inner {
				config: RefCell::new(config),
				state: RefCell::new(state),
				hooks: RefCell::new(HookPipeline::new()),
				notifier: ChangeNotifier::new(),
			}),
		}
	}

	/// Apply a new configuration and reset to its default locale.
	///
	/// Hooks and listeners are kept; listeners are notified.
	pub fn configure(&self, config: I18nConfig) {
		let state = LocaleState::new(config.default_locale_slug.clone(), config.cache_capacity);
		tracing::debug!(
			default_locale = %config.default_locale_slug,
			strict = config.throw_errors,
			cache_capacity = config.cache_capacity.get(),
			"i18n configured"
		);
		*self.inner.config.borrow_mut() = config;
		*self.inner.state.borrow_mut() = state;
		self.inner.notifier.emit();
	}

	pub fn config(&self) -> I18nConfig {
		self.inner.config.borrow().clone()
	}

	fn reporter(&self) -> ErrorReporter {
		ErrorReporter::new(self.inner.config.borrow().throw_errors)
	}

	/// Switch locale. `None` selects the default locale.
	///
	/// Setting the current non-default locale again does nothing. Otherwise
	/// the catalog is replaced, the cache cleared, and listeners notified
	/// after the new state is in place.
	pub fn set_locale(&self, locale: impl Into<Option<LocaleData>>) -> Result<()> {
		let changed = self.inner.state.borrow_mut().set_locale(locale.into())?;
		if changed {
			self.inner.notifier.emit();
		}
		Ok(())
	}

	/// The active locale data, including merged additions.
	pub fn locale(&self) -> LocaleData {
		self.inner.state.borrow().locale().clone()
	}

	pub fn locale_slug(&self) -> String {
		self.inner.state.borrow().locale_slug().to_string()
	}

	/// Merge messages into the active catalog, overwriting matching keys.
	pub fn add_translations(&self, additions: LocaleData) -> Result<()> {
		self.inner.state.borrow_mut().add_translations(additions)?;
		self.inner.notifier.emit();
		Ok(())
	}

	/// Drop cached translations and notify listeners, for changes made
	/// outside `set_locale`/`add_translations` (e.g. a newly added hook).
	pub fn re_render_translations(&self) {
		tracing::debug!("re-rendering all translations due to external request");
		self.inner.state.borrow_mut().clear_cache();
		self.inner.notifier.emit();
	}

	/// Append a hook run on every freshly resolved translation.
	///
	/// Already cached translations are not re-processed until the next
	/// cache clear.
	pub fn register_translate_hook(
		&self,
		hook: impl Fn(String, &TranslationRequest) -> String + 'static,
	) {
		self.inner.hooks.borrow_mut().register(hook);
	}

	pub fn translate_hook_count(&self) -> usize {
		self.inner.hooks.borrow().len()
	}

	/// Listen for the `change` event.
	pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
		self.inner.notifier.subscribe(listener)
	}

	pub fn unsubscribe(&self, id: ListenerId) -> bool {
		self.inner.notifier.unsubscribe(id)
	}

	pub fn listener_count(&self) -> usize {
		self.inner.notifier.listener_count()
	}

	/// Translate a message.
	///
	/// Missing translations fall back to the source text. Errors are
	/// returned only for calls without a source string, or for
	/// diagnostics in strict mode.
	pub fn translate(&self, call: impl Into<TranslateCall>) -> Result<String> {
		let Normalized {
			request,
			diagnostics,
		} = normalize(call)?;

		let reporter = self.reporter();
		for diagnostic in diagnostics {
			reporter.report(diagnostic)?;
		}

		let cache_key = request.cache_key();
		if let Some(key) = &cache_key {
			let cached = self.inner.state.borrow_mut().cache_mut().get(key);
			if let Some(translation) = cached {
				tracing::trace!(original = %request.original(), "translation cache hit");
				return Ok(translation);
			}
		}

		let mut translation = self.inner.state.borrow().backend().resolve(&request);

		if let Some(args) = request.args() {
			match sprintf(&translation, args) {
				Ok(interpolated) => translation = interpolated,
				Err(source) => reporter.report(Diagnostic::Interpolation {
					format: translation.clone(),
					source,
				})?,
			}
		}

		let hooks = self.inner.hooks.borrow().clone();
		let translation = hooks.apply(translation, &request);

		if let Some(key) = cache_key {
			tracing::trace!(original = %request.original(), "translation cached");
			self.inner
				.state
				.borrow_mut()
				.cache_mut()
				.put(key, translation.clone());
		}

		Ok(translation)
	}

	/// Format a number with the locale's separators and no decimals.
	pub fn number_format(&self, number: f64) -> String {
		self.number_format_with(number, NumberFormatOptions::default())
	}

	/// Format a number; fields omitted from `options` fall back to the
	/// locale's settings.
	pub fn number_format_with(
		&self,
		number: f64,
		options: impl Into<NumberFormatOptions>,
	) -> String {
		let options = options.into();
		let settings = self.number_format_settings();
		let dec_point = options.dec_point.unwrap_or(settings.decimal_point);
		let thousands_sep = options.thousands_sep.unwrap_or(settings.thousands_sep);
		format_number(number, options.decimals.unwrap_or(0), &dec_point, &thousands_sep)
	}

	pub fn number_format_settings(&self) -> NumberFormatSettings {
		self.inner.state.borrow().number_format().clone()
	}

	/// Number of cached translations.
	pub fn cached_translations(&self) -> usize {
		self.inner.state.borrow().cache().len()
	}
}

impl Default for I18n {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for I18n {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("I18n")
			.field("config", &self.inner.config.borrow())
			.field("state", &self.inner.state.borrow())
			.field("hooks", &self.inner.hooks.borrow())
			.field("notifier", &self.inner.notifier)
			.finish()
	}
}
