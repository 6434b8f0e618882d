// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translate call shapes and their normalization into a canonical request.
//!
//! Every way of calling `translate()` is expressed as a [`TranslateCall`].
//! [`normalize`] turns any of them into one [`TranslationRequest`], collecting
//! non-fatal [`Diagnostic`]s for deprecated or ambiguous shapes along the way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Diagnostic, InvalidRequestError};

/// Values interpolated into a translated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterpolationArgs {
	/// Named placeholders, e.g. `%(name)s`.
	Named(BTreeMap<String, Value>),
	/// Positional placeholders, e.g. `%1$s` or sequential `%s`.
	Positional(Vec<Value>),
	/// Shorthand for a single positional value.
	Single(Value),
}

impl InterpolationArgs {
	/// Classify an arbitrary JSON value by its shape.
	pub fn from_value(value: Value) -> Self {
		match value {
			Value::Object(map) => Self::Named(map.into_iter().collect()),
			Value::Array(values) => Self::Positional(values),
			other => Self::Single(other),
		}
	}

	/// The positional argument list handed to the formatter.
	///
	/// Named arguments travel as a single mapping in first position.
	pub fn to_argv(&self) -> Vec<Value> {
		match self {
			Self::Named(map) => vec![Value::Object(
				map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
			)],
			Self::Positional(values) => values.clone(),
			Self::Single(value) => vec![value.clone()],
		}
	}
}

impl From<Value> for InterpolationArgs {
	fn from(value: Value) -> Self {
		Self::from_value(value)
	}
}

impl From<&str> for InterpolationArgs {
	fn from(value: &str) -> Self {
		Self::Single(Value::String(value.to_string()))
	}
}

impl From<String> for InterpolationArgs {
	fn from(value: String) -> Self {
		Self::Single(Value::String(value))
	}
}

impl From<Vec<Value>> for InterpolationArgs {
	fn from(values: Vec<Value>) -> Self {
		Self::Positional(values)
	}
}

impl From<BTreeMap<String, Value>> for InterpolationArgs {
	fn from(map: BTreeMap<String, Value>) -> Self {
		Self::Named(map)
	}
}

/// Legacy nested plural description: `{ single, plural, count }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedPlural {
	#[serde(default)]
	pub single: Option<String>,
	#[serde(default)]
	pub plural: Option<String>,
	/// Same contract as [`TranslateOptions::count`].
	#[serde(default)]
	pub count: Option<u64>,
}

/// The `original` field of an options mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginalText {
	Text(String),
	Nested(NestedPlural),
}

/// Options accepted by `translate()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
	pub original: Option<OriginalText>,
	pub plural: Option<String>,
	/// Plural selector. Must be a non-negative integer: a fractional or
	/// negative JSON count fails deserialization instead of being truncated.
	pub count: Option<u64>,
	pub context: Option<String>,
	pub comment: Option<String>,
	pub args: Option<InterpolationArgs>,
	pub components: Option<BTreeMap<String, Value>>,
}

impl TranslateOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn original(mut self, original: impl Into<String>) -> Self {
		self.original = Some(OriginalText::Text(original.into()));
		self
	}

	/// Legacy form carrying singular, plural and count inside `original`.
	pub fn nested_plural(
		mut self,
		single: impl Into<String>,
		plural: impl Into<String>,
		count: u64,
	) -> Self {
		self.original = Some(OriginalText::Nested(NestedPlural {
			single: Some(single.into()),
			plural: Some(plural.into()),
			count: Some(count),
		}));
		self
	}

	pub fn plural(mut self, plural: impl Into<String>) -> Self {
		self.plural = Some(plural.into());
		self
	}

	pub fn count(mut self, count: u64) -> Self {
		self.count = Some(count);
		self
	}

	pub fn context(mut self, context: impl Into<String>) -> Self {
		self.context = Some(context.into());
		self
	}

	pub fn comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	pub fn args(mut self, args: impl Into<InterpolationArgs>) -> Self {
		self.args = Some(args.into());
		self
	}

	pub fn components(mut self, components: BTreeMap<String, Value>) -> Self {
		self.components = Some(components);
		self
	}
}

/// One positional argument of a raw translate call.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateArg {
	Text(String),
	Options(TranslateOptions),
}

impl From<&str> for TranslateArg {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for TranslateArg {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<TranslateOptions> for TranslateArg {
	fn from(options: TranslateOptions) -> Self {
		Self::Options(options)
	}
}

/// Every supported translate call shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateCall {
	/// `translate(original)`
	Text(String),
	/// `translate(original, options)`
	WithOptions(String, TranslateOptions),
	/// `translate(original, plural, options)`
	Plural(String, String, TranslateOptions),
	/// `translate(options)` with the original embedded in the options.
	Options(TranslateOptions),
	/// An untyped argument list, validated at normalization time.
	Args(Vec<TranslateArg>),
}

impl TranslateCall {
	fn into_args(self) -> Vec<TranslateArg> {
		match self {
			Self::Text(original) => vec![TranslateArg::Text(original)],
			Self::WithOptions(original, options) => {
				vec![TranslateArg::Text(original), TranslateArg::Options(options)]
			}
			Self::Plural(original, plural, options) => vec![
				TranslateArg::Text(original),
				TranslateArg::Text(plural),
				TranslateArg::Options(options),
			],
			Self::Options(options) => vec![TranslateArg::Options(options)],
			Self::Args(args) => args,
		}
	}
}

impl From<&str> for TranslateCall {
	fn from(original: &str) -> Self {
		Self::Text(original.to_string())
	}
}

impl From<String> for TranslateCall {
	fn from(original: String) -> Self {
		Self::Text(original)
	}
}

impl From<(&str, TranslateOptions)> for TranslateCall {
	fn from((original, options): (&str, TranslateOptions)) -> Self {
		Self::WithOptions(original.to_string(), options)
	}
}

impl From<(&str, &str, TranslateOptions)> for TranslateCall {
	fn from((original, plural, options): (&str, &str, TranslateOptions)) -> Self {
		Self::Plural(original.to_string(), plural.to_string(), options)
	}
}

impl From<TranslateOptions> for TranslateCall {
	fn from(options: TranslateOptions) -> Self {
		Self::Options(options)
	}
}

impl From<Vec<TranslateArg>> for TranslateCall {
	fn from(args: Vec<TranslateArg>) -> Self {
		Self::Args(args)
	}
}

/// Which gettext entry point resolves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupMode {
	Gettext,
	Ngettext,
	Pgettext,
	Npgettext,
}

/// Canonical, immutable description of one translation.
///
/// Field order is part of the cache key; do not reorder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRequest {
	original: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	plural: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	count: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	context: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	comment: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	args: Option<InterpolationArgs>,
	#[serde(skip_serializing_if = "Option::is_none")]
	components: Option<BTreeMap<String, Value>>,
}

impl TranslationRequest {
	/// A plain request for `original` with no options.
	pub fn text(original: impl Into<String>) -> Self {
		Self {
			original: original.into(),
			plural: None,
			count: None,
			context: None,
			comment: None,
			args: None,
			components: None,
		}
	}

	pub fn original(&self) -> &str {
		&self.original
	}

	pub fn plural(&self) -> Option<&str> {
		self.plural.as_deref()
	}

	pub fn count(&self) -> Option<u64> {
		self.count
	}

	pub fn context(&self) -> Option<&str> {
		self.context.as_deref()
	}

	pub fn comment(&self) -> Option<&str> {
		self.comment.as_deref()
	}

	pub fn args(&self) -> Option<&InterpolationArgs> {
		self.args.as_ref()
	}

	pub fn components(&self) -> Option<&BTreeMap<String, Value>> {
		self.components.as_ref()
	}

	/// Requests carrying components are spliced around rich content and
	/// are never cached.
	pub fn is_cacheable(&self) -> bool {
		self.components.is_none()
	}

	pub fn lookup_mode(&self) -> LookupMode {
		match (self.context.is_some(), self.plural.is_some()) {
			(false, false) => LookupMode::Gettext,
			(false, true) => LookupMode::Ngettext,
			(true, false) => LookupMode::Pgettext,
			(true, true) => LookupMode::Npgettext,
		}
	}

	/// Deterministic serialization of the request, or `None` when the
	/// request is not cacheable.
	pub fn cache_key(&self) -> Option<String> {
		if !self.is_cacheable() {
			return None;
		}
		match serde_json::to_string(self) {
			Ok(key) => Some(key),
			Err(e) => {
				tracing::warn!(
					error = %e,
					original = %self.original,
					"failed to serialize translation request"
				);
				None
			}
		}
	}
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
	pub request: TranslationRequest,
	pub diagnostics: Vec<Diagnostic>,
}

/// Turn any translate call into a canonical request.
///
/// Rules, applied in order:
///
/// 1. The last options mapping among the arguments wins.
/// 2. A leading string becomes `original`; otherwise a nested
///    `{ single, plural, count }` original is unpacked.
/// 3. A string in second position sets `plural`, overriding the unpack.
///
/// Fails only when no string `original` can be established.
pub fn normalize(call: impl Into<TranslateCall>) -> Result<Normalized, InvalidRequestError> {
	let args = call.into().into_args();
	let mut diagnostics = Vec::new();

	let later_options = args
		.iter()
		.skip(1)
		.filter(|arg| matches!(arg, TranslateArg::Options(_)))
		.count();
	if args.len() > 3 || later_options > 1 {
		diagnostics.push(Diagnostic::DeprecatedInvocation {
			received: describe(&args),
		});
	}
	if let [TranslateArg::Text(_), TranslateArg::Text(_)] = args.as_slice() {
		diagnostics.push(Diagnostic::AmbiguousPlural {
			received: describe(&args),
		});
	}

	let mut options = args
		.iter()
		.rev()
		.find_map(|arg| match arg {
			TranslateArg::Options(options) => Some(options.clone()),
			TranslateArg::Text(_) => None,
		})
		.unwrap_or_default();

	let original = match args.first() {
		Some(TranslateArg::Text(text)) => Some(text.clone()),
		_ => match options.original.take() {
			Some(OriginalText::Text(text)) => Some(text),
			Some(OriginalText::Nested(nested)) => {
				options.plural = nested.plural;
				options.count = nested.count;
				nested.single
			}
			None => None,
		},
	};

	if let Some(TranslateArg::Text(plural)) = args.get(1) {
		options.plural = Some(plural.clone());
	}

	let Some(original) = original else {
		return Err(InvalidRequestError {
			received: describe(&args),
		});
	};

	if options.plural.is_some() && options.count.is_none() {
		diagnostics.push(Diagnostic::MissingCount {
			original: original.clone(),
		});
	}

	Ok(Normalized {
		request: TranslationRequest {
			original,
			plural: options.plural,
			count: options.count,
			context: options.context,
			comment: options.comment,
			args: options.args,
			components: options.components,
		},
		diagnostics,
	})
}

fn describe(args: &[TranslateArg]) -> String {
	let parts: Vec<String> = args
		.iter()
		.map(|arg| match arg {
			TranslateArg::Text(text) => format!("{text:?}"),
			TranslateArg::Options(options) => {
				serde_json::to_string(options).unwrap_or_else(|_| "{..}".to_string())
			}
		})
		.collect();
	format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	fn request(call: impl Into<TranslateCall>) -> TranslationRequest {
		let normalized = normalize(call).unwrap();
		assert!(normalized.diagnostics.is_empty(), "{:?}", normalized.diagnostics);
		normalized.request
	}

	#[test]
	fn test_plain_string() {
		let req = request("test1");
		assert_eq!(req.original(), "test1");
		assert_eq!(req.lookup_mode(), LookupMode::Gettext);
		assert!(req.is_cacheable());
	}

	#[test]
	fn test_original_as_argument_or_option_is_equivalent() {
		let a = request(("test3", TranslateOptions::new().context("thecontext")));
		let b = request(TranslateOptions::new().original("test3").context("thecontext"));
		assert_eq!(a, b);
		assert_eq!(a.lookup_mode(), LookupMode::Pgettext);
	}

	#[test]
	fn test_nested_plural_is_unpacked() {
		let options = TranslateOptions::new().nested_plural("plural-test", "plural-test pl key", 2);
		let req = request(options);
		assert_eq!(req.original(), "plural-test");
		assert_eq!(req.plural(), Some("plural-test pl key"));
		assert_eq!(req.count(), Some(2));
		assert_eq!(req.lookup_mode(), LookupMode::Ngettext);
	}

	#[test]
	fn test_plural_shorthand() {
		let req = request(("apple", "apples", TranslateOptions::new().count(3)));
		assert_eq!(req.plural(), Some("apples"));
		assert_eq!(req.count(), Some(3));
	}

	#[test]
	fn test_second_string_overrides_nested_plural() {
		let call = TranslateCall::Args(vec![
			TranslateArg::Text("apple".into()),
			TranslateArg::Text("many apples".into()),
			TranslateArg::Options(TranslateOptions::new().nested_plural("x", "xs", 5).count(5)),
		]);
		let req = request(call);
		assert_eq!(req.original(), "apple");
		assert_eq!(req.plural(), Some("many apples"));
	}

	#[test]
	fn test_context_with_plural_selects_npgettext() {
		let req = request(("file", "files", TranslateOptions::new().count(2).context("menu")));
		assert_eq!(req.lookup_mode(), LookupMode::Npgettext);
	}

	#[test]
	fn test_last_options_wins() {
		let normalized = normalize(TranslateCall::Args(vec![
			"apple".into(),
			TranslateOptions::new().context("first").into(),
			TranslateOptions::new().context("second").into(),
		]))
		.unwrap();
		assert_eq!(normalized.request.context(), Some("second"));
		assert!(matches!(
			normalized.diagnostics.as_slice(),
			[Diagnostic::DeprecatedInvocation { .. }]
		));
	}

	#[test]
	fn test_too_many_arguments_warns() {
		let normalized = normalize(TranslateCall::Args(vec![
			"a".into(),
			"b".into(),
			TranslateOptions::new().count(1).into(),
			"c".into(),
		]))
		.unwrap();
		assert!(normalized
			.diagnostics
			.iter()
			.any(|d| matches!(d, Diagnostic::DeprecatedInvocation { .. })));
	}

	#[test]
	fn test_two_strings_without_options_warns() {
		let normalized =
			normalize(TranslateCall::Args(vec!["apple".into(), "apples".into()])).unwrap();
		assert!(normalized
			.diagnostics
			.iter()
			.any(|d| matches!(d, Diagnostic::AmbiguousPlural { .. })));
		assert!(normalized
			.diagnostics
			.iter()
			.any(|d| matches!(d, Diagnostic::MissingCount { .. })));
		assert_eq!(normalized.request.plural(), Some("apples"));
	}

	#[test]
	fn test_missing_original_is_fatal() {
		assert!(normalize(TranslateOptions::new().context("ctx")).is_err());
		assert!(normalize(TranslateCall::Args(vec![])).is_err());

		let nested_without_single = TranslateOptions {
			original: Some(OriginalText::Nested(NestedPlural {
				single: None,
				plural: Some("xs".into()),
				count: Some(2),
			})),
			..Default::default()
		};
		assert!(normalize(nested_without_single).is_err());
	}

	#[test]
	fn test_components_disable_caching() {
		let mut components = BTreeMap::new();
		components.insert("link".to_string(), json!("<a/>"));
		let req = request(("Click {{link}}", TranslateOptions::new().components(components)));
		assert!(!req.is_cacheable());
		assert_eq!(req.cache_key(), None);
	}

	#[test]
	fn test_cache_key_is_stable_and_distinct() {
		let a = request(("test1", TranslateOptions::new().comment("hint")));
		let b = request(TranslateOptions::new().comment("hint").original("test1"));
		assert_eq!(a.cache_key(), b.cache_key());

		let c = request(("test1", TranslateOptions::new().comment("other")));
		assert_ne!(a.cache_key(), c.cache_key());
	}

	#[test]
	fn test_options_deserialize_from_json() {
		let options: TranslateOptions = serde_json::from_value(json!({
			"original": { "single": "plural-test", "plural": "plural-test pl key", "count": 1 },
			"args": ["a", "b"],
		}))
		.unwrap();
		let req = request(options);
		assert_eq!(req.original(), "plural-test");
		assert_eq!(req.count(), Some(1));
		assert_eq!(
			req.args(),
			Some(&InterpolationArgs::Positional(vec![json!("a"), json!("b")]))
		);
	}

	#[test]
	fn test_count_must_be_non_negative_integer() {
		let parse = |value: Value| serde_json::from_value::<TranslateOptions>(value);

		assert_eq!(parse(json!({"count": 2})).unwrap().count, Some(2));
		assert!(parse(json!({"count": 1.5})).is_err());
		assert!(parse(json!({"count": -1})).is_err());

		let nested = json!({"original": {"single": "a", "plural": "b", "count": 1.5}});
		assert!(parse(nested).is_err());
	}

	#[test]
	fn test_interpolation_args_from_value() {
		assert!(matches!(
			InterpolationArgs::from_value(json!({"a": 1})),
			InterpolationArgs::Named(_)
		));
		assert!(matches!(
			InterpolationArgs::from_value(json!([1, 2])),
			InterpolationArgs::Positional(_)
		));
		assert!(matches!(
			InterpolationArgs::from_value(json!("x")),
			InterpolationArgs::Single(_)
		));
	}

	proptest! {
		/// Any leading string always becomes the original, whatever follows.
		#[test]
		fn leading_string_is_original(
			original in ".*",
			rest in prop::collection::vec("[a-z]{0,8}", 0..4),
		) {
			let mut args = vec![TranslateArg::Text(original.clone())];
			args.extend(rest.into_iter().map(TranslateArg::Text));
			let normalized = normalize(TranslateCall::Args(args)).unwrap();
			prop_assert_eq!(normalized.request.original(), original.as_str());
		}
	}
}
