// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale data and the gettext catalog backend.
//!
//! Locale data uses the Jed JSON layout: the `""` key holds metadata and
//! every other key maps a message id to `[plural_id_or_null, form0, form1, ...]`.
//! Contextual messages are keyed as `context\u{4}msgid`.
//!
//! The backend compiles the in-memory messages into an MO image and hands it
//! to [`gettext::Catalog`], which owns lookup and plural selection. The
//! `Plural-Forms` rule is validated and regrouped by [`PluralRule`] first.

use std::collections::BTreeMap;
use std::fmt;

use gettext::Catalog;
use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{I18nError, Result};
use crate::plural::PluralRule;
use crate::request::{LookupMode, TranslationRequest};

/// Separator between context and message id in catalog keys.
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Catalog key reserved for locale metadata.
pub const METADATA_KEY: &str = "";

const MO_MAGIC: u32 = 0x9504_12de;
const MO_HEADER_LEN: u32 = 28;

/// Build the catalog key for a contextual message.
pub fn context_key(context: &str, msgid: &str) -> String {
	format!("{context}{CONTEXT_SEPARATOR}{msgid}")
}

/// Metadata stored under the `""` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleMetadata {
	#[serde(rename = "localeSlug", default, skip_serializing_if = "Option::is_none")]
	pub locale_slug: Option<String>,
	/// gettext `Plural-Forms` expression, e.g. `nplurals=2; plural=(n != 1);`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub plural_forms: Option<String>,
}

/// Translation forms for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
	/// Source plural text; `None` for non-plural messages.
	pub plural_id: Option<String>,
	/// Singular translation followed by plural forms.
	pub forms: Vec<String>,
}

impl CatalogEntry {
	pub fn singular(translation: impl Into<String>) -> Self {
		Self {
			plural_id: None,
			forms: vec![translation.into()],
		}
	}

	pub fn plural<I, S>(plural_id: impl Into<String>, forms: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			plural_id: Some(plural_id.into()),
			forms: forms.into_iter().map(Into::into).collect(),
		}
	}

	/// An entry with missing or empty forms is treated as untranslated.
	pub fn is_translated(&self) -> bool {
		!self.forms.is_empty() && self.forms.iter().all(|form| !form.is_empty())
	}
}

impl Serialize for CatalogEntry {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(self.forms.len() + 1))?;
		seq.serialize_element(&self.plural_id)?;
		for form in &self.forms {
			seq.serialize_element(form)?;
		}
		seq.end()
	}
}

impl<'de> Deserialize<'de> for CatalogEntry {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let raw = Vec::<Option<String>>::deserialize(deserializer)?;
		let mut items = raw.into_iter();
		let plural_id = items.next().flatten();
		let forms = items.map(Option::unwrap_or_default).collect();
		Ok(Self { plural_id, forms })
	}
}

/// A complete (or partial, for merges) locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleData {
	metadata: LocaleMetadata,
	messages: BTreeMap<String, CatalogEntry>,
}

impl LocaleData {
	/// An empty locale with the given slug.
	pub fn new(locale_slug: impl Into<String>) -> Self {
		Self {
			metadata: LocaleMetadata {
				locale_slug: Some(locale_slug.into()),
				plural_forms: None,
			},
			messages: BTreeMap::new(),
		}
	}

	/// A set of messages with no metadata, as passed to `add_translations`.
	pub fn messages_only() -> Self {
		Self::default()
	}

	/// Parse Jed-style JSON locale data.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|e| I18nError::InvalidLocaleData(e.to_string()))
	}

	/// Convert a Jed-style JSON value.
	pub fn from_value(value: Value) -> Result<Self> {
		serde_json::from_value(value).map_err(|e| I18nError::InvalidLocaleData(e.to_string()))
	}

	pub fn with_plural_forms(mut self, plural_forms: impl Into<String>) -> Self {
		self.metadata.plural_forms = Some(plural_forms.into());
		self
	}

	pub fn with_entry(mut self, key: impl Into<String>, entry: CatalogEntry) -> Self {
		self.insert(key, entry);
		self
	}

	/// Insert a message. The reserved metadata key is ignored.
	pub fn insert(&mut self, key: impl Into<String>, entry: CatalogEntry) {
		let key = key.into();
		if key == METADATA_KEY {
			return;
		}
		self.messages.insert(key, entry);
	}

	/// Slug from metadata, if one is present and non-empty.
	pub fn locale_slug(&self) -> Option<&str> {
		self.metadata.locale_slug.as_deref().filter(|slug| !slug.is_empty())
	}

	pub fn metadata(&self) -> &LocaleMetadata {
		&self.metadata
	}

	pub fn messages(&self) -> &BTreeMap<String, CatalogEntry> {
		&self.messages
	}

	pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
		self.messages.get(key)
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}

	/// The locale's plural rule, or the `n != 1` default when none is set.
	pub fn plural_rule(&self) -> Result<PluralRule> {
		match &self.metadata.plural_forms {
			Some(plural_forms) => {
				PluralRule::parse(plural_forms).map_err(|source| I18nError::PluralForms {
					locale: self.locale_slug().unwrap_or_default().to_string(),
					source,
				})
			}
			None => Ok(PluralRule::default()),
		}
	}

	/// Merge every message from `other`, overwriting matching keys.
	///
	/// Metadata of `other` is ignored.
	pub fn merge(&mut self, other: LocaleData) {
		self.messages.extend(other.messages);
	}
}

impl Serialize for LocaleData {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.messages.len() + 1))?;
		map.serialize_entry(METADATA_KEY, &self.metadata)?;
		for (key, entry) in &self.messages {
			map.serialize_entry(key, entry)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for LocaleData {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let mut raw = BTreeMap::<String, Value>::deserialize(deserializer)?;

		let metadata = match raw.remove(METADATA_KEY) {
			Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
				tracing::warn!(error = %e, "ignoring malformed locale metadata");
				LocaleMetadata::default()
			}),
			None => LocaleMetadata::default(),
		};

		let mut messages = BTreeMap::new();
		for (key, value) in raw {
			let entry = serde_json::from_value::<CatalogEntry>(value)
				.map_err(|e| D::Error::custom(format!("invalid catalog entry '{key}': {e}")))?;
			messages.insert(key, entry);
		}

		Ok(Self { metadata, messages })
	}
}

/// gettext-backed lookup over one locale's messages.
pub struct CatalogBackend {
	catalog: Catalog,
}

impl CatalogBackend {
	/// A backend with no translations; every lookup returns its source text.
	pub fn empty() -> Self {
		Self {
			catalog: Catalog::empty(),
		}
	}

	/// Compile locale data into a gettext catalog.
	pub fn from_locale(locale: &LocaleData) -> Result<Self> {
		let rule = locale.plural_rule()?;
		let image = encode_mo(locale, &rule);
		let catalog = Catalog::parse(image.as_slice()).map_err(|source| I18nError::Catalog {
			locale: locale.locale_slug().unwrap_or_default().to_string(),
			source,
		})?;
		Ok(Self { catalog })
	}

	pub fn gettext<'a>(&'a self, msgid: &'a str) -> &'a str {
		self.catalog.gettext(msgid)
	}

	pub fn ngettext<'a>(&'a self, msgid: &'a str, msgid_plural: &'a str, n: u64) -> &'a str {
		self.catalog.ngettext(msgid, msgid_plural, n)
	}

	pub fn pgettext<'a>(&'a self, context: &'a str, msgid: &'a str) -> &'a str {
		self.catalog.pgettext(context, msgid)
	}

	pub fn npgettext<'a>(
		&'a self,
		context: &'a str,
		msgid: &'a str,
		msgid_plural: &'a str,
		n: u64,
	) -> &'a str {
		self.catalog.npgettext(context, msgid, msgid_plural, n)
	}

	/// Resolve a request through the entry point its lookup mode selects.
	///
	/// Misses fall back to the source text per gettext semantics. A plural
	/// request without a count resolves with `n = 0`.
	pub fn resolve(&self, request: &TranslationRequest) -> String {
		let original = request.original();
		let plural = request.plural().unwrap_or(original);
		let context = request.context().unwrap_or_default();
		let n = request.count().unwrap_or(0);

		let translated = match request.lookup_mode() {
			LookupMode::Gettext => self.gettext(original),
			LookupMode::Ngettext => self.ngettext(original, plural, n),
			LookupMode::Pgettext => self.pgettext(context, original),
			LookupMode::Npgettext => self.npgettext(context, original, plural, n),
		};
		translated.to_string()
	}
}

impl Default for CatalogBackend {
	fn default() -> Self {
		Self::empty()
	}
}

impl fmt::Debug for CatalogBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CatalogBackend").finish_non_exhaustive()
	}
}

fn mo_header(locale: &LocaleData, rule: &PluralRule) -> String {
	let mut header = String::from("Content-Type: text/plain; charset=UTF-8\n");
	if let Some(slug) = locale.locale_slug() {
		header.push_str(&format!("Language: {}\n", single_line(slug)));
	}
	header.push_str(&format!("Plural-Forms: {}\n", rule.to_header()));
	header
}

fn single_line(value: &str) -> String {
	value.replace(&['\n', '\r'][..], " ")
}

/// Encode locale messages as a little-endian GNU MO image.
fn encode_mo(locale: &LocaleData, rule: &PluralRule) -> Vec<u8> {
	let mut pairs: Vec<(Vec<u8>, Vec<u8>)> = Vec::with_capacity(locale.messages.len() + 1);
	pairs.push((Vec::new(), mo_header(locale, rule).into_bytes()));

	for (key, entry) in &locale.messages {
		if !entry.is_translated() {
			tracing::trace!(key = %key, "skipping untranslated catalog entry");
			continue;
		}
		if let (Some(_), Some(expected)) = (&entry.plural_id, rule.nplurals()) {
			if entry.forms.len() < expected {
				tracing::warn!(
					key = %key,
					forms = entry.forms.len(),
					expected,
					"plural entry has fewer forms than nplurals"
				);
			}
		}
		let mut original = key.as_bytes().to_vec();
		if let Some(plural_id) = &entry.plural_id {
			original.push(0);
			original.extend_from_slice(plural_id.as_bytes());
		}
		pairs.push((original, entry.forms.join("\0").into_bytes()));
	}

	let count = pairs.len() as u32;
	let originals_offset = MO_HEADER_LEN;
	let translations_offset = originals_offset + 8 * count;
	let strings_offset = translations_offset + 8 * count;

	let mut tables = Vec::with_capacity(16 * pairs.len());
	let mut strings = Vec::new();
	let mut translation_table = Vec::with_capacity(8 * pairs.len());

	for (original, _) in &pairs {
		push_string(&mut tables, &mut strings, strings_offset, original);
	}
	for (_, translation) in &pairs {
		push_string(&mut translation_table, &mut strings, strings_offset, translation);
	}
	tables.extend(translation_table);

	let mut image = Vec::with_capacity(MO_HEADER_LEN as usize + tables.len() + strings.len());
	for word in [
		MO_MAGIC,
		0,
		count,
		originals_offset,
		translations_offset,
		0,
		strings_offset,
	] {
		image.extend_from_slice(&word.to_le_bytes());
	}
	image.extend(tables);
	image.extend(strings);
	image
}

fn push_string(table: &mut Vec<u8>, strings: &mut Vec<u8>, base: u32, value: &[u8]) {
	let offset = base + strings.len() as u32;
	table.extend_from_slice(&(value.len() as u32).to_le_bytes());
	table.extend_from_slice(&offset.to_le_bytes());
	strings.extend_from_slice(value);
	strings.push(0);
}
