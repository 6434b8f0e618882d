// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded cache of resolved translations.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Default cache capacity.
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
	Some(capacity) => capacity,
	None => unreachable!(),
};

/// Least-recently-used cache from a serialized translation request to its
/// final translated string.
///
/// Entries never outlive a locale mutation: the owner clears the cache
/// wholesale whenever the catalog changes.
pub struct TranslationCache {
	entries: LruCache<String, String>,
}

impl TranslationCache {
	pub fn new(capacity: NonZeroUsize) -> Self {
		Self {
			entries: LruCache::new(capacity),
		}
	}

	/// Look up a cached translation, marking it as most recently used.
	pub fn get(&mut self, key: &str) -> Option<String> {
		self.entries.get(key).cloned()
	}

	/// Store a translation, evicting the least recently used entry when full.
	pub fn put(&mut self, key: String, translation: String) {
		self.entries.put(key, translation);
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn capacity(&self) -> NonZeroUsize {
		self.entries.cap()
	}
}

impl Default for TranslationCache {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

impl fmt::Debug for TranslationCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TranslationCache")
			.field("len", &self.entries.len())
			.field("capacity", &self.entries.cap())
			.finish()
	}
}
