// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post-processing applied to every freshly resolved translation.

use std::fmt;
use std::rc::Rc;

use crate::request::TranslationRequest;

/// A translate hook receives the current translation and the request that
/// produced it, and returns the next translation.
pub type TranslateHook = Rc<dyn Fn(String, &TranslationRequest) -> String>;

/// Ordered list of translate hooks.
///
/// Hooks run in registration order on every cache miss and cannot be
/// removed. Cloning is cheap and shares the hook closures.
#[derive(Clone, Default)]
pub struct HookPipeline {
	hooks: Vec<TranslateHook>,
}

impl HookPipeline {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, hook: impl Fn(String, &TranslationRequest) -> String + 'static) {
		self.hooks.push(Rc::new(hook));
	}

	/// Thread `translation` through every hook.
	pub fn apply(&self, translation: String, request: &TranslationRequest) -> String {
		self.hooks
			.iter()
			.fold(translation, |current, hook| hook(current, request))
	}

	pub fn len(&self) -> usize {
		self.hooks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hooks.is_empty()
	}
}

impl fmt::Debug for HookPipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookPipeline")
			.field("hooks", &self.hooks.len())
			.finish()
	}
}
