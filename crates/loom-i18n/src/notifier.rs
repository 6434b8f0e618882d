// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Broadcast of the `change` event to registered listeners.
//!
//! Listeners are invoked synchronously, in registration order, with no
//! internal borrow held, so a listener may translate, subscribe or
//! unsubscribe while being notified. Registration is unbounded.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Listener = Rc<dyn Fn()>;

/// Token returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Registry of `change` listeners.
#[derive(Default)]
pub struct ChangeNotifier {
	next_id: Cell<u64>,
	listeners: RefCell<Vec<(ListenerId, Listener)>>,
}

impl ChangeNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
		let id = ListenerId(self.next_id.get());
		self.next_id.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, Rc::new(listener)));
		tracing::trace!(listener = id.0, "change listener registered");
		id
	}

	/// Remove a listener. Returns `false` if it was not registered.
	pub fn unsubscribe(&self, id: ListenerId) -> bool {
		let mut listeners = self.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(existing, _)| *existing != id);
		before != listeners.len()
	}

	/// Notify every listener registered at the time of the call.
	pub fn emit(&self) {
		let snapshot: Vec<Listener> = self
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();

		for listener in snapshot {
			listener();
		}
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.borrow().len()
	}
}

impl fmt::Debug for ChangeNotifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChangeNotifier")
			.field("listeners", &self.listener_count())
			.finish()
	}
}
