//! Auto-complete state for the node search box.
//!
//! Every keystroke issues a new [`SearchTicket`]. The caller waits out the
//! debounce window, checks the ticket is still current, fetches, and hands the
//! response back with the ticket; responses for superseded tickets are dropped
//! so suggestions never arrive out of order.

use std::time::Duration;

use log::debug;

use crate::query::RawNode;

/// Identifies one input state of the search box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTicket {
	generation: u64,
	prefix: String,
}

impl SearchTicket {
	pub fn prefix(&self) -> &str {
		&self.prefix
	}
}

/// Input text, suggestions, and the generation counter guarding them.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
	input: String,
	generation: u64,
	suggestions: Vec<RawNode>,
	open: bool,
	debounce: Duration,
}

impl SearchState {
	pub fn new(debounce: Duration) -> Self {
		Self {
			debounce,
			..Self::default()
		}
	}

	/// Idle time required after the last keystroke before fetching.
	pub fn debounce(&self) -> Duration {
		self.debounce
	}

	pub fn input(&self) -> &str {
		&self.input
	}

	pub fn suggestions(&self) -> &[RawNode] {
		&self.suggestions
	}

	pub fn is_open(&self) -> bool {
		self.open
	}

	/// Records new input and invalidates every earlier ticket.
	///
	/// Returns `None` for blank input, which needs no fetch.
	pub fn on_input(&mut self, text: impl Into<String>) -> Option<SearchTicket> {
		self.input = text.into();
		self.generation += 1;
		self.suggestions.clear();
		self.open = false;
		let prefix = self.input.trim();
		if prefix.is_empty() {
			return None;
		}
		Some(SearchTicket {
			generation: self.generation,
			prefix: prefix.to_string(),
		})
	}

	pub fn is_current(&self, ticket: &SearchTicket) -> bool {
		ticket.generation == self.generation
	}

	/// Installs suggestions fetched for `ticket`. Stale responses are discarded.
	pub fn apply(&mut self, ticket: &SearchTicket, suggestions: Vec<RawNode>) -> bool {
		if !self.is_current(ticket) {
			debug!("search: dropping stale suggestions for {:?}", ticket.prefix);
			return false;
		}
		self.open = !suggestions.is_empty();
		self.suggestions = suggestions;
		true
	}

	/// Picks a suggestion: its name replaces the input and the list closes.
	pub fn select(&mut self, index: usize) -> Option<RawNode> {
		let chosen = self.suggestions.get(index)?.clone();
		self.input = chosen.name();
		self.generation += 1;
		self.suggestions.clear();
		self.open = false;
		Some(chosen)
	}

	pub fn close(&mut self) {
		self.open = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn suggestion(id: i64, name: &str) -> RawNode {
		serde_json::from_value(json!({"id": id, "labels": ["Function"], "properties": {"name": name}}))
			.unwrap()
	}

	#[test]
	fn input_changes_only_on_selection() {
		let mut search = SearchState::new(Duration::from_millis(500));
		let ticket = search.on_input("low").unwrap();
		assert_eq!(ticket.prefix(), "low");

		assert!(search.apply(&ticket, vec![suggestion(7, "lower_items")]));
		assert!(search.is_open());
		assert_eq!(search.input(), "low");

		let chosen = search.select(0).unwrap();
		assert_eq!(chosen.id, 7);
		assert_eq!(search.input(), "lower_items");
		assert!(!search.is_open());
	}

	#[test]
	fn last_request_wins() {
		let mut search = SearchState::default();
		let first = search.on_input("lo").unwrap();
		let second = search.on_input("low").unwrap();
		assert!(!search.is_current(&first));

		assert!(search.apply(&second, vec![suggestion(1, "lower")]));
		assert!(!search.apply(&first, vec![suggestion(2, "load")]));
		assert_eq!(search.suggestions()[0].name(), "lower");
	}

	#[test]
	fn blank_input_needs_no_fetch() {
		let mut search = SearchState::default();
		let ticket = search.on_input("ab").unwrap();
		assert!(search.on_input("   ").is_none());
		assert!(!search.is_current(&ticket));
		assert!(search.suggestions().is_empty());
	}

	#[test]
	fn selection_out_of_range() {
		let mut search = SearchState::default();
		assert!(search.select(0).is_none());
	}
}
