//! Insertion-ordered, id-keyed entity storage.

use std::collections::{HashMap, HashSet};

/// Map from backend id to entity that remembers insertion order.
///
/// Lookup is O(1); iteration follows insertion so repeated renders see
/// elements in a stable order. Each removal call is one O(n) pass over the
/// order, so removals go through [`Store::remove_all`] or [`Store::retain`] in batches.
#[derive(Clone, Debug)]
pub struct Store<T> {
	items: HashMap<i64, T>,
	order: Vec<i64>,
}

impl<T> Default for Store<T> {
	fn default() -> Self {
		Self {
			items: HashMap::new(),
			order: Vec::new(),
		}
	}
}

impl<T> Store<T> {
	/// Inserts a new entity. An existing entry with the same id is replaced in place.
	pub fn insert(&mut self, id: i64, item: T) {
		if self.items.insert(id, item).is_none() {
			self.order.push(id);
		}
	}

	pub fn get(&self, id: i64) -> Option<&T> {
		self.items.get(&id)
	}

	pub fn get_mut(&mut self, id: i64) -> Option<&mut T> {
		self.items.get_mut(&id)
	}

	pub fn contains(&self, id: i64) -> bool {
		self.items.contains_key(&id)
	}

	/// Removes every listed id in one pass over the order; returns the ids
	/// actually removed, in insertion order.
	pub fn remove_all(&mut self, ids: &[i64]) -> Vec<i64> {
		let doomed: HashSet<i64> = ids.iter().copied().collect();
		let items = &mut self.items;
		let mut removed = Vec::new();
		self.order.retain(|id| {
			if doomed.contains(id) && items.remove(id).is_some() {
				removed.push(*id);
				return false;
			}
			true
		});
		removed
	}

	/// Keeps only the entities matching `keep`; returns the removed ids in order.
	pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> Vec<i64> {
		let mut removed = Vec::new();
		let items = &mut self.items;
		self.order.retain(|id| {
			let kept = items.get(id).is_some_and(&mut keep);
			if !kept {
				items.remove(id);
				removed.push(*id);
			}
			kept
		});
		removed
	}

	/// Entities in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &T> {
		self.order.iter().filter_map(|id| self.items.get(id))
	}

	/// Mutable access in no particular order.
	pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
		self.items.values_mut()
	}

	/// Ids in insertion order.
	pub fn ids(&self) -> &[i64] {
		&self.order
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}
}
