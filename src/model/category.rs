//! Registries for node categories and edge labels.
//!
//! Both grow monotonically for the lifetime of a graph: entries are created the
//! first time a name is seen during a merge and are never removed.

use std::collections::HashMap;

use crate::theme::{Color, category_color};

/// Visual and semantic grouping derived from a node's primary label.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
	pub name: String,
	/// Position in first-seen order. Never changes once assigned.
	pub index: usize,
	pub visible: bool,
}

impl Category {
	pub fn color(&self) -> Color {
		category_color(self.index)
	}
}

/// Assigns a stable index (and therefore a palette color) to each node label.
#[derive(Clone, Debug, Default)]
pub struct CategoryRegistry {
	categories: Vec<Category>,
	by_name: HashMap<String, usize>,
}

impl CategoryRegistry {
	/// Returns the category for `name`, creating it on first sighting.
	pub fn get_or_create(&mut self, name: &str) -> &Category {
		let index = match self.by_name.get(name) {
			Some(&index) => index,
			None => {
				let index = self.categories.len();
				self.categories.push(Category {
					name: name.to_string(),
					index,
					visible: true,
				});
				self.by_name.insert(name.to_string(), index);
				index
			}
		};
		&self.categories[index]
	}

	pub fn get(&self, name: &str) -> Option<&Category> {
		self.by_name.get(name).map(|&i| &self.categories[i])
	}

	/// Toggles visibility. Cascading to member nodes is the caller's job.
	///
	/// Returns `false` if the category has never been seen.
	pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
		match self.by_name.get(name) {
			Some(&i) => {
				self.categories[i].visible = visible;
				true
			}
			None => false,
		}
	}

	/// Categories in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = &Category> {
		self.categories.iter()
	}

	pub fn len(&self) -> usize {
		self.categories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.categories.is_empty()
	}
}

/// Edge relation descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
	pub name: String,
}

/// First-seen registry of edge relation names.
#[derive(Clone, Debug, Default)]
pub struct LabelRegistry {
	labels: Vec<Label>,
	by_name: HashMap<String, usize>,
}

impl LabelRegistry {
	pub fn get_or_create(&mut self, name: &str) -> &Label {
		let index = *self.by_name.entry(name.to_string()).or_insert_with(|| {
			self.labels.push(Label {
				name: name.to_string(),
			});
			self.labels.len() - 1
		});
		&self.labels[index]
	}

	pub fn iter(&self) -> impl Iterator<Item = &Label> {
		self.labels.iter()
	}

	pub fn len(&self) -> usize {
		self.labels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}
}
