//! Client-side code graph model.
//!
//! The model owns identity and semantic state only (ids, names, categories,
//! visibility, path flags, curvature). Layout positions belong to the
//! renderer. Nothing in here performs I/O.

mod category;
mod diff;
mod element;
mod graph;
mod path;
mod store;

pub use category::{Category, CategoryRegistry, Label, LabelRegistry};
pub use diff::DiffOutcome;
pub use element::{Link, Node, curvature};
pub use graph::{Additions, Graph, Removed, Upsert};
pub use path::{PathContext, PathEndpoint, PathSequence, split_path};
pub use store::Store;
