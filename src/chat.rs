//! Conversation history shown next to the graph.
//!
//! Path results are stored as groups of three entries: the query that asked
//! for a path, the response prompting for endpoints, and the path entry itself.

use crate::model::PathSequence;

/// Kind of entry in the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
	/// Introductory hint.
	Tip,
	/// Something the user asked.
	Query,
	/// An answer or prompt from the assistant.
	Response,
	/// Paths returned by a path query.
	Path,
	/// Placeholder while an answer is in flight.
	Pending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
	pub kind: MessageKind,
	pub text: String,
	/// Only set on `Path` entries.
	pub paths: Vec<PathSequence>,
}

impl Message {
	pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
		Self {
			kind,
			text: text.into(),
			paths: Vec::new(),
		}
	}
}

pub const TIP_TEXT: &str =
	"Ask about the code base, or pick two nodes to see how they are connected.";
pub const PATH_QUERY_TEXT: &str = "Create a path";
pub const PATH_PROMPT_TEXT: &str = "Please select a starting point and the end point.";
pub const PENDING_TEXT: &str = "…";

/// Ordered list of conversation entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatHistory {
	messages: Vec<Message>,
}

impl Default for ChatHistory {
	fn default() -> Self {
		Self {
			messages: vec![Message::new(MessageKind::Tip, TIP_TEXT)],
		}
	}
}

impl ChatHistory {
	/// History without the introductory tip.
	pub fn empty() -> Self {
		Self {
			messages: Vec::new(),
		}
	}

	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	pub fn push(&mut self, message: Message) {
		self.messages.push(message);
	}

	/// Removes every path group: repeatedly drops the most recent `Path` entry
	/// together with the (up to) two entries right before it.
	pub fn remove_path_groups(&mut self) {
		while let Some(last) = self
			.messages
			.iter()
			.rposition(|m| m.kind == MessageKind::Path)
		{
			self.messages.drain(last.saturating_sub(2)..=last);
		}
	}

	/// Starts a new path interaction, discarding earlier path groups.
	pub fn begin_path_query(&mut self) {
		self.remove_path_groups();
		self.push(Message::new(MessageKind::Query, PATH_QUERY_TEXT));
		self.push(Message::new(MessageKind::Response, PATH_PROMPT_TEXT));
	}

	/// Drops an unfinished path group left by a failed path query.
	pub fn abandon_path_query(&mut self) {
		let open = match self.messages.as_slice() {
			[.., query, prompt] => {
				query.kind == MessageKind::Query
					&& query.text == PATH_QUERY_TEXT
					&& prompt.kind == MessageKind::Response
					&& prompt.text == PATH_PROMPT_TEXT
			}
			_ => false,
		};
		if open {
			self.messages.truncate(self.messages.len() - 2);
		}
	}

	/// Closes the current path group with its results.
	pub fn attach_paths(&mut self, paths: Vec<PathSequence>) {
		let text = match paths.len() {
			0 => "No path found".to_string(),
			1 => "1 path found".to_string(),
			n => format!("{n} paths found"),
		};
		self.push(Message {
			kind: MessageKind::Path,
			text,
			paths,
		});
	}

	/// Records a question and a pending slot for its answer.
	pub fn ask(&mut self, question: impl Into<String>) {
		self.push(Message::new(MessageKind::Query, question));
		self.push(Message::new(MessageKind::Pending, PENDING_TEXT));
	}

	/// Replaces the most recent pending slot with the answer.
	pub fn answer(&mut self, text: impl Into<String>) {
		let text = text.into();
		match self
			.messages
			.iter_mut()
			.rev()
			.find(|m| m.kind == MessageKind::Pending)
		{
			Some(slot) => {
				slot.kind = MessageKind::Response;
				slot.text = text;
			}
			None => self.push(Message::new(MessageKind::Response, text)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn kinds(history: &ChatHistory) -> Vec<MessageKind> {
		history.messages().iter().map(|m| m.kind).collect()
	}

	#[test]
	fn removes_all_path_groups() {
		use MessageKind::*;
		let mut history = ChatHistory::empty();
		for kind in [Tip, Query, Response, Path, Query, Response, Path] {
			history.push(Message::new(kind, ""));
		}
		history.remove_path_groups();
		assert_eq!(kinds(&history), vec![Tip]);
	}

	#[test]
	fn unrelated_entries_survive() {
		use MessageKind::*;
		let mut history = ChatHistory::empty();
		for (kind, text) in [
			(Tip, "tip"),
			(Query, "what calls main?"),
			(Response, "nothing"),
			(Query, "path"),
			(Response, "pick"),
			(Path, ""),
			(Query, "later"),
		] {
			history.push(Message::new(kind, text));
		}
		history.remove_path_groups();
		let texts: Vec<&str> = history.messages().iter().map(|m| m.text.as_str()).collect();
		assert_eq!(texts, vec!["tip", "what calls main?", "nothing", "later"]);
	}

	#[test]
	fn adjacent_path_entries_are_removed_from_the_back() {
		use MessageKind::*;
		let mut history = ChatHistory::empty();
		for kind in [Query, Response, Path, Path] {
			history.push(Message::new(kind, ""));
		}
		history.remove_path_groups();
		assert_eq!(kinds(&history), vec![Query]);
	}

	#[test]
	fn abandoning_drops_only_an_open_path_group() {
		let mut history = ChatHistory::default();
		history.ask("what calls main?");
		history.answer("run");
		history.begin_path_query();
		history.abandon_path_query();
		assert_eq!(history.messages().len(), 3);
		assert_eq!(history.messages()[2].text, "run");

		history.abandon_path_query();
		assert_eq!(history.messages().len(), 3);
	}

	#[test]
	fn path_at_the_front_removes_only_itself() {
		let mut history = ChatHistory::empty();
		history.push(Message::new(MessageKind::Path, ""));
		history.push(Message::new(MessageKind::Tip, ""));
		history.remove_path_groups();
		assert_eq!(kinds(&history), vec![MessageKind::Tip]);
	}

	#[test]
	fn new_path_query_replaces_the_previous_one() {
		let mut history = ChatHistory::default();
		history.begin_path_query();
		history.attach_paths(vec![PathSequence::default()]);
		history.begin_path_query();
		history.attach_paths(vec![]);
		assert_eq!(
			kinds(&history),
			vec![MessageKind::Tip, MessageKind::Query, MessageKind::Response, MessageKind::Path]
		);
		assert_eq!(history.messages()[3].text, "No path found");
	}

	#[test]
	fn answer_fills_pending_slot() {
		let mut history = ChatHistory::default();
		history.ask("how many classes?");
		history.answer("12");
		let last = history.messages().last().unwrap();
		assert_eq!((last.kind, last.text.as_str()), (MessageKind::Response, "12"));
		assert_eq!(history.messages().len(), 3);
	}
}
