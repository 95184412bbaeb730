//! A headless [`Host`] backed by an [`indextree`] arena.
//!
//! Useful for tests and server-side rendering. It counts effective mutations
//! (writes that change observable state) and can simulate event delivery with [`MemoryHost::dispatch`].
//!
//! Subtrees removed through [`Host::remove_child`] or [`Host::replace_child`] are freed.
//! Their [`NodeId`]s go stale: reads through them see nothing and writes are refused.

use super::{Delegate, Flag, Host};
use crate::events::Event;
use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter, Write as _},
};
use hashbrown::HashMap;
use indextree::{Arena, NodeId};
use std::rc::Rc;
use tracing::{error, trace, trace_span};

#[derive(Debug, Clone)]
enum Kind {
	Text(String),
	Element(ElementData),
	Fragment,
}

#[derive(Debug, Clone, Default)]
struct ElementData {
	tag: String,
	attributes: Vec<(String, String)>,
	style: Vec<(String, String)>,
	flags: [bool; 4],
}
impl ElementData {
	fn style_text(&self) -> String {
		let mut text = String::new();
		for (name, value) in &self.style {
			if !text.is_empty() {
				text.push(' ');
			}
			let _ = write!(text, "{}: {};", name, value);
		}
		text
	}
}

fn flag_index(flag: Flag) -> usize {
	match flag {
		Flag::Checked => 0,
		Flag::Disabled => 1,
		Flag::Selected => 2,
		Flag::ReadOnly => 3,
	}
}

/// Cheaply clonable handle onto one shared arena.
#[derive(Clone, Default)]
pub struct MemoryHost(Rc<Inner>);

#[derive(Default)]
struct Inner {
	arena: RefCell<Arena<Kind>>,
	mutations: Cell<usize>,
	delegates: RefCell<HashMap<(NodeId, String, bool), Delegate<NodeId>>>,
}

impl Debug for MemoryHost {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryHost")
			.field("nodes", &self.node_count())
			.field("mutations", &self.0.mutations.get())
			.field("delegates", &self.0.delegates.borrow().len())
			.finish()
	}
}

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// How many effective tree, attribute, property or style changes were made so far.
	#[must_use]
	pub fn mutation_count(&self) -> usize {
		self.0.mutations.get()
	}

	/// How many nodes are alive, attached or not. Removed subtrees are freed.
	#[must_use]
	pub fn node_count(&self) -> usize {
		self.0.arena.borrow().iter().filter(|node| !node.is_removed()).count()
	}

	fn mutated(&self) {
		self.0.mutations.set(self.0.mutations.get() + 1)
	}

	fn with_element<T>(&self, node: NodeId, f: impl FnOnce(&mut ElementData) -> T) -> Option<T> {
		let mut arena = self.0.arena.borrow_mut();
		match arena.get_mut(node).map(indextree::Node::get_mut) {
			Some(Kind::Element(element)) => Some(f(element)),
			_ => None,
		}
	}

	fn read_element<T>(&self, node: NodeId, f: impl FnOnce(&ElementData) -> T) -> Option<T> {
		let arena = self.0.arena.borrow();
		match arena.get(node).map(indextree::Node::get) {
			Some(Kind::Element(element)) => Some(f(element)),
			_ => None,
		}
	}

	/// Whether `node` currently has no parent, which includes having been removed.
	#[must_use]
	pub fn is_detached(&self, node: NodeId) -> bool {
		self.0.arena.borrow().get(node).and_then(indextree::Node::parent).is_none()
	}

	/// Serializes `node` and its subtree as HTML-like markup.
	///
	/// Live properties aren't part of the markup, only attributes are.
	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let arena = self.0.arena.borrow();
		let mut html = String::new();
		write_html(&arena, node, &mut html);
		html
	}

	/// Serializes the children of `node`.
	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let arena = self.0.arena.borrow();
		let mut html = String::new();
		if !is_live(&arena, node) {
			error!("Tried to serialize removed node {:?}.", node);
			return html;
		}
		for child in node.children(&arena) {
			write_html(&arena, child, &mut html);
		}
		html
	}

	/// Simulates platform delivery of an event of `kind` targeted at `target`.
	///
	/// Capturing delegates run from the outermost ancestor inwards, then bubbling ones from the target outwards,
	/// unless a handler stops propagation.
	pub fn dispatch(&self, target: NodeId, kind: &str) -> Event {
		let event = Event::new(kind);
		let span = trace_span!("Simulating event", kind, ?target);
		let _enter = span.enter();

		let path: Vec<NodeId> = {
			let arena = self.0.arena.borrow();
			if !is_live(&arena, target) {
				trace!("Target was removed. Nothing to deliver.");
				return event;
			}
			target.ancestors(&arena).collect()
		};
		let capturing = path.iter().rev().map(|node| (*node, true));
		let bubbling = path.iter().map(|node| (*node, false));
		for (node, capture) in capturing.chain(bubbling) {
			// Released before the call, as delegates re-enter the host.
			let delegate = self.0.delegates.borrow().get(&(node, kind.to_owned(), capture)).cloned();
			if let Some(delegate) = delegate {
				trace!(?node, capture, "Calling delegate.");
				delegate(&target, &event);
				if event.is_propagation_stopped() {
					break;
				}
			}
		}
		event
	}
}

/// Whether `node` still refers to a node in `arena`, as opposed to a freed (and possibly reused) slot.
fn is_live(arena: &Arena<Kind>, node: NodeId) -> bool {
	arena.get(node).is_some()
}

fn escape(text: &str, html: &mut String, quotes: bool) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' if !quotes => html.push_str("&lt;"),
			'>' if !quotes => html.push_str("&gt;"),
			'"' if quotes => html.push_str("&quot;"),
			c => html.push(c),
		}
	}
}

fn write_html(arena: &Arena<Kind>, node: NodeId, html: &mut String) {
	match arena.get(node).map(indextree::Node::get) {
		Some(Kind::Text(text)) => escape(text, html, false),
		Some(Kind::Fragment) => {
			for child in node.children(arena) {
				write_html(arena, child, html)
			}
		}
		Some(Kind::Element(element)) => {
			let tag = element.tag.to_ascii_lowercase();
			html.push('<');
			html.push_str(&tag);
			for (name, value) in &element.attributes {
				html.push(' ');
				html.push_str(name);
				html.push_str("=\"");
				escape(value, html, true);
				html.push('"');
			}
			if !element.style.is_empty() {
				html.push_str(" style=\"");
				escape(&element.style_text(), html, true);
				html.push('"');
			}
			html.push('>');
			for child in node.children(arena) {
				write_html(arena, child, html)
			}
			html.push_str("</");
			html.push_str(&tag);
			html.push('>');
		}
		None => error!("Tried to serialize removed node {:?}.", node),
	}
}

impl Host for MemoryHost {
	type Node = NodeId;
	type Id = NodeId;

	fn create_text(&self, text: &str) -> NodeId {
		self.0.arena.borrow_mut().new_node(Kind::Text(text.to_owned()))
	}

	fn create_element(&self, tag: &str) -> NodeId {
		self.0.arena.borrow_mut().new_node(Kind::Element(ElementData {
			tag: tag.to_owned(),
			..ElementData::default()
		}))
	}

	fn create_fragment(&self) -> NodeId {
		self.0.arena.borrow_mut().new_node(Kind::Fragment)
	}

	fn id(&self, node: &NodeId) -> NodeId {
		*node
	}

	fn tag_name(&self, node: &NodeId) -> Option<String> {
		self.read_element(*node, |element| element.tag.to_ascii_lowercase())
	}

	fn text(&self, node: &NodeId) -> Option<String> {
		match self.0.arena.borrow().get(*node).map(indextree::Node::get) {
			Some(Kind::Text(text)) => Some(text.clone()),
			_ => None,
		}
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		let arena = self.0.arena.borrow();
		arena
			.get(*node)
			.and_then(indextree::Node::parent)
			.filter(|parent| matches!(arena.get(*parent).map(indextree::Node::get), Some(Kind::Element(_))))
	}

	fn child(&self, parent: &NodeId, index: usize) -> Option<NodeId> {
		let arena = self.0.arena.borrow();
		if !is_live(&arena, *parent) {
			return None;
		}
		parent.children(&arena).nth(index)
	}

	fn children(&self, parent: &NodeId) -> Vec<NodeId> {
		let arena = self.0.arena.borrow();
		if !is_live(&arena, *parent) {
			return Vec::new();
		}
		parent.children(&arena).collect()
	}

	fn append_child(&self, parent: &NodeId, child: &NodeId) {
		let mut arena = self.0.arena.borrow_mut();
		if !is_live(&arena, *parent) || !is_live(&arena, *child) {
			return error!("Can't append {:?} to {:?}: One of them was removed.", child, parent);
		}
		let moved: Vec<NodeId> = match arena.get(*child).map(indextree::Node::get) {
			Some(Kind::Fragment) => child.children(&arena).collect(),
			_ => vec![*child],
		};
		for node in moved {
			node.detach(&mut arena);
			if let Err(error) = parent.checked_append(node, &mut arena) {
				error!("Failed to append {:?} to {:?}: {:?}", node, parent, error);
				continue;
			}
			self.mutated();
		}
	}

	fn replace_child(&self, parent: &NodeId, new: &NodeId, old: &NodeId) {
		let mut arena = self.0.arena.borrow_mut();
		if arena.get(*old).and_then(indextree::Node::parent) != Some(*parent) {
			return error!("Can't replace {:?}: It's not a child of {:?}.", old, parent);
		}
		if !is_live(&arena, *new) {
			return error!("Can't replace {:?} with removed node {:?}.", old, new);
		}
		let moved: Vec<NodeId> = match arena.get(*new).map(indextree::Node::get) {
			Some(Kind::Fragment) => new.children(&arena).collect(),
			_ => vec![*new],
		};
		for node in moved {
			node.detach(&mut arena);
			if let Err(error) = old.checked_insert_before(node, &mut arena) {
				error!("Failed to insert {:?} before {:?}: {:?}", node, old, error);
			}
		}
		old.remove_subtree(&mut arena);
		self.mutated();
	}

	fn remove_child(&self, parent: &NodeId, child: &NodeId) {
		let mut arena = self.0.arena.borrow_mut();
		if arena.get(*child).and_then(indextree::Node::parent) != Some(*parent) {
			return error!("Can't remove {:?}: It's not a child of {:?}.", child, parent);
		}
		child.remove_subtree(&mut arena);
		self.mutated();
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		self.read_element(*node, |element| {
			if name == "style" {
				return if element.style.is_empty() { None } else { Some(element.style_text()) };
			}
			element.attributes.iter().find(|(n, _)| n == name).map(|(_, value)| value.clone())
		})
		.flatten()
	}

	fn attributes(&self, node: &NodeId) -> Vec<(String, String)> {
		self.read_element(*node, |element| {
			let mut attributes = element.attributes.clone();
			if !element.style.is_empty() {
				attributes.push(("style".to_owned(), element.style_text()));
			}
			attributes
		})
		.unwrap_or_default()
	}

	fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
		let changed = self.with_element(*node, |element| {
			if name == "style" {
				let style: Vec<(String, String)> = value
					.split(';')
					.filter_map(|declaration| {
						let (key, value) = declaration.split_once(':')?;
						Some((key.trim().to_owned(), value.trim().to_owned()))
					})
					.collect();
				let changed = style != element.style;
				element.style = style;
				return changed;
			}
			match element.attributes.iter_mut().find(|(n, _)| n == name) {
				Some((_, existing)) if existing == value => false,
				Some((_, existing)) => {
					*existing = value.to_owned();
					true
				}
				None => {
					element.attributes.push((name.to_owned(), value.to_owned()));
					true
				}
			}
		});
		match changed {
			Some(true) => self.mutated(),
			Some(false) => (),
			None => error!("Can't set attribute {:?} on non-element {:?}.", name, node),
		}
	}

	fn remove_attribute(&self, node: &NodeId, name: &str) {
		let changed = self.with_element(*node, |element| {
			if name == "style" {
				let changed = !element.style.is_empty();
				element.style.clear();
				return changed;
			}
			let before = element.attributes.len();
			element.attributes.retain(|(n, _)| n != name);
			before != element.attributes.len()
		});
		if changed == Some(true) {
			self.mutated()
		}
	}

	fn flag(&self, node: &NodeId, flag: Flag) -> bool {
		self.read_element(*node, |element| element.flags[flag_index(flag)]).unwrap_or(false)
	}

	fn set_flag(&self, node: &NodeId, flag: Flag, value: bool) {
		let changed = self.with_element(*node, |element| {
			let slot = &mut element.flags[flag_index(flag)];
			let changed = *slot != value;
			*slot = value;
			changed
		});
		if changed == Some(true) {
			self.mutated()
		}
	}

	fn set_class_name(&self, node: &NodeId, value: &str) {
		self.set_attribute(node, "class", value)
	}

	fn style(&self, node: &NodeId, name: &str) -> Option<String> {
		self.read_element(*node, |element| element.style.iter().find(|(n, _)| n == name).map(|(_, value)| value.clone()))
			.flatten()
	}

	fn set_style(&self, node: &NodeId, name: &str, value: &str) {
		let changed = self.with_element(*node, |element| match element.style.iter_mut().find(|(n, _)| n == name) {
			Some((_, existing)) if existing == value => false,
			Some((_, existing)) => {
				*existing = value.to_owned();
				true
			}
			None => {
				element.style.push((name.to_owned(), value.to_owned()));
				true
			}
		});
		if changed == Some(true) {
			self.mutated()
		}
	}

	fn add_delegate(&self, root: &NodeId, kind: &str, capture: bool, delegate: Delegate<NodeId>) {
		self.0.delegates.borrow_mut().insert((*root, kind.to_owned(), capture), delegate);
	}

	fn remove_delegate(&self, root: &NodeId, kind: &str, capture: bool) {
		self.0.delegates.borrow_mut().remove(&(*root, kind.to_owned(), capture));
	}
}
