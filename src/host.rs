//! The platform tree that canonical nodes are materialized into.
//!
//! All methods take `&self`: hosts are handles onto platform-owned state, and delegated handlers
//! must be able to re-render while an event is being dispatched.

use crate::events::Event;
use core::{fmt::Debug, hash::Hash};
use std::rc::Rc;

pub mod memory;
pub mod web;

/// Called by the platform with the event target for each event a root listens to.
pub type Delegate<N> = Rc<dyn Fn(&N, &Event)>;

/// Boolean live properties that are mirrored to presence-only attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
	Checked,
	Disabled,
	Selected,
	ReadOnly,
}
impl Flag {
	pub const ALL: [Flag; 4] = [Flag::Checked, Flag::Disabled, Flag::Selected, Flag::ReadOnly];

	/// Recognizes the property-bag key for this flag.
	#[must_use]
	pub fn from_prop(key: &str) -> Option<Self> {
		Some(match key {
			"checked" => Self::Checked,
			"disabled" => Self::Disabled,
			"selected" => Self::Selected,
			"readOnly" => Self::ReadOnly,
			_ => return None,
		})
	}

	/// The property-bag key, which is also the live property name.
	#[must_use]
	pub fn prop(self) -> &'static str {
		match self {
			Self::Checked => "checked",
			Self::Disabled => "disabled",
			Self::Selected => "selected",
			Self::ReadOnly => "readOnly",
		}
	}

	/// The markup attribute name.
	#[must_use]
	pub fn attribute(self) -> &'static str {
		match self {
			Self::ReadOnly => "readonly",
			other => other.prop(),
		}
	}
}

pub trait Host {
	type Node: Clone + PartialEq + Debug;
	/// Stable per-node identity, used to key the [`EventRegistry`](`crate::events::EventRegistry`).
	type Id: Copy + Eq + Hash + Debug;

	fn create_text(&self, text: &str) -> Self::Node;
	fn create_element(&self, tag: &str) -> Self::Node;
	/// A container whose children move into the parent when it is appended.
	fn create_fragment(&self) -> Self::Node;

	fn id(&self, node: &Self::Node) -> Self::Id;
	/// Lowercase tag name, or [`None`] for non-elements.
	fn tag_name(&self, node: &Self::Node) -> Option<String>;
	/// Content of a text node, or [`None`] for non-text nodes.
	fn text(&self, node: &Self::Node) -> Option<String>;
	/// The parent element, if any.
	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
	fn child(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;
	fn children(&self, parent: &Self::Node) -> Vec<Self::Node>;

	fn append_child(&self, parent: &Self::Node, child: &Self::Node);
	fn replace_child(&self, parent: &Self::Node, new: &Self::Node, old: &Self::Node);
	fn remove_child(&self, parent: &Self::Node, child: &Self::Node);

	fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
	fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;
	fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
	fn remove_attribute(&self, node: &Self::Node, name: &str);

	fn flag(&self, node: &Self::Node, flag: Flag) -> bool;
	fn set_flag(&self, node: &Self::Node, flag: Flag, value: bool);
	fn set_class_name(&self, node: &Self::Node, value: &str);
	fn style(&self, node: &Self::Node, name: &str) -> Option<String>;
	/// Sets one key of the node's style map, leaving the others as they are.
	fn set_style(&self, node: &Self::Node, name: &str, value: &str);

	/// Installs the single listener for `kind` on `root`.
	fn add_delegate(&self, root: &Self::Node, kind: &str, capture: bool, delegate: Delegate<Self::Node>);
	fn remove_delegate(&self, root: &Self::Node, kind: &str, capture: bool);
}

/// Whether `node` is an element named `tag`, ignoring ASCII case.
pub(crate) fn is_tag<H: Host>(host: &H, node: &H::Node, tag: &str) -> bool {
	host.tag_name(node).map_or(false, |name| name.eq_ignore_ascii_case(tag))
}

/// Collects `node`'s descendant elements named `tag` in document order, excluding `node` itself.
pub(crate) fn descendants_by_tag<H: Host>(host: &H, node: &H::Node, tag: &str) -> Vec<H::Node> {
	let mut found = Vec::new();
	let mut stack: Vec<H::Node> = host.children(node).into_iter().rev().collect();
	while let Some(next) = stack.pop() {
		if is_tag(host, &next, tag) {
			found.push(next.clone());
		}
		stack.extend(host.children(&next).into_iter().rev());
	}
	found
}
