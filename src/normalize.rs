//! Reduction of [`VNode`]s to canonical [`Node`]s.

use crate::vnode::{number_text, PropValue, Props, Tag, VElement, VNode};
use tracing::{instrument, trace, trace_span};

/// A canonical node.
///
/// Element children never contain [`Node::Empty`] or [`Node::Fragment`],
/// and no [`Component`](`crate::vnode::Component`) survives normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	/// A leaf that renders as empty text.
	Empty,
	Text(String),
	Element(Element),
	/// Several sibling roots, from normalizing a list.
	Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
	pub tag: String,
	/// Never contains a `children` entry.
	pub props: Props,
	pub children: Vec<Node>,
}

impl Node {
	/// The text this node renders as, if it's a leaf.
	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Empty => Some(""),
			Self::Text(text) => Some(text),
			Self::Element(_) | Self::Fragment(_) => None,
		}
	}

	/// Splits a [`Node::Fragment`] into its parts; any other node is a single root.
	#[must_use]
	pub fn into_roots(self) -> Vec<Node> {
		match self {
			Self::Fragment(nodes) => nodes,
			node => vec![node],
		}
	}

	/// Converts back into the authoring shape. Normalizing the result yields `self` again.
	#[must_use]
	pub fn to_vnode(&self) -> VNode {
		match self {
			Self::Empty => VNode::Null,
			Self::Text(text) => VNode::Text(text.clone()),
			Self::Element(element) => VNode::Element(Box::new(VElement {
				tag: Tag::Name(element.tag.clone()),
				props: element.props.clone(),
				children: element.children.iter().map(Node::to_vnode).collect(),
			})),
			Self::Fragment(nodes) => VNode::List(nodes.iter().map(Node::to_vnode).collect()),
		}
	}
}

/// Resolves components and flattens noise out of `input`.
///
/// This is total: shapes without meaning degrade to [`Node::Empty`].
#[instrument(skip(input))]
pub fn normalize(input: &VNode) -> Node {
	match input {
		VNode::Null | VNode::Bool(_) => Node::Empty,
		VNode::Text(text) if text.is_empty() => Node::Empty,
		VNode::Text(text) => Node::Text(text.clone()),
		VNode::Number(number) => Node::Text(number_text(*number)),
		VNode::List(items) => Node::Fragment(normalize_children(items)),
		VNode::Element(element) => normalize_element(element),
	}
}

fn normalize_element(VElement { tag, props, children }: &VElement) -> Node {
	match tag {
		Tag::Component(component) => {
			let span = trace_span!("Expanding component", name = component.name());
			let _enter = span.enter();
			let mut props = props.clone();
			props.insert("children", PropValue::Children(children.clone()));
			normalize(&component.render(&props))
		}
		Tag::Name(tag) => {
			let mut props = props.clone();
			if props.remove("children").is_some() {
				trace!("Dropped `children` prop of <{}>.", tag);
			}
			Node::Element(Element {
				tag: tag.clone(),
				props,
				children: normalize_children(children),
			})
		}
	}
}

/// Normalizes each item, splicing fragments in place and dropping empties.
#[must_use]
pub fn normalize_children(items: &[VNode]) -> Vec<Node> {
	let mut flat = Vec::with_capacity(items.len());
	for item in items {
		match normalize(item) {
			Node::Empty => (),
			Node::Fragment(nodes) => flat.extend(nodes),
			node => flat.push(node),
		}
	}
	flat
}
