//! Reading existing host content back into canonical [`Node`]s, so that it can be patched instead of rebuilt.

use crate::{
	host::{Flag, Host},
	normalize::{Element, Node},
	vnode::{PropValue, Props},
};
use tracing::{instrument, warn};

/// Loads each child of `parent`.
///
/// Unlike normalized trees, the result keeps empty text nodes (as [`Node::Empty`]) so positions match the host.
#[instrument(skip(host))]
pub fn load_child_nodes<H: Host>(host: &H, parent: &H::Node) -> Vec<Node> {
	host.children(parent).iter().map(|child| load_node(host, child)).collect()
}

pub fn load_node<H: Host>(host: &H, node: &H::Node) -> Node {
	if let Some(tag) = host.tag_name(node) {
		Node::Element(Element {
			props: load_attributes(host, node),
			children: load_child_nodes(host, node),
			tag,
		})
	} else if let Some(text) = host.text(node) {
		if text.is_empty() {
			Node::Empty
		} else {
			Node::Text(text)
		}
	} else {
		warn!("Unrecognized child node {:?}. Loading it as empty.", node);
		Node::Empty
	}
}

/// Maps attributes back to the props that would have produced them.
pub fn load_attributes<H: Host>(host: &H, node: &H::Node) -> Props {
	host.attributes(node)
		.into_iter()
		.map(|(name, value)| {
			if name == "class" {
				return ("className".to_owned(), PropValue::Str(value));
			}
			match Flag::ALL.iter().find(|flag| flag.attribute() == name) {
				Some(flag) => (flag.prop().to_owned(), PropValue::Bool(true)),
				None => (name, PropValue::Str(value)),
			}
		})
		.collect()
}
