//! Creation of fresh host subtrees from canonical [`Node`]s.

use crate::{
	events::EventRegistry,
	host::{Flag, Host},
	loggable,
	normalize::{Element, Node},
	props,
};
use tracing::{instrument, trace_span};

/// Creates the host subtree for `node` and registers its handlers in `events`.
///
/// Leaves become text nodes ([`Node::Empty`] too, as empty text, so host child positions stay aligned).
/// A [`Node::Fragment`] becomes a host fragment, unless it has exactly one part, which is then returned directly.
#[instrument(skip(host, events, node))]
pub fn materialize<H: Host>(host: &H, events: &mut EventRegistry<H::Id>, node: &Node) -> H::Node {
	match node {
		Node::Empty => host.create_text(""),
		Node::Text(text) => {
			let span = trace_span!("Creating text node", text = loggable(text));
			let _enter = span.enter();
			host.create_text(text)
		}
		Node::Element(element) => materialize_element(host, events, element),
		Node::Fragment(nodes) => {
			let span = trace_span!("Creating fragment", "nodes.len()" = nodes.len());
			let _enter = span.enter();
			if let [single] = nodes.as_slice() {
				return materialize(host, events, single);
			}
			let fragment = host.create_fragment();
			for node in nodes {
				let child = materialize(host, events, node);
				host.append_child(&fragment, &child);
			}
			fragment
		}
	}
}

fn materialize_element<H: Host>(host: &H, events: &mut EventRegistry<H::Id>, Element { tag, props, children }: &Element) -> H::Node {
	let span = trace_span!("Creating element", tag = tag.as_str(), "children.len()" = children.len());
	let _enter = span.enter();

	let element = host.create_element(tag);
	let partitioned = props::partition(props);

	for &(key, value) in &partitioned.attributes {
		match Flag::from_prop(key) {
			Some(flag) => props::apply_flag(host, &element, flag, value),
			None => props::apply_attribute(host, &element, key, value),
		}
	}

	let id = host.id(&element);
	for (kind, handler) in &partitioned.handlers {
		events.register(kind, id, (*handler).clone());
	}

	for child in children {
		let child = materialize(host, events, child);
		host.append_child(&element, &child);
	}

	if tag.eq_ignore_ascii_case("select") {
		props::ensure_selection(host, &element);
	}

	element
}
