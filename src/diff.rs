//! Positional reconciliation of canonical trees against a live host tree.

use crate::{
	events::EventRegistry,
	host::{self, Flag, Host},
	loggable,
	materialize::materialize,
	normalize::{Element, Node},
	props::{self, Partitioned},
	vnode::Props,
};
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// Brings host subtrees in line with a new canonical tree, given the tree they were last built from.
///
/// Children are matched strictly by index. Reordering a list is observed as per-index replacements, never as moves.
///
/// # Correct Use
///
/// The host subtree at each patched position must be the one built from (or last patched to) `old`.
/// Missing host children are logged and recovered from by switching to insertion.
#[derive(Debug)]
pub struct Reconciler<'a, H: Host> {
	host: &'a H,
	events: &'a mut EventRegistry<H::Id>,
}
impl<'a, H: Host> Reconciler<'a, H> {
	pub fn new(host: &'a H, events: &'a mut EventRegistry<H::Id>) -> Self {
		Self { host, events }
	}

	/// Reconciles the host child of `parent` at `index`, built from `old`, to `new`.
	#[instrument(skip(self, new, old))]
	pub fn patch(&mut self, parent: &H::Node, new: Option<&Node>, old: Option<&Node>, index: usize) {
		let (new, old) = match (new, old) {
			(None, None) => return trace!("Nothing to patch."),
			(None, Some(_)) => return self.remove(parent, index),
			(Some(new), None) => return self.append(parent, new),
			(Some(new), Some(old)) => (new, old),
		};

		let current = match self.host.child(parent, index) {
			Some(current) => current,
			None => {
				error!("Expected a host child at index {} to patch. Switching to insertion.", index);
				return self.append(parent, new);
			}
		};

		if let (Some(new_text), Some(old_text)) = (new.as_text(), old.as_text()) {
			let span = trace_span!("Diffing text", new = loggable(new_text), old = loggable(old_text));
			let _enter = span.enter();
			if new_text != old_text {
				self.replace(parent, &current, new)
			}
			return;
		}

		match (new, old) {
			(Node::Element(new), Node::Element(old)) if new.tag == old.tag => {
				let span = trace_span!("Diffing element", tag = new.tag.as_str());
				let _enter = span.enter();
				self.update_element(&current, new, old)
			}
			(new, old) => {
				let span = trace_span!("Replace mismatching");
				let _enter = span.enter();
				if STATIC_MAX_LEVEL >= Level::WARN {
					if let (Node::Element(new), Node::Element(old)) = (new, old) {
						if new.tag.eq_ignore_ascii_case(&old.tag) {
							warn!("Recreating element due to different tag name casing: {:?} -> {:?}", old.tag, new.tag)
						}
					}
					if matches!(new, Node::Fragment(_)) || matches!(old, Node::Fragment(_)) {
						warn!("Fragments are only diffed as render roots. Replacing wholesale, which may shift sibling positions.")
					}
				}
				self.replace(parent, &current, new)
			}
		}
	}

	/// Reconciles all children of `parent`, built from `old`, to `new`.
	///
	/// Surplus old children are removed from the highest index downwards, so that earlier indices stay stable.
	#[instrument(skip(self, new, old), fields(new_len = new.len(), old_len = old.len()))]
	pub fn patch_children(&mut self, parent: &H::Node, new: &[Node], old: &[Node]) {
		for i in 0..new.len() {
			self.patch(parent, new.get(i), old.get(i), i)
		}
		for i in (new.len()..old.len()).rev() {
			self.patch(parent, None, old.get(i), i)
		}
	}

	fn update_element(&mut self, node: &H::Node, new: &Element, old: &Element) {
		self.reconcile_props(node, &new.props, &old.props);
		self.patch_children(node, &new.children, &old.children);

		if new.tag.eq_ignore_ascii_case("select") {
			props::ensure_selection(self.host, node);
		}
	}

	/// Updates the properties and handler registrations of `node` from `old` to `new` in place.
	#[instrument(skip(self, new, old))]
	pub fn reconcile_props(&mut self, node: &H::Node, new: &Props, old: &Props) {
		let new = props::partition(new);
		let old = props::partition(old);

		self.reconcile_handlers(node, &new, &old);

		let is_option = host::is_tag(self.host, node, "option");
		for flag in Flag::ALL {
			match (new.attribute(flag.prop()), old.attribute(flag.prop())) {
				(new, old) if is_option && flag == Flag::Selected => {
					// Selection lives in the live property only.
					match (new, old) {
						(Some(value), _) => self.host.set_flag(node, flag, value.is_truthy()),
						(None, Some(_)) => self.host.set_flag(node, flag, false),
						(None, None) => (),
					}
					self.host.remove_attribute(node, flag.attribute())
				}
				(Some(new), old) if Some(new) != old => props::apply_flag(self.host, node, flag, new),
				(None, Some(_)) => props::clear_flag(self.host, node, flag),
				_ => (),
			}
		}

		for &(key, value) in &new.attributes {
			if Flag::from_prop(key).is_none() && old.attribute(key) != Some(value) {
				props::apply_attribute(self.host, node, key, value)
			}
		}
		for &(key, _) in &old.attributes {
			if Flag::from_prop(key).is_none() && new.attribute(key).is_none() {
				trace!(key, "Removing attribute.");
				props::remove_attribute(self.host, node, key)
			}
		}
	}

	fn reconcile_handlers(&mut self, node: &H::Node, new: &Partitioned<'_>, old: &Partitioned<'_>) {
		let id = self.host.id(node);

		for (kind, handler) in &old.handlers {
			if new.handler(kind).is_none() {
				trace!(kind = kind.as_str(), "Deregistering handler.");
				self.events.deregister(kind, id, Some(*handler))
			}
		}

		for (kind, handler) in &new.handlers {
			match old.handler(kind) {
				Some(previous) if previous == *handler => (),
				Some(previous) => {
					trace!(kind = kind.as_str(), "Swapping handler.");
					self.events.deregister(kind, id, Some(previous));
					self.events.register(kind, id, (*handler).clone())
				}
				None => self.events.register(kind, id, (*handler).clone()),
			}
		}
	}

	fn append(&mut self, parent: &H::Node, new: &Node) {
		let span = trace_span!("Creating");
		let _enter = span.enter();
		let created = materialize(self.host, self.events, new);
		self.host.append_child(parent, &created)
	}

	fn replace(&mut self, parent: &H::Node, current: &H::Node, new: &Node) {
		self.unbind(current);
		let created = materialize(self.host, self.events, new);
		self.host.replace_child(parent, &created, current)
	}

	fn remove(&mut self, parent: &H::Node, index: usize) {
		let span = trace_span!("Removing", index);
		let _enter = span.enter();
		match self.host.child(parent, index) {
			Some(current) => {
				self.unbind(&current);
				self.host.remove_child(parent, &current)
			}
			None => error!("Expected to remove a host child at index {} but there is none. Ignoring.", index),
		}
	}

	/// Deregisters every handler in the host subtree at `node`, ahead of its detachment.
	fn unbind(&mut self, node: &H::Node) {
		unbind(self.host, self.events, node)
	}
}

/// Deregisters all handlers of `node` and its descendants.
pub(crate) fn unbind<H: Host>(host: &H, events: &mut EventRegistry<H::Id>, node: &H::Node) {
	let mut stack = vec![node.clone()];
	let mut count = 0_usize;
	while let Some(next) = stack.pop() {
		let id = host.id(&next);
		if events.has_handlers(id) {
			events.deregister_all(id);
			count += 1;
		}
		stack.extend(host.children(&next));
	}
	if count > 0 {
		trace!("Unbound handlers of {} node(s).", count)
	}
}
