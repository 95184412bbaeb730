//! Splitting property bags into event handlers and host attributes, and writing them to host nodes.

use crate::{
	events::Handler,
	host::{self, Flag, Host},
	loggable,
	vnode::{PropValue, Props},
};
use tracing::{trace, warn};

const EVENT_PREFIX: &str = "on";

/// A property bag split for use on a host element.
#[derive(Debug, Default)]
pub struct Partitioned<'a> {
	/// (event kind, handler) in declaration order.
	pub handlers: Vec<(String, &'a Handler)>,
	/// Everything but handlers and `children`, in declaration order.
	pub attributes: Vec<(&'a str, &'a PropValue)>,
}
impl<'a> Partitioned<'a> {
	#[must_use]
	pub fn handler(&self, kind: &str) -> Option<&'a Handler> {
		self.handlers.iter().find(|(k, _)| k == kind).map(|(_, handler)| *handler)
	}

	#[must_use]
	pub fn attribute(&self, key: &str) -> Option<&'a PropValue> {
		self.attributes.iter().find(|(k, _)| *k == key).map(|(_, value)| *value)
	}
}

/// The event kind for a handler key, i.e. `onKeyDown` → `keydown`.
#[must_use]
pub fn event_kind(key: &str) -> Option<String> {
	if key.len() > EVENT_PREFIX.len() && key.starts_with(EVENT_PREFIX) {
		Some(key[EVENT_PREFIX.len()..].to_lowercase())
	} else {
		None
	}
}

/// Partitions `props`. Keys with the event prefix only count as handlers if their value is one.
#[must_use]
pub fn partition(props: &Props) -> Partitioned<'_> {
	let mut partitioned = Partitioned::default();
	for (key, value) in props.iter() {
		match (event_kind(key), value) {
			(Some(kind), PropValue::Handler(handler)) => partitioned.handlers.push((kind, handler)),
			_ if key == "children" => trace!("Skipping reserved `children` prop."),
			_ => partitioned.attributes.push((key, value)),
		}
	}
	partitioned
}

/// Writes a boolean flag as live property, mirrored to a presence-only attribute for a literal `true`.
///
/// `checked` is never mirrored, and neither is `selected` on `<option>`s, whose selection lives only in the property.
pub fn apply_flag<H: Host>(host: &H, node: &H::Node, flag: Flag, value: &PropValue) {
	host.set_flag(node, flag, value.is_truthy());

	let mirrored = match flag {
		Flag::Checked => false,
		Flag::Selected if host::is_tag(host, node, "option") => false,
		_ => *value == PropValue::Bool(true),
	};
	if mirrored {
		host.set_attribute(node, flag.attribute(), "")
	} else {
		host.remove_attribute(node, flag.attribute())
	}
}

/// Clears a flag that's no longer present, both property and attribute.
pub fn clear_flag<H: Host>(host: &H, node: &H::Node, flag: Flag) {
	host.set_flag(node, flag, false);
	host.remove_attribute(node, flag.attribute())
}

/// Writes a non-flag attribute: `className` as class name, object `style`s merged into the style map, anything else as string attribute.
///
/// Malformed values (a string `style`, for example) are passed on as generic attributes.
pub fn apply_attribute<H: Host>(host: &H, node: &H::Node, key: &str, value: &PropValue) {
	match (key, value) {
		("className", value) => host.set_class_name(node, &value.to_attribute().unwrap_or_default()),
		("style", PropValue::Style(declarations)) => {
			for (name, value) in declarations {
				host.set_style(node, name, value)
			}
		}
		(key, PropValue::Null) => host.remove_attribute(node, key),
		(key, value) => match value.to_attribute() {
			Some(text) => {
				trace!(key, value = loggable(&text), "Setting attribute.");
				host.set_attribute(node, key, &text)
			}
			None => warn!("Skipping attribute {:?} with a value that has no string form: {:?}", key, value),
		},
	}
}

/// Removes an attribute that's no longer present.
///
/// A class name is cleared through both the live property and the markup attribute.
pub fn remove_attribute<H: Host>(host: &H, node: &H::Node, key: &str) {
	match key {
		"className" => {
			host.set_class_name(node, "");
			host.remove_attribute(node, "class")
		}
		key => host.remove_attribute(node, key),
	}
}

/// Selects the first `<option>` below `select` if none is selected.
pub fn ensure_selection<H: Host>(host: &H, select: &H::Node) {
	let options = host::descendants_by_tag(host, select, "option");
	if options.iter().any(|option| host.flag(option, Flag::Selected)) {
		return;
	}
	if let Some(first) = options.first() {
		trace!("Selecting the first option by default.");
		host.set_flag(first, Flag::Selected, true)
	}
}
