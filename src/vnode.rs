//! Declarative node trees as authored, before [normalization](`crate::normalize`).

use crate::events::Handler;
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// A virtual node in any shape the [normalizer](`crate::normalize::normalize`) accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
	Null,
	Bool(bool),
	Text(String),
	Number(f64),
	/// Nested lists are flattened in place by normalization.
	List(Vec<VNode>),
	Element(Box<VElement>),
}
impl VNode {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	/// Builds an element node through [`create_node`].
	pub fn element(tag: impl Into<Tag>, props: Props, children: impl IntoIterator<Item = VNode>) -> Self {
		create_node(tag, props, children)
	}

	/// Whether [`create_node`] drops this child.
	fn is_absent(&self) -> bool {
		matches!(self, Self::Null | Self::Bool(false))
	}
}
impl From<&str> for VNode {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}
impl From<String> for VNode {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}
impl From<f64> for VNode {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}
impl From<i32> for VNode {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}
impl From<bool> for VNode {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl<T: Into<VNode>> From<Option<T>> for VNode {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}
impl From<Vec<VNode>> for VNode {
	fn from(nodes: Vec<VNode>) -> Self {
		Self::List(nodes)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct VElement {
	pub tag: Tag,
	pub props: Props,
	pub children: Vec<VNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
	Name(String),
	Component(Component),
}
impl From<&str> for Tag {
	fn from(name: &str) -> Self {
		Self::Name(name.to_owned())
	}
}
impl From<String> for Tag {
	fn from(name: String) -> Self {
		Self::Name(name)
	}
}
impl From<Component> for Tag {
	fn from(component: Component) -> Self {
		Self::Component(component)
	}
}

/// A functional component: called with its node's props, plus a `children` entry, to produce the tree it stands for.
///
/// Components compare by identity. The name is only used for logging.
#[derive(Clone)]
pub struct Component {
	name: Rc<str>,
	render: Rc<dyn Fn(&Props) -> VNode>,
}
impl Component {
	pub fn new(name: &str, render: impl 'static + Fn(&Props) -> VNode) -> Self {
		Self {
			name: name.into(),
			render: Rc::new(render),
		}
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn render(&self, props: &Props) -> VNode {
		(self.render)(props)
	}
}
impl PartialEq for Component {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.render, &other.render)
	}
}
impl Debug for Component {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Component").field(&self.name).finish()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
	Null,
	Bool(bool),
	Str(String),
	Number(f64),
	/// Merged key by key onto the host's style map.
	Style(Vec<(String, String)>),
	Handler(Handler),
	/// Only present in the props handed to a [`Component`].
	Children(Vec<VNode>),
}
impl PropValue {
	pub fn style<K: Into<String>, V: Into<String>>(declarations: impl IntoIterator<Item = (K, V)>) -> Self {
		Self::Style(declarations.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}

	/// Loose truthiness, as used for boolean live properties.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(value) => *value,
			Self::Str(value) => !value.is_empty(),
			Self::Number(value) => *value != 0.0 && !value.is_nan(),
			Self::Style(_) | Self::Handler(_) | Self::Children(_) => true,
		}
	}

	/// The string form written to a markup attribute, if this value has one.
	#[must_use]
	pub fn to_attribute(&self) -> Option<String> {
		match self {
			Self::Str(value) => Some(value.clone()),
			Self::Bool(value) => Some(value.to_string()),
			Self::Number(value) => Some(number_text(*value)),
			Self::Null | Self::Style(_) | Self::Handler(_) | Self::Children(_) => None,
		}
	}
}
impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}
impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}
impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}
impl From<i32> for PropValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}
impl From<Handler> for PropValue {
	fn from(handler: Handler) -> Self {
		Self::Handler(handler)
	}
}

/// An insertion-ordered property bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(Vec<(String, PropValue)>);
impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key`, replacing an earlier value in place.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Shorthand for a handler prop: `on("click", h)` sets `onClick`.
	#[must_use]
	pub fn on(self, kind: &str, handler: Handler) -> Self {
		let mut chars = kind.chars();
		let key = match chars.next() {
			Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
			None => "on".to_owned(),
		};
		self.with(key, handler)
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
		let key = key.into();
		let value = value.into();
		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some((_, existing)) => *existing = value,
			None => self.0.push((key, value)),
		}
	}

	pub fn remove(&mut self, key: &str) -> Option<PropValue> {
		let index = self.0.iter().position(|(k, _)| k == key)?;
		Some(self.0.remove(index).1)
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&PropValue> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	/// The `children` entry a [`Component`] receives.
	#[must_use]
	pub fn children(&self) -> &[VNode] {
		match self.get("children") {
			Some(PropValue::Children(children)) => children,
			_ => &[],
		}
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}
}
impl<K: Into<String>, V: Into<PropValue>> core::iter::FromIterator<(K, V)> for Props {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut props = Self::new();
		for (k, v) in iter {
			props.insert(k, v);
		}
		props
	}
}

/// Builds an element node, flattening nested lists in `children` and dropping
/// [`VNode::Null`] and [`VNode::Bool(false)`](`VNode::Bool`) entries.
///
/// The children are stored as given otherwise; normalization happens later.
pub fn create_node(tag: impl Into<Tag>, props: Props, children: impl IntoIterator<Item = VNode>) -> VNode {
	fn flatten_into(children: impl IntoIterator<Item = VNode>, flat: &mut Vec<VNode>) {
		for child in children {
			match child {
				VNode::List(nested) => flatten_into(nested, flat),
				child if child.is_absent() => (),
				child => flat.push(child),
			}
		}
	}

	let mut flat = Vec::new();
	flatten_into(children, &mut flat);
	VNode::Element(Box::new(VElement {
		tag: tag.into(),
		props,
		children: flat,
	}))
}

/// Renders a number the way script engines stringify it:
/// `NaN`, `Infinity`, no sign on zero, and exponent notation outside of `1e-6..1e21`.
pub(crate) fn number_text(number: f64) -> String {
	if number.is_nan() {
		return "NaN".to_owned();
	}
	if number.is_infinite() {
		return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
	}
	if number == 0.0 {
		return "0".to_owned();
	}

	let magnitude = number.abs();
	if (1e-6..1e21).contains(&magnitude) {
		return number.to_string();
	}
	let text = format!("{:e}", number);
	match text.split_once('e') {
		Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
		_ => text,
	}
}
