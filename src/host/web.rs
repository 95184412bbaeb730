//! The browser DOM as a [`Host`], through [`web_sys`].
//!
//! Node identities are stored on the nodes themselves as an expando property.
//! Delegated listeners are [`Closure`]s kept alive in the crate's closure map until removed.

use super::{Delegate, Flag, Host};
use crate::{closure_map, events::Event};
use core::{
	convert::TryFrom,
	sync::atomic::{AtomicU32, Ordering},
};
use js_sys::Reflect;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

const ID_KEY: &str = "__saplingDomId";

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone)]
pub struct WebHost {
	document: web_sys::Document,
}
impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	/// Uses the current window's document, if there is one.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		web_sys::window().and_then(|window| window.document()).map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}
}

fn style_object(node: &web_sys::Node) -> Option<JsValue> {
	Reflect::get(node, &JsValue::from_str("style")).ok().filter(JsValue::is_object)
}

impl Host for WebHost {
	type Node = web_sys::Node;
	type Id = u32;

	fn create_text(&self, text: &str) -> web_sys::Node {
		self.document.create_text_node(text).into()
	}

	fn create_element(&self, tag: &str) -> web_sys::Node {
		match self.document.create_element(tag) {
			Ok(element) => element.into(),
			Err(error) => {
				// Keeps child positions aligned with the canonical tree.
				error!("Failed to create element <{}>: {:?}. Substituting an empty text node.", tag, error);
				self.document.create_text_node("").into()
			}
		}
	}

	fn create_fragment(&self) -> web_sys::Node {
		self.document.create_document_fragment().into()
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn id(&self, node: &web_sys::Node) -> u32 {
		let key = JsValue::from_str(ID_KEY);
		if let Some(id) = Reflect::get(node, &key).ok().and_then(|id| id.as_f64()) {
			return id as u32;
		}

		let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
		if let Err(error) = Reflect::set(node, &key, &JsValue::from(id)) {
			error!("Failed to store node identity: {:?}", error);
		}
		id
	}

	fn tag_name(&self, node: &web_sys::Node) -> Option<String> {
		node.dyn_ref::<web_sys::Element>().map(|element| element.tag_name().to_ascii_lowercase())
	}

	fn text(&self, node: &web_sys::Node) -> Option<String> {
		node.dyn_ref::<web_sys::Text>().map(|text| text.data())
	}

	fn parent(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
		node.parent_element().map(Into::into)
	}

	fn child(&self, parent: &web_sys::Node, index: usize) -> Option<web_sys::Node> {
		u32::try_from(index).ok().and_then(|index| parent.child_nodes().get(index))
	}

	fn children(&self, parent: &web_sys::Node) -> Vec<web_sys::Node> {
		let child_nodes = parent.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.get(i)).collect()
	}

	fn append_child(&self, parent: &web_sys::Node, child: &web_sys::Node) {
		if let Err(error) = parent.append_child(child) {
			error!("Failed to append child: {:?}", error)
		}
	}

	fn replace_child(&self, parent: &web_sys::Node, new: &web_sys::Node, old: &web_sys::Node) {
		if let Err(error) = parent.replace_child(new, old) {
			error!("Failed to replace child: {:?}", error)
		}
	}

	fn remove_child(&self, parent: &web_sys::Node, child: &web_sys::Node) {
		if let Err(error) = parent.remove_child(child) {
			error!("Failed to remove child: {:?}", error)
		}
	}

	fn attribute(&self, node: &web_sys::Node, name: &str) -> Option<String> {
		node.dyn_ref::<web_sys::Element>().and_then(|element| element.get_attribute(name))
	}

	fn attributes(&self, node: &web_sys::Node) -> Vec<(String, String)> {
		let attributes = match node.dyn_ref::<web_sys::Element>() {
			Some(element) => element.attributes(),
			None => return Vec::new(),
		};
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute| (attribute.name(), attribute.value()))
			.collect()
	}

	fn set_attribute(&self, node: &web_sys::Node, name: &str, value: &str) {
		match node.dyn_ref::<web_sys::Element>() {
			Some(element) => {
				if let Err(error) = element.set_attribute(name, value) {
					error!("Could not set attribute {:?}: {:?}", name, error)
				}
			}
			None => warn!("Can't set attribute {:?} on a non-element.", name),
		}
	}

	fn remove_attribute(&self, node: &web_sys::Node, name: &str) {
		if let Some(element) = node.dyn_ref::<web_sys::Element>() {
			if let Err(error) = element.remove_attribute(name) {
				warn!("Could not remove attribute {:?}: {:?}", name, error)
			}
		}
	}

	fn flag(&self, node: &web_sys::Node, flag: Flag) -> bool {
		Reflect::get(node, &JsValue::from_str(flag.prop()))
			.ok()
			.and_then(|value| value.as_bool())
			.unwrap_or(false)
	}

	fn set_flag(&self, node: &web_sys::Node, flag: Flag, value: bool) {
		if let Err(error) = Reflect::set(node, &JsValue::from_str(flag.prop()), &JsValue::from_bool(value)) {
			error!("Could not set property {:?}: {:?}", flag.prop(), error)
		}
	}

	fn set_class_name(&self, node: &web_sys::Node, value: &str) {
		match node.dyn_ref::<web_sys::Element>() {
			Some(element) => element.set_class_name(value),
			None => warn!("Can't set a class name on a non-element."),
		}
	}

	fn style(&self, node: &web_sys::Node, name: &str) -> Option<String> {
		let style = style_object(node)?;
		Reflect::get(&style, &JsValue::from_str(name))
			.ok()
			.and_then(|value| value.as_string())
			.filter(|value| !value.is_empty())
	}

	fn set_style(&self, node: &web_sys::Node, name: &str, value: &str) {
		let style = match style_object(node) {
			Some(style) => style,
			None => return warn!("Node has no style map to set {:?} on.", name),
		};
		if let Err(error) = Reflect::set(&style, &JsValue::from_str(name), &JsValue::from_str(value)) {
			error!("Could not set style {:?}: {:?}", name, error)
		}
	}

	#[instrument(skip(self, delegate))]
	fn add_delegate(&self, root: &web_sys::Node, kind: &str, capture: bool, delegate: Delegate<web_sys::Node>) {
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
			let target = event.target().and_then(|target| target.dyn_into::<web_sys::Node>().ok());
			match target {
				Some(target) => delegate(&target, &Event::from_native(event)),
				None => trace!("Ignoring event without node target."),
			}
		}) as Box<dyn Fn(web_sys::Event)>);

		closure_map::publish((self.id(root), kind.to_owned(), capture), closure, |closure| {
			if let Err(error) = root.add_event_listener_with_callback_and_bool(kind, closure.as_ref().unchecked_ref(), capture) {
				error!("Failed to add delegated listener {:?}: {:?}", kind, error)
			}
		});
	}

	#[instrument(skip(self))]
	fn remove_delegate(&self, root: &web_sys::Node, kind: &str, capture: bool) {
		closure_map::unpublish(&(self.id(root), kind.to_owned(), capture), |closure| {
			if let Err(error) = root.remove_event_listener_with_callback_and_bool(kind, closure.as_ref().unchecked_ref(), capture) {
				error!("Failed to remove delegated listener {:?}: {:?}", kind, error)
			}
		});
	}
}
