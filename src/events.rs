//! Delegated event handling.
//!
//! Instead of attaching one platform listener per element, each render root carries a single
//! listener per event kind (see [`Renderer`](`crate::render::Renderer`)).
//! That listener calls [`dispatch`], which walks from the event target up to the root and invokes
//! the [`Handler`]s an [`EventRegistry`] holds for each node on the way.

use crate::host::Host;
use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
	hash::Hash,
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{error, instrument, trace, trace_span, warn};

/// An event as seen by [`Handler`]s.
///
/// Wraps the platform's native event where there is one.
pub struct Event {
	kind: String,
	native: Option<web_sys::Event>,
	propagation_stopped: Cell<bool>,
}
impl Event {
	/// Creates a synthetic event without a native counterpart.
	#[must_use]
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			native: None,
			propagation_stopped: Cell::new(false),
		}
	}

	#[must_use]
	pub fn from_native(native: web_sys::Event) -> Self {
		Self {
			kind: native.type_(),
			native: Some(native),
			propagation_stopped: Cell::new(false),
		}
	}

	#[must_use]
	pub fn kind(&self) -> &str {
		&self.kind
	}

	#[must_use]
	pub fn native(&self) -> Option<&web_sys::Event> {
		self.native.as_ref()
	}

	/// Halts delegation towards the root.
	///
	/// Whether the remaining handlers on the current node still run is decided by the registry's [`Propagation`].
	pub fn stop_propagation(&self) {
		self.propagation_stopped.set(true);
		if let Some(native) = &self.native {
			native.stop_propagation();
		}
	}

	#[must_use]
	pub fn is_propagation_stopped(&self) -> bool {
		self.propagation_stopped.get()
	}
}
impl Debug for Event {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("kind", &self.kind)
			.field("native", &self.native.is_some())
			.field("propagation_stopped", &self.propagation_stopped.get())
			.finish()
	}
}

/// A logical event handler.
///
/// Handlers compare by identity: two clones of one [`Handler`] are equal, two separately created ones never are.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event) -> anyhow::Result<()>>);
impl Handler {
	pub fn new(handler: impl 'static + Fn(&Event)) -> Self {
		Self(Rc::new(move |event| {
			handler(event);
			Ok(())
		}))
	}

	/// Creates a handler whose errors are logged by [`dispatch`] without interrupting it.
	pub fn fallible(handler: impl 'static + Fn(&Event) -> anyhow::Result<()>) -> Self {
		Self(Rc::new(handler))
	}

	/// # Errors
	///
	/// Iff the wrapped closure fails.
	pub fn call(&self, event: &Event) -> anyhow::Result<()> {
		(self.0)(event)
	}
}
impl PartialEq for Handler {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for Handler {}
impl Debug for Handler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Handler").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

/// What [`Event::stop_propagation`] suppresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
	/// The current node's remaining handlers still run, then the walk ends.
	AfterNode,
	/// Nothing runs after the handler that stopped propagation.
	Immediate,
}
impl Default for Propagation {
	fn default() -> Self {
		Self::AfterNode
	}
}

/// Maps (event kind, host node identity) to an ordered list of [`Handler`]s.
///
/// One registry belongs to one render root. Empty entries are pruned eagerly,
/// so [`EventRegistry::is_empty`] means no handler is registered anywhere.
pub struct EventRegistry<K> {
	kinds: HashMap<String, HashMap<K, Vec<Handler>>>,
	propagation: Propagation,
}
impl<K> Default for EventRegistry<K> {
	fn default() -> Self {
		Self::new(Propagation::default())
	}
}
impl<K> Debug for EventRegistry<K> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventRegistry")
			.field("kinds", &self.kinds.keys().collect::<Vec<_>>())
			.field("propagation", &self.propagation)
			.finish()
	}
}
impl<K> EventRegistry<K> {
	#[must_use]
	pub fn new(propagation: Propagation) -> Self {
		Self {
			kinds: HashMap::new(),
			propagation,
		}
	}

	#[must_use]
	pub fn propagation(&self) -> Propagation {
		self.propagation
	}

	pub fn set_propagation(&mut self, propagation: Propagation) {
		self.propagation = propagation
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.kinds.is_empty()
	}

	/// The number of event kinds with at least one registered handler.
	#[must_use]
	pub fn kind_count(&self) -> usize {
		self.kinds.len()
	}

	/// Removes every registration.
	#[instrument(skip(self))]
	pub fn teardown(&mut self) {
		trace!("Dropping handlers for {} event kind(s).", self.kinds.len());
		self.kinds.clear()
	}
}
impl<K: Copy + Eq + Hash + Debug> EventRegistry<K> {
	/// Appends `handler` to the list for (`kind`, `node`).
	///
	/// Registering a handler that is already present is a no-op, as is an empty `kind` (with a warning).
	#[instrument(skip(self))]
	pub fn register(&mut self, kind: &str, node: K, handler: Handler) {
		if kind.is_empty() {
			return warn!("Refusing to register a handler without event kind on {:?}.", node);
		}

		let handlers = self.kinds.entry(kind.to_owned()).or_insert_with(HashMap::new).entry(node).or_insert_with(Vec::new);
		if handlers.contains(&handler) {
			trace!("Handler already registered.");
		} else {
			handlers.push(handler)
		}
	}

	/// Removes `handler` from (`kind`, `node`), or all handlers there if `handler` is [`None`].
	#[instrument(skip(self))]
	pub fn deregister(&mut self, kind: &str, node: K, handler: Option<&Handler>) {
		if kind.is_empty() {
			return warn!("Refusing to deregister a handler without event kind on {:?}.", node);
		}

		let nodes = match self.kinds.get_mut(kind) {
			Some(nodes) => nodes,
			None => return trace!("No handlers for this kind."),
		};

		match handler {
			Some(handler) => {
				if let Some(handlers) = nodes.get_mut(&node) {
					handlers.retain(|h| h != handler);
					if handlers.is_empty() {
						nodes.remove(&node);
					}
				}
			}
			None => {
				nodes.remove(&node);
			}
		}

		if nodes.is_empty() {
			self.kinds.remove(kind);
		}
	}

	/// Removes every handler registered on `node`, for all kinds.
	pub fn deregister_all(&mut self, node: K) {
		self.kinds.retain(|_, nodes| {
			nodes.remove(&node);
			!nodes.is_empty()
		})
	}

	/// Clones the handler list for (`kind`, `node`), in registration order.
	#[must_use]
	pub fn handlers(&self, kind: &str, node: K) -> Vec<Handler> {
		self.kinds
			.get(kind)
			.and_then(|nodes| nodes.get(&node))
			.cloned()
			.unwrap_or_default()
	}

	#[must_use]
	pub fn has_handlers(&self, node: K) -> bool {
		self.kinds.values().any(|nodes| nodes.contains_key(&node))
	}
}

/// Delivers `event` to the handlers of `target` and each of its ancestors below `root`.
///
/// The registry is only borrowed while handler lists are copied out,
/// so handlers may register, deregister and re-render freely.
///
/// Events that arrive while the registry is being updated (for example a `blur` fired by the platform
/// when a reconciliation removes the focused element) are dropped with a warning.
#[instrument(skip(registry, host))]
pub fn dispatch<H: Host>(registry: &RefCell<EventRegistry<H::Id>>, host: &H, root: &H::Node, target: &H::Node, event: &Event) {
	let propagation = match registry.try_borrow() {
		Ok(registry) => registry.propagation(),
		Err(_) => return warn!("Dropping {:?} event delivered during a registry update.", event.kind()),
	};
	let mut current = Some(target.clone());

	while let Some(node) = current {
		if &node == root {
			break;
		}

		let id = host.id(&node);
		let handlers = match registry.try_borrow() {
			Ok(registry) => registry.handlers(event.kind(), id),
			Err(_) => return warn!("Registry became busy while dispatching {:?}. Stopping.", event.kind()),
		};
		if !handlers.is_empty() {
			let span = trace_span!("Dispatching to node", ?id, count = handlers.len());
			let _enter = span.enter();
			for handler in handlers {
				if let Err(error) = handler.call(event) {
					error!("Event handler error: {:?}", error);
				}
				if propagation == Propagation::Immediate && event.is_propagation_stopped() {
					return trace!("Propagation stopped immediately.");
				}
			}
		}

		if event.is_propagation_stopped() {
			return trace!("Propagation stopped.");
		}
		current = host.parent(&node);
	}
}
