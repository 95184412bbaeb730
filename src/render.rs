//! The render entry point.

use crate::{
	config::Config,
	diff::Reconciler,
	events::{self, EventRegistry},
	host::{Delegate, Host},
	load,
	materialize::materialize,
	normalize::{normalize, Node},
	vnode::VNode,
};
use core::cell::RefCell;
use std::rc::Rc;
use tracing::{info, instrument, trace, warn};

/// Owns one render root: its container, event registry, delegated listeners and the last rendered tree.
///
/// # Correct Use
///
/// The container's children below the rendered roots must not be modified by anything else,
/// as reconciliation locates host nodes by position.
///
/// Handlers may re-render synchronously (for example through an `Rc<RefCell<Renderer<_>>>`).
/// The registry is never borrowed while a handler runs.
pub struct Renderer<H: Host> {
	host: H,
	container: H::Node,
	events: Rc<RefCell<EventRegistry<H::Id>>>,
	config: Config,
	last: Option<Vec<Node>>,
	delegated: bool,
}
impl<H: Host> core::fmt::Debug for Renderer<H> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Renderer")
			.field("container", &self.container)
			.field("config", &self.config)
			.field("roots", &self.last.as_ref().map(Vec::len))
			.field("delegated", &self.delegated)
			.finish()
	}
}

impl<H: 'static + Host + Clone> Renderer<H> {
	#[must_use]
	pub fn new(host: H, container: H::Node, config: Config) -> Self {
		Self {
			events: Rc::new(RefCell::new(EventRegistry::new(config.propagation()))),
			host,
			container,
			config,
			last: None,
			delegated: false,
		}
	}

	/// Like [`Renderer::new`], but takes the container's current children as the previously rendered tree,
	/// so that the first [`render`](`Renderer::render`) patches them in place.
	#[must_use]
	pub fn adopt(host: H, container: H::Node, config: Config) -> Self {
		let last = load::load_child_nodes(&host, &container);
		info!("Adopted {} existing root(s).", last.len());
		let mut renderer = Self::new(host, container, config);
		renderer.last = Some(last);
		renderer
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	#[must_use]
	pub fn container(&self) -> &H::Node {
		&self.container
	}

	#[must_use]
	pub fn events(&self) -> &Rc<RefCell<EventRegistry<H::Id>>> {
		&self.events
	}

	/// The canonical roots of the last render.
	#[must_use]
	pub fn last_roots(&self) -> Option<&[Node]> {
		self.last.as_deref()
	}

	/// Normalizes `tree` and brings the container's content in line with it.
	///
	/// A top-level list renders as several roots.
	#[instrument(skip(self, tree))]
	pub fn render(&mut self, tree: &VNode) {
		let roots = normalize(tree).into_roots();

		{
			let mut events = self.events.borrow_mut();
			match &self.last {
				Some(last) => Reconciler::new(&self.host, &mut events).patch_children(&self.container, &roots, last),
				None => {
					for root in &roots {
						let node = materialize(&self.host, &mut events, root);
						self.host.append_child(&self.container, &node);
					}
				}
			}
		}

		self.last = Some(roots);
		self.delegate();
	}

	/// Installs the delegated listeners, once.
	fn delegate(&mut self) {
		if self.delegated {
			return trace!("Delegation already installed.");
		}

		let registry = Rc::clone(&self.events);
		let host = self.host.clone();
		let root = self.container.clone();
		let delegate: Delegate<H::Node> = Rc::new(move |target: &H::Node, event: &events::Event| events::dispatch(&*registry, &host, &root, target, event));

		let capture = self.config.capture();
		for kind in self.config.event_kinds() {
			self.host.add_delegate(&self.container, kind, capture, Rc::clone(&delegate));
		}
		self.delegated = true;
		info!("Installed delegated listeners for {} event kind(s).", self.config.event_kinds().len());
	}

	/// Removes the rendered content, all registered handlers and the delegated listeners.
	///
	/// The renderer can render again afterwards, starting from scratch.
	#[instrument(skip(self))]
	pub fn unmount(&mut self) {
		if let Some(last) = self.last.take() {
			let mut events = self.events.borrow_mut();
			Reconciler::new(&self.host, &mut events).patch_children(&self.container, &[], &last);
		}
		self.events.borrow_mut().teardown();
		self.undelegate();
	}
}

impl<H: Host> Renderer<H> {
	/// Removes the delegated listeners, if installed.
	fn undelegate(&mut self) {
		if !self.delegated {
			return;
		}
		let capture = self.config.capture();
		for kind in self.config.event_kinds() {
			self.host.remove_delegate(&self.container, kind, capture);
		}
		self.delegated = false;
		trace!("Removed delegated listeners.");
	}
}

/// Detaches the root's listeners and drops its handlers. The rendered content stays in place.
impl<H: Host> Drop for Renderer<H> {
	fn drop(&mut self) {
		self.undelegate();
		match self.events.try_borrow_mut() {
			Ok(mut events) => events.teardown(),
			Err(_) => warn!("Registry still borrowed while dropping its renderer. Handlers stay registered."),
		}
	}
}
