use anyhow::anyhow;
use core::cell::RefCell;
use indextree::NodeId;
use sapling_dom::{
	events::{dispatch, Event, EventRegistry, Handler, Propagation},
	host::{memory::MemoryHost, Host},
};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<&'static str>>>;

fn logging(log: &Log, entry: &'static str) -> Handler {
	let log = Rc::clone(log);
	Handler::new(move |_| log.borrow_mut().push(entry))
}

fn stopping(log: &Log, entry: &'static str) -> Handler {
	let log = Rc::clone(log);
	Handler::new(move |event| {
		log.borrow_mut().push(entry);
		event.stop_propagation()
	})
}

#[test]
fn registration_order_and_duplicates() {
	let log = Log::default();
	let (a, b) = (logging(&log, "a"), logging(&log, "b"));
	let mut registry = EventRegistry::<u32>::default();

	registry.register("click", 1, a.clone());
	registry.register("click", 1, b.clone());
	registry.register("click", 1, a.clone());

	assert_eq!(registry.handlers("click", 1), vec![a.clone(), b.clone()]);
	assert!(registry.handlers("click", 2).is_empty());
	assert!(registry.handlers("input", 1).is_empty());

	registry.register("", 1, a);
	assert_eq!(registry.kind_count(), 1);
}

#[test]
fn deregistration_prunes() {
	let log = Log::default();
	let (a, b) = (logging(&log, "a"), logging(&log, "b"));
	let mut registry = EventRegistry::<u32>::default();
	registry.register("click", 1, a.clone());
	registry.register("click", 1, b.clone());
	registry.register("input", 2, a.clone());

	registry.deregister("click", 1, Some(&a));
	assert_eq!(registry.handlers("click", 1), vec![b]);

	registry.deregister("click", 1, None);
	assert_eq!(registry.kind_count(), 1);
	assert!(!registry.has_handlers(1));

	registry.deregister("unknown", 2, None);
	registry.deregister("input", 2, Some(&a));
	assert!(registry.is_empty());
}

#[test]
fn deregistered_handlers_stop_receiving_events() {
	let Tree { host, root, inner, text, .. } = tree();
	let log = Log::default();
	let (a, b) = (logging(&log, "a"), logging(&log, "b"));
	let registry = RefCell::new(EventRegistry::default());
	registry.borrow_mut().register("click", inner, a.clone());
	registry.borrow_mut().register("click", inner, b);

	registry.borrow_mut().deregister("click", inner, Some(&a));
	dispatch(&registry, &host, &root, &text, &Event::new("click"));
	assert_eq!(*log.borrow(), vec!["b"]);

	registry.borrow_mut().deregister("click", inner, None);
	dispatch(&registry, &host, &root, &text, &Event::new("click"));
	assert_eq!(*log.borrow(), vec!["b"]);
}

#[test]
fn deregister_all_and_teardown() {
	let log = Log::default();
	let a = logging(&log, "a");
	let mut registry = EventRegistry::<u32>::default();
	registry.register("click", 1, a.clone());
	registry.register("keydown", 1, a.clone());
	registry.register("click", 2, a.clone());

	registry.deregister_all(1);
	assert!(!registry.has_handlers(1));
	assert!(registry.has_handlers(2));
	assert_eq!(registry.kind_count(), 1);

	registry.register("focus", 3, a);
	registry.teardown();
	assert!(registry.is_empty());
}

/// root > outer > inner > text
struct Tree {
	host: MemoryHost,
	root: NodeId,
	outer: NodeId,
	inner: NodeId,
	text: NodeId,
}
fn tree() -> Tree {
	let host = MemoryHost::new();
	let root = host.create_element("div");
	let outer = host.create_element("section");
	let inner = host.create_element("button");
	let text = host.create_text("press");
	host.append_child(&root, &outer);
	host.append_child(&outer, &inner);
	host.append_child(&inner, &text);
	Tree { host, root, outer, inner, text }
}

#[test]
fn bubbles_from_target_to_root_exclusive() {
	let Tree { host, root, outer, inner, text } = tree();
	let log = Log::default();
	let registry = RefCell::new(EventRegistry::default());
	registry.borrow_mut().register("click", root, logging(&log, "root"));
	registry.borrow_mut().register("click", outer, logging(&log, "outer"));
	registry.borrow_mut().register("click", inner, logging(&log, "inner 1"));
	registry.borrow_mut().register("click", inner, logging(&log, "inner 2"));
	registry.borrow_mut().register("input", inner, logging(&log, "wrong kind"));

	dispatch(&registry, &host, &root, &text, &Event::new("click"));

	assert_eq!(*log.borrow(), vec!["inner 1", "inner 2", "outer"]);
}

#[test]
fn stopping_after_node() {
	let Tree { host, root, outer, inner, .. } = tree();
	let log = Log::default();
	let registry = RefCell::new(EventRegistry::new(Propagation::AfterNode));
	registry.borrow_mut().register("click", outer, logging(&log, "outer"));
	registry.borrow_mut().register("click", inner, stopping(&log, "stop"));
	registry.borrow_mut().register("click", inner, logging(&log, "sibling"));

	let event = Event::new("click");
	dispatch(&registry, &host, &root, &inner, &event);

	assert!(event.is_propagation_stopped());
	assert_eq!(*log.borrow(), vec!["stop", "sibling"]);
}

#[test]
fn stopping_immediately() {
	let Tree { host, root, outer, inner, .. } = tree();
	let log = Log::default();
	let registry = RefCell::new(EventRegistry::new(Propagation::Immediate));
	registry.borrow_mut().register("click", outer, logging(&log, "outer"));
	registry.borrow_mut().register("click", inner, stopping(&log, "stop"));
	registry.borrow_mut().register("click", inner, logging(&log, "sibling"));

	dispatch(&registry, &host, &root, &inner, &Event::new("click"));

	assert_eq!(*log.borrow(), vec!["stop"]);
}

#[test]
fn handler_errors_are_contained() {
	let Tree { host, root, outer, inner, .. } = tree();
	let log = Log::default();
	let registry = RefCell::new(EventRegistry::default());
	registry.borrow_mut().register("click", inner, Handler::fallible(|_| Err(anyhow!("broken"))));
	registry.borrow_mut().register("click", inner, logging(&log, "sibling"));
	registry.borrow_mut().register("click", outer, logging(&log, "outer"));

	dispatch(&registry, &host, &root, &inner, &Event::new("click"));

	assert_eq!(*log.borrow(), vec!["sibling", "outer"]);
}

#[test]
fn handlers_may_mutate_the_registry() {
	let Tree { host, root, inner, .. } = tree();
	let registry = Rc::new(RefCell::new(EventRegistry::default()));
	let calls = Rc::new(RefCell::new(0));

	let once = {
		let registry = Rc::downgrade(&registry);
		let calls = Rc::clone(&calls);
		Handler::new(move |_| {
			*calls.borrow_mut() += 1;
			if let Some(registry) = registry.upgrade() {
				registry.borrow_mut().deregister_all(inner);
			}
		})
	};
	registry.borrow_mut().register("click", inner, once);

	dispatch(&*registry, &host, &root, &inner, &Event::new("click"));
	dispatch(&*registry, &host, &root, &inner, &Event::new("click"));

	assert_eq!(*calls.borrow(), 1);
	assert!(registry.borrow().is_empty());
}

#[test]
fn handlers_compare_by_identity() {
	let a = Handler::new(|_| ());
	let b = Handler::new(|_| ());
	assert_eq!(a, a.clone());
	assert_ne!(a, b);
}

#[test]
fn events_during_a_registry_update_are_dropped() {
	let Tree { host, root, inner, .. } = tree();
	let log = Log::default();
	let registry = RefCell::new(EventRegistry::default());
	registry.borrow_mut().register("click", inner, logging(&log, "inner"));

	let event = Event::new("click");
	{
		let _updating = registry.borrow_mut();
		dispatch(&registry, &host, &root, &inner, &event);
	}
	assert!(log.borrow().is_empty());
	assert!(!event.is_propagation_stopped());

	dispatch(&registry, &host, &root, &inner, &event);
	assert_eq!(*log.borrow(), vec!["inner"]);
}
