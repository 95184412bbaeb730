use core::cell::RefCell;
use hashbrown::{hash_map::Entry, HashMap};
use tracing::{trace, warn};
use wasm_bindgen::closure::Closure;

/// (root identity, event kind, capture)
pub(crate) type ListenerKey = (u32, String, bool);

thread_local! {
	static CLOSURE_MAP: RefCell<HashMap<ListenerKey, Closure<dyn Fn(web_sys::Event)>>> = RefCell::default();
}

/// Keeps `closure` alive until [`unpublish`]ed and hands it to `attach`.
///
/// If a listener is already published under `key`, that one stays installed and `closure` is dropped unattached.
pub(crate) fn publish(key: ListenerKey, closure: Closure<dyn Fn(web_sys::Event)>, attach: impl FnOnce(&Closure<dyn Fn(web_sys::Event)>)) {
	CLOSURE_MAP.with(move |closure_map| match closure_map.borrow_mut().entry(key) {
		Entry::Occupied(occupied) => warn!("A delegated listener is already installed for {:?}. Keeping it.", occupied.key()),
		Entry::Vacant(vacant) => {
			attach(vacant.insert(closure));
			trace!("Created Closure.");
		}
	});
}

/// Detaches (through `detach`) and drops the listener published under `key`, if any.
pub(crate) fn unpublish(key: &ListenerKey, detach: impl FnOnce(&Closure<dyn Fn(web_sys::Event)>)) {
	let closure = CLOSURE_MAP.with(|closure_map| closure_map.borrow_mut().remove(key));
	match closure {
		Some(closure) => {
			detach(&closure);
			trace!("Destroyed Closure.");
		}
		None => trace!("No Closure to destroy for {:?}.", key),
	}
}
