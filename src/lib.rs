#![doc(html_root_url = "https://docs.rs/sapling-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A minimal retained-mode reconciler.
//!
//! [`VNode`](`vnode::VNode`) trees are [normalized](`normalize::normalize`) into canonical [`Node`](`normalize::Node`)s,
//! which are then either [materialized](`materialize::materialize`) into a fresh [`Host`](`host::Host`) subtree
//! or [reconciled](`diff::Reconciler`) against the previous tree to patch the live one in place.
//! Handlers are kept in an [`EventRegistry`](`events::EventRegistry`) and reached through one delegated listener per event kind.
//!
//! [`render::Renderer`] wires all of this together for one container.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod closure_map;
pub mod config;
pub mod diff;
pub mod events;
pub mod host;
pub mod load;
pub mod materialize;
pub mod normalize;
pub mod props;
pub mod render;
pub mod vnode;

pub use config::Config;
pub use events::{Event, Handler};
pub use render::Renderer;
pub use vnode::{create_node, Component, PropValue, Props, VNode};

/// Content (text, attribute values) for log fields, redacted unless the `dangerous-logging` feature is enabled.
pub(crate) fn loggable(text: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		text
	} else {
		"…"
	}
}
