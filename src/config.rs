use crate::events::Propagation;

/// Event kinds every [`Renderer`](`crate::render::Renderer`) delegates by default.
pub const DEFAULT_EVENT_KINDS: [&str; 8] = ["click", "input", "change", "submit", "keydown", "keyup", "focus", "blur"];

/// Non-bubbling event kinds that a root can only observe while capturing.
pub const CAPTURE_ONLY_EVENT_KINDS: [&str; 2] = ["mouseenter", "mouseleave"];

/// The phase in which root listeners see events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationPhase {
	/// Also sees events that don't bubble, like `focus`, `blur` and the [`CAPTURE_ONLY_EVENT_KINDS`].
	Capture,
	Bubble,
}

/// Per-root settings for delegation and dispatch.
#[derive(Debug, Clone)]
pub struct Config {
	event_kinds: Vec<String>,
	phase: DelegationPhase,
	propagation: Propagation,
}
impl Default for Config {
	fn default() -> Self {
		Self {
			event_kinds: DEFAULT_EVENT_KINDS.iter().map(|&kind| kind.to_owned()).collect(),
			phase: DelegationPhase::Capture,
			propagation: Propagation::default(),
		}
	}
}
impl Config {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the delegated event kinds. [`CAPTURE_ONLY_EVENT_KINDS`] are still added while capturing.
	#[must_use]
	pub fn with_event_kinds<S: Into<String>>(mut self, kinds: impl IntoIterator<Item = S>) -> Self {
		self.event_kinds = kinds.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn with_event_kind(mut self, kind: impl Into<String>) -> Self {
		let kind = kind.into();
		if !self.event_kinds.contains(&kind) {
			self.event_kinds.push(kind)
		}
		self
	}

	#[must_use]
	pub fn with_phase(mut self, phase: DelegationPhase) -> Self {
		self.phase = phase;
		self
	}

	#[must_use]
	pub fn with_propagation(mut self, propagation: Propagation) -> Self {
		self.propagation = propagation;
		self
	}

	#[must_use]
	pub fn phase(&self) -> DelegationPhase {
		self.phase
	}

	#[must_use]
	pub fn capture(&self) -> bool {
		self.phase == DelegationPhase::Capture
	}

	#[must_use]
	pub fn propagation(&self) -> Propagation {
		self.propagation
	}

	/// All event kinds a root listens to with this configuration.
	#[must_use]
	pub fn event_kinds(&self) -> Vec<&str> {
		let mut kinds: Vec<&str> = self.event_kinds.iter().map(String::as_str).collect();
		if self.capture() {
			for kind in CAPTURE_ONLY_EVENT_KINDS {
				if !kinds.contains(&kind) {
					kinds.push(kind)
				}
			}
		}
		kinds
	}
}
