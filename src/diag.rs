//! Diagnostics sink.
//!
//! Components report their status through an explicit [`Diagnostics`] trait
//! rather than a global logger, so tests can capture output and callers can
//! route it wherever they like. The default sink forwards to `tracing`.
//!
//! Diagnostics are observable output, not part of the functional contract:
//! nothing in the store or stream behaves differently based on what a sink
//! does with a message.

use std::cell::RefCell;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Severity-tagged status reporting.
pub trait Diagnostics {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Shared sink handle. Single-threaded by design, like the rest of the crate.
pub type SharedDiagnostics = Rc<dyn Diagnostics>;

/// Default sink: forwards to the `tracing` macros.
#[derive(Debug, Default)]
pub struct TracingSink;

impl Diagnostics for TracingSink {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }
}

/// The default shared sink.
pub fn tracing_sink() -> SharedDiagnostics {
    Rc::new(TracingSink)
}

/// Message severity, as captured by [`CaptureSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Capturing sink for tests: records every message with its severity.
#[derive(Debug, Default)]
pub struct CaptureSink {
    messages: RefCell<Vec<(Severity, String)>>,
}

impl CaptureSink {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// All captured messages, in emission order.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.borrow().clone()
    }

    /// Captured messages at the given severity.
    pub fn at(&self, severity: Severity) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Diagnostics for CaptureSink {
    fn info(&self, msg: &str) {
        self.messages.borrow_mut().push((Severity::Info, msg.to_owned()));
    }

    fn warn(&self, msg: &str) {
        self.messages.borrow_mut().push((Severity::Warn, msg.to_owned()));
    }

    fn error(&self, msg: &str) {
        self.messages.borrow_mut().push((Severity::Error, msg.to_owned()));
    }
}

/// Initialize the tracing subscriber: fmt layer with an env filter
/// defaulting to `info`. Call once at binary startup.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
