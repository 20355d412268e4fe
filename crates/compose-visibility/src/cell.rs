use crate::config::VisibilityConfig;
use crate::host::VisibilityHost;
use crate::notifier::VisibilityNotifier;
use std::cell::RefCell;
use std::fmt;

/// Lazily created notifier owned by a UI integration layer.
///
/// The host is only built, and the notifier only constructed, on the first
/// call to [`get`](Self::get). Every later call returns the same instance
/// until [`reset`](Self::reset).
pub struct NotifierCell<H: VisibilityHost> {
    factory: Box<dyn Fn() -> H>,
    config: VisibilityConfig,
    notifier: RefCell<Option<VisibilityNotifier<H>>>,
}

impl<H: VisibilityHost> NotifierCell<H> {
    pub fn new(factory: impl Fn() -> H + 'static) -> Self {
        Self::with_config(VisibilityConfig::default(), factory)
    }

    pub fn with_config(config: VisibilityConfig, factory: impl Fn() -> H + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            config,
            notifier: RefCell::new(None),
        }
    }

    /// Returns the notifier, creating it on first use.
    pub fn get(&self) -> VisibilityNotifier<H> {
        if let Some(notifier) = self.notifier.borrow().as_ref() {
            return notifier.clone();
        }
        let host = (self.factory)();
        let notifier = VisibilityNotifier::with_config(&host, self.config.clone());
        log::debug!(
            "created visibility notifier (supported: {})",
            notifier.supported()
        );
        *self.notifier.borrow_mut() = Some(notifier.clone());
        notifier
    }

    pub fn is_initialized(&self) -> bool {
        self.notifier.borrow().is_some()
    }

    /// Forgets the current notifier. The next [`get`](Self::get) builds a new
    /// one from a fresh host.
    ///
    /// Handles obtained earlier keep working on the old instance; its host
    /// resources are released once they are all dropped.
    pub fn reset(&self) {
        if self.notifier.borrow_mut().take().is_some() {
            log::debug!("visibility notifier reset");
        }
    }
}

impl<H: VisibilityHost> fmt::Debug for NotifierCell<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierCell")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
