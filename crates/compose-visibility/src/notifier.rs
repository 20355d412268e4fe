//! One-shot visibility notifications on top of a host intersection observer.
//!
//! [`VisibilityNotifier`] owns a single host observer, a callback registry and
//! an identity side-table. Watching an element registers a callback that
//! fires once with [`VisibilityReason::Intersect`] when the element enters the
//! viewport (expanded by the configured margin), after which the element is
//! unwatched automatically. Every registered callback additionally fires with
//! [`VisibilityReason::Print`] each time the host reports print mode; that
//! path does not unwatch.
//!
//! When the host has no intersection observer the notifier is inert:
//! [`VisibilityNotifier::supported`] returns `false` and all operations are
//! no-ops.

use crate::config::VisibilityConfig;
use crate::host::{
    IntersectionDispatcher, IntersectionRecord, PrintDispatcher, VisibilityHost,
    VisibilityObserver,
};
use crate::identity::{ElementId, ElementIdAllocator, IdentityTable};
use crate::registry::{CallbackRegistry, CallbackSnapshot, VisibilityCallback, VisibilityReason};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// Cheaply cloneable handle to a notifier instance.
///
/// Clones share the same observer and registry. Host resources are released
/// once the last handle is dropped.
pub struct VisibilityNotifier<H: VisibilityHost> {
    inner: Rc<NotifierInner<H>>,
}

impl<H: VisibilityHost> Clone for VisibilityNotifier<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: VisibilityHost> fmt::Debug for VisibilityNotifier<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityNotifier")
            .field("supported", &self.supported())
            .field("print_hook_installed", &self.print_hook_installed())
            .field("watched", &self.inner.state.borrow().callbacks.len())
            .finish()
    }
}

impl<H: VisibilityHost> VisibilityNotifier<H> {
    /// Creates a notifier with [`VisibilityConfig::default`].
    pub fn new(host: &H) -> Self {
        Self::with_config(host, VisibilityConfig::default())
    }

    /// Creates a notifier, asking `host` for its observer and, when one is
    /// available, its print signal.
    pub fn with_config(host: &H, config: VisibilityConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<NotifierInner<H>>| {
            let intersections = {
                let weak = weak.clone();
                IntersectionDispatcher::new(move |records| match weak.upgrade() {
                    Some(inner) => inner.dispatch_intersections(records),
                    None => log::trace!("dropping {} intersection records", records.len()),
                })
            };
            let observer = host.create_observer(&config.root_margin, intersections);

            let print_listener = if observer.is_some() {
                let weak = weak.clone();
                let dispatcher = PrintDispatcher::new(move |matches| {
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch_print(matches);
                    }
                });
                let listener = host.subscribe_print(&config.print_media_query, dispatcher);
                if listener.is_none() {
                    log::debug!(
                        "print media query {:?} unavailable, print notifications disabled",
                        config.print_media_query
                    );
                }
                listener
            } else {
                log::debug!("host has no intersection observer, visibility notifier is inert");
                None
            };

            NotifierInner {
                config,
                observer,
                print_listener,
                state: RefCell::new(WatchState::new()),
            }
        });
        Self { inner }
    }

    /// Whether the host provided an intersection observer.
    pub fn supported(&self) -> bool {
        self.inner.observer.is_some()
    }

    /// Whether print notifications are wired up.
    pub fn print_hook_installed(&self) -> bool {
        self.inner.print_listener.is_some()
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.inner.config
    }

    /// Registers `callback` for `element` and starts observing it.
    ///
    /// Watching an element that is already watched replaces its callback; the
    /// previous one never fires.
    pub fn watch(&self, element: &H::Element, callback: impl Fn(VisibilityReason) + 'static) {
        self.inner.watch(element, Rc::new(callback));
    }

    /// Same as [`watch`](Self::watch) for an already shared callback.
    pub fn watch_shared(&self, element: &H::Element, callback: VisibilityCallback) {
        self.inner.watch(element, callback);
    }

    /// Stops watching `element`. Unknown elements are ignored.
    pub fn unwatch(&self, element: &H::Element) {
        self.inner.unwatch(element);
    }

    /// Watches `element` and returns a disposer that unwatches it.
    ///
    /// Dropping the disposer does not unwatch; call
    /// [`WatchDisposer::dispose`] when the owning component is torn down.
    pub fn use_once(
        &self,
        element: &H::Element,
        callback: impl Fn(VisibilityReason) + 'static,
    ) -> WatchDisposer<H> {
        self.watch(element, callback);
        WatchDisposer {
            notifier: Rc::downgrade(&self.inner),
            element: element.clone(),
        }
    }

    /// Whether `element` currently has a registered callback.
    pub fn is_watching(&self, element: &H::Element) -> bool {
        self.inner.state.borrow().is_watching(element)
    }

    /// Number of watched elements, excluding released ones.
    pub fn watched_count(&self) -> usize {
        let mut state = self.inner.state.borrow_mut();
        state.purge_reclaimed();
        state.callbacks.len()
    }
}

/// Releases a watch created by [`VisibilityNotifier::use_once`].
#[must_use = "the watch stays active until `dispose` is called"]
pub struct WatchDisposer<H: VisibilityHost> {
    notifier: Weak<NotifierInner<H>>,
    element: H::Element,
}

impl<H: VisibilityHost> WatchDisposer<H> {
    /// Unwatches the element. A no-op if it already fired or the notifier is
    /// gone.
    pub fn dispose(self) {
        if let Some(inner) = self.notifier.upgrade() {
            inner.unwatch(&self.element);
        }
    }
}

impl<H: VisibilityHost> fmt::Debug for WatchDisposer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchDisposer")
            .field("notifier_alive", &(self.notifier.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

struct NotifierInner<H: VisibilityHost> {
    config: VisibilityConfig,
    observer: Option<H::Observer>,
    // Held for its Drop, which unsubscribes from the host.
    print_listener: Option<H::PrintListener>,
    state: RefCell<WatchState<H::Element, H::Identities>>,
}

impl<H: VisibilityHost> NotifierInner<H> {
    fn watch(&self, element: &H::Element, callback: VisibilityCallback) {
        let Some(observer) = &self.observer else {
            return;
        };
        let (id, replaced) = {
            let mut state = self.state.borrow_mut();
            state.purge_reclaimed();
            state.register(element, callback)
        };
        if replaced {
            log::trace!("replaced callback for element {id}");
        } else {
            log::trace!("watching element {id}");
        }
        observer.observe(element);
    }

    fn unwatch(&self, element: &H::Element) {
        let Some(observer) = &self.observer else {
            return;
        };
        let released = self.state.borrow_mut().release(element);
        if let Some(id) = released {
            log::trace!("unwatched element {id}");
            observer.unobserve(element);
        }
    }

    fn dispatch_intersections(&self, records: Vec<IntersectionRecord<H::Element>>) {
        for record in records {
            if !record.is_intersecting {
                continue;
            }
            let callback = self.state.borrow().callback_for(&record.target);
            if let Some(callback) = callback {
                callback(VisibilityReason::Intersect);
            }
            self.unwatch(&record.target);
        }
    }

    fn dispatch_print(&self, matches: bool) {
        if !matches {
            return;
        }
        let callbacks: CallbackSnapshot = {
            let mut state = self.state.borrow_mut();
            state.purge_reclaimed();
            state.callbacks.snapshot()
        };
        log::debug!("print mode active, notifying {} watchers", callbacks.len());
        for callback in callbacks {
            callback(VisibilityReason::Print);
        }
    }
}

/// Identity side-table and callback registry, mutated together.
struct WatchState<E, I> {
    identities: I,
    callbacks: CallbackRegistry,
    ids: ElementIdAllocator,
    _element: PhantomData<fn(&E)>,
}

impl<E, I: IdentityTable<E>> WatchState<E, I> {
    fn new() -> Self {
        Self {
            identities: I::default(),
            callbacks: CallbackRegistry::default(),
            ids: ElementIdAllocator::new(),
            _element: PhantomData,
        }
    }

    /// Returns the element's id and whether a previous callback was replaced.
    fn register(&mut self, element: &E, callback: VisibilityCallback) -> (ElementId, bool) {
        let id = match self.identities.get(element) {
            Some(id) => id,
            None => {
                let id = self.ids.allocate();
                self.identities.assign(element, id);
                id
            }
        };
        let replaced = self.callbacks.insert(id, callback).is_some();
        (id, replaced)
    }

    fn release(&mut self, element: &E) -> Option<ElementId> {
        let id = self.identities.take(element)?;
        self.callbacks.remove(id);
        Some(id)
    }

    fn callback_for(&self, element: &E) -> Option<VisibilityCallback> {
        self.identities
            .get(element)
            .and_then(|id| self.callbacks.get(id))
    }

    fn is_watching(&self, element: &E) -> bool {
        self.identities
            .get(element)
            .is_some_and(|id| self.callbacks.contains(id))
    }

    fn purge_reclaimed(&mut self) {
        for id in self.identities.reclaim() {
            log::trace!("element {id} was released while watched");
            self.callbacks.remove(id);
        }
    }
}

#[cfg(test)]
#[path = "tests/notifier_tests.rs"]
mod tests;
