//! Host capability seam.
//!
//! A [`VisibilityHost`] supplies (or withholds) the platform primitives the
//! notifier builds on: an intersection observer and a print media signal.
//! The notifier branches on what the host returns instead of probing the
//! environment itself.

use crate::config::RootMargin;
use crate::identity::IdentityTable;
use std::fmt;
use std::rc::Rc;

/// Visibility change reported by the host for one element.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionRecord<E> {
    pub target: E,
    /// `true` when the element is inside the observed region.
    pub is_intersecting: bool,
}

impl<E> IntersectionRecord<E> {
    pub fn new(target: E, is_intersecting: bool) -> Self {
        Self {
            target,
            is_intersecting,
        }
    }

    pub fn visible(target: E) -> Self {
        Self::new(target, true)
    }

    pub fn hidden(target: E) -> Self {
        Self::new(target, false)
    }
}

/// Handle through which the host delivers intersection batches.
///
/// Records are processed in the order given. Batches delivered after the
/// owning notifier was dropped are discarded.
pub struct IntersectionDispatcher<E> {
    handler: Rc<dyn Fn(Vec<IntersectionRecord<E>>)>,
}

impl<E> IntersectionDispatcher<E> {
    /// Wraps `handler`. Notifiers build their own; hosts construct one
    /// directly only when exercised on their own.
    pub fn new(handler: impl Fn(Vec<IntersectionRecord<E>>) + 'static) -> Self {
        Self {
            handler: Rc::new(handler),
        }
    }

    pub fn dispatch(&self, records: Vec<IntersectionRecord<E>>) {
        (self.handler)(records);
    }
}

impl<E> Clone for IntersectionDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            handler: Rc::clone(&self.handler),
        }
    }
}

impl<E> fmt::Debug for IntersectionDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionDispatcher").finish_non_exhaustive()
    }
}

/// Handle through which the host reports print media query changes.
#[derive(Clone)]
pub struct PrintDispatcher {
    handler: Rc<dyn Fn(bool)>,
}

impl PrintDispatcher {
    pub fn new(handler: impl Fn(bool) + 'static) -> Self {
        Self {
            handler: Rc::new(handler),
        }
    }

    /// `matches` is the new match state of the print media query.
    pub fn dispatch(&self, matches: bool) {
        (self.handler)(matches);
    }
}

impl fmt::Debug for PrintDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintDispatcher").finish_non_exhaustive()
    }
}

/// Platform observer that reports elements entering the observed region.
pub trait VisibilityObserver<E> {
    /// Begin observing `element`.
    fn observe(&self, element: &E);

    /// Stop observing `element`.
    fn unobserve(&self, element: &E);
}

/// Capabilities the host environment provides to a notifier.
pub trait VisibilityHost: 'static {
    /// Host UI element handle.
    type Element: Clone + 'static;

    /// Side-table used to associate elements with identifiers.
    type Identities: IdentityTable<Self::Element>;

    /// Observer created by [`VisibilityHost::create_observer`].
    type Observer: VisibilityObserver<Self::Element>;

    /// Keeps a print subscription alive; dropping it unsubscribes.
    type PrintListener;

    /// Creates the intersection observer, or `None` when the host has no such
    /// primitive.
    fn create_observer(
        &self,
        margin: &RootMargin,
        dispatcher: IntersectionDispatcher<Self::Element>,
    ) -> Option<Self::Observer>;

    /// Subscribes to changes of `media_query`, or `None` when the host can't
    /// signal print mode.
    fn subscribe_print(
        &self,
        media_query: &str,
        dispatcher: PrintDispatcher,
    ) -> Option<Self::PrintListener>;
}
