//! In-memory host for exercising notifiers without a browser.
//!
//! [`TestHost`] records what the notifier asks of it and lets tests deliver
//! intersection batches and print signals by hand.

use crate::config::RootMargin;
use crate::host::{
    IntersectionDispatcher, IntersectionRecord, PrintDispatcher, VisibilityHost,
    VisibilityObserver,
};
use crate::identity::WeakIdentityTable;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Element handle used by [`TestHost`].
pub type TestElement = Rc<TestNode>;

#[derive(Debug)]
pub struct TestNode {
    label: String,
}

impl TestNode {
    pub fn new(label: impl Into<String>) -> TestElement {
        Rc::new(Self {
            label: label.into(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Default)]
struct TestHostState {
    generation: u64,
    observers_created: usize,
    root_margin: Option<RootMargin>,
    print_query: Option<String>,
    intersections: Option<(u64, IntersectionDispatcher<TestElement>)>,
    print: Option<(u64, PrintDispatcher)>,
    observed: Vec<Weak<TestNode>>,
}

/// Scriptable [`VisibilityHost`].
///
/// Clones share state, so a test can keep one clone while handing another to
/// the notifier.
#[derive(Clone)]
pub struct TestHost {
    has_observer: bool,
    has_print: bool,
    state: Rc<RefCell<TestHostState>>,
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHost {
    /// Host with both an intersection observer and a print signal.
    pub fn new() -> Self {
        Self {
            has_observer: true,
            has_print: true,
            state: Rc::new(RefCell::new(TestHostState::default())),
        }
    }

    /// Host lacking the intersection observer primitive.
    pub fn without_observer() -> Self {
        Self {
            has_observer: false,
            ..Self::new()
        }
    }

    /// Host with an observer but no print media signal.
    pub fn without_print() -> Self {
        Self {
            has_print: false,
            ..Self::new()
        }
    }

    /// Delivers one batch to the current observer. Ignored when no observer
    /// is connected.
    pub fn deliver(&self, records: Vec<IntersectionRecord<TestElement>>) {
        let dispatcher = self
            .state
            .borrow()
            .intersections
            .as_ref()
            .map(|(_, dispatcher)| dispatcher.clone());
        if let Some(dispatcher) = dispatcher {
            dispatcher.dispatch(records);
        }
    }

    /// Reports `element` as having entered the observed region.
    pub fn intersect(&self, element: &TestElement) {
        self.deliver(vec![IntersectionRecord::visible(Rc::clone(element))]);
    }

    /// Reports `element` as outside the observed region.
    pub fn leave(&self, element: &TestElement) {
        self.deliver(vec![IntersectionRecord::hidden(Rc::clone(element))]);
    }

    /// Changes the print media query state.
    pub fn set_print(&self, matches: bool) {
        let dispatcher = self
            .state
            .borrow()
            .print
            .as_ref()
            .map(|(_, dispatcher)| dispatcher.clone());
        if let Some(dispatcher) = dispatcher {
            dispatcher.dispatch(matches);
        }
    }

    pub fn is_observed(&self, element: &TestElement) -> bool {
        let target = Rc::downgrade(element);
        self.state
            .borrow()
            .observed
            .iter()
            .any(|weak| Weak::ptr_eq(weak, &target))
    }

    /// Number of live elements currently observed.
    pub fn observed_count(&self) -> usize {
        self.state
            .borrow()
            .observed
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn observers_created(&self) -> usize {
        self.state.borrow().observers_created
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().intersections.is_some()
    }

    pub fn print_subscribed(&self) -> bool {
        self.state.borrow().print.is_some()
    }

    /// Margin passed to the most recent observer.
    pub fn root_margin(&self) -> Option<RootMargin> {
        self.state.borrow().root_margin
    }

    /// Query passed to the most recent print subscription.
    pub fn print_query(&self) -> Option<String> {
        self.state.borrow().print_query.clone()
    }
}

/// Observer handed out by [`TestHost`]. Disconnects on drop.
pub struct TestObserver {
    generation: u64,
    state: Rc<RefCell<TestHostState>>,
}

impl VisibilityObserver<TestElement> for TestObserver {
    fn observe(&self, element: &TestElement) {
        let target = Rc::downgrade(element);
        let mut state = self.state.borrow_mut();
        if !state.observed.iter().any(|weak| Weak::ptr_eq(weak, &target)) {
            state.observed.push(target);
        }
    }

    fn unobserve(&self, element: &TestElement) {
        let target = Rc::downgrade(element);
        self.state
            .borrow_mut()
            .observed
            .retain(|weak| !Weak::ptr_eq(weak, &target));
    }
}

impl Drop for TestObserver {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if matches!(state.intersections, Some((generation, _)) if generation == self.generation) {
            state.intersections = None;
            state.observed.clear();
        }
    }
}

/// Print subscription handed out by [`TestHost`]. Unsubscribes on drop.
pub struct TestPrintListener {
    generation: u64,
    state: Rc<RefCell<TestHostState>>,
}

impl Drop for TestPrintListener {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if matches!(state.print, Some((generation, _)) if generation == self.generation) {
            state.print = None;
        }
    }
}

impl VisibilityHost for TestHost {
    type Element = TestElement;
    type Identities = WeakIdentityTable<TestNode>;
    type Observer = TestObserver;
    type PrintListener = TestPrintListener;

    fn create_observer(
        &self,
        margin: &RootMargin,
        dispatcher: IntersectionDispatcher<TestElement>,
    ) -> Option<TestObserver> {
        if !self.has_observer {
            return None;
        }
        let mut state = self.state.borrow_mut();
        state.generation += 1;
        state.observers_created += 1;
        let generation = state.generation;
        state.root_margin = Some(*margin);
        state.intersections = Some((generation, dispatcher));
        state.observed.clear();
        Some(TestObserver {
            generation,
            state: Rc::clone(&self.state),
        })
    }

    fn subscribe_print(
        &self,
        media_query: &str,
        dispatcher: PrintDispatcher,
    ) -> Option<TestPrintListener> {
        if !self.has_print {
            return None;
        }
        let mut state = self.state.borrow_mut();
        let generation = state.generation;
        state.print_query = Some(media_query.to_owned());
        state.print = Some((generation, dispatcher));
        Some(TestPrintListener {
            generation,
            state: Rc::clone(&self.state),
        })
    }
}
