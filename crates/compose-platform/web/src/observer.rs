use compose_visibility::{IntersectionDispatcher, IntersectionRecord, RootMargin, VisibilityObserver};
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// Browser `IntersectionObserver` feeding a notifier's dispatcher.
///
/// Disconnects when dropped.
pub struct WebObserver {
    observer: IntersectionObserver,
    _closure: Closure<dyn FnMut(Array)>,
}

impl WebObserver {
    pub(crate) fn new(
        margin: &RootMargin,
        dispatcher: IntersectionDispatcher<Element>,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let records = entries
                .iter()
                .map(|value| {
                    let entry: IntersectionObserverEntry = value.unchecked_into();
                    IntersectionRecord::new(entry.target(), entry.is_intersecting())
                })
                .collect();
            dispatcher.dispatch(records);
        });

        let options = IntersectionObserverInit::new();
        options.set_root_margin(&margin.to_css());
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &options)?;

        Ok(Self {
            observer,
            _closure: closure,
        })
    }
}

impl VisibilityObserver<Element> for WebObserver {
    fn observe(&self, element: &Element) {
        self.observer.observe(element);
    }

    fn unobserve(&self, element: &Element) {
        self.observer.unobserve(element);
    }
}

impl Drop for WebObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
