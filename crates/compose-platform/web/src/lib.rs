//! Browser host for `compose-visibility`.
//!
//! [`WebVisibilityHost`] backs a notifier with the DOM `IntersectionObserver`
//! and a `matchMedia` print query. Missing APIs make the corresponding
//! capability unavailable instead of failing.

mod identity;
mod observer;
mod print;

use compose_visibility::{
    IntersectionDispatcher, NotifierCell, PrintDispatcher, RootMargin, VisibilityConfig,
    VisibilityHost, VisibilityNotifier,
};
use wasm_bindgen::JsValue;
use web_sys::{Element, Window};

pub use identity::ElementWeakMap;
pub use observer::WebObserver;
pub use print::WebPrintListener;

/// Notifier backed by the browser.
pub type WebVisibilityNotifier = VisibilityNotifier<WebVisibilityHost>;

/// Host capabilities of the current browser window.
#[derive(Clone, Debug, Default)]
pub struct WebVisibilityHost {
    window: Option<Window>,
}

impl WebVisibilityHost {
    /// Host for the global `window`, if there is one.
    pub fn new() -> Self {
        Self {
            window: web_sys::window(),
        }
    }

    pub fn with_window(window: Window) -> Self {
        Self {
            window: Some(window),
        }
    }

    /// Lazily created notifier for the global window.
    pub fn notifier_cell(config: VisibilityConfig) -> NotifierCell<Self> {
        NotifierCell::with_config(config, Self::new)
    }

    /// Whether the global object exposes `IntersectionObserver`.
    pub fn supports_intersection_observer(&self) -> bool {
        self.window.as_ref().is_some_and(|window| {
            js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver"))
                .unwrap_or(false)
        })
    }
}

impl VisibilityHost for WebVisibilityHost {
    type Element = Element;
    type Identities = ElementWeakMap;
    type Observer = WebObserver;
    type PrintListener = WebPrintListener;

    fn create_observer(
        &self,
        margin: &RootMargin,
        dispatcher: IntersectionDispatcher<Element>,
    ) -> Option<WebObserver> {
        if !self.supports_intersection_observer() {
            log::debug!("IntersectionObserver is not available");
            return None;
        }
        match WebObserver::new(margin, dispatcher) {
            Ok(observer) => Some(observer),
            Err(err) => {
                log::warn!("failed to create IntersectionObserver: {:?}", err);
                None
            }
        }
    }

    fn subscribe_print(
        &self,
        media_query: &str,
        dispatcher: PrintDispatcher,
    ) -> Option<WebPrintListener> {
        let window = self.window.as_ref()?;
        let list = match window.match_media(media_query) {
            Ok(Some(list)) => list,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("matchMedia({:?}) failed: {:?}", media_query, err);
                return None;
            }
        };
        match WebPrintListener::new(list, dispatcher) {
            Ok(listener) => Some(listener),
            Err(err) => {
                log::warn!("failed to listen for print media changes: {:?}", err);
                None
            }
        }
    }
}
