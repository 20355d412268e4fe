use compose_visibility::PrintDispatcher;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MediaQueryList;

/// `change` listener on a print media query list. Removed when dropped.
pub struct WebPrintListener {
    list: MediaQueryList,
    closure: Closure<dyn FnMut()>,
}

impl WebPrintListener {
    pub(crate) fn new(list: MediaQueryList, dispatcher: PrintDispatcher) -> Result<Self, JsValue> {
        let closure = {
            let list = list.clone();
            Closure::<dyn FnMut()>::new(move || dispatcher.dispatch(list.matches()))
        };
        list.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
        Ok(Self { list, closure })
    }

    /// Current match state of the query.
    pub fn matches(&self) -> bool {
        self.list.matches()
    }

    pub fn media_query_list(&self) -> &MediaQueryList {
        &self.list
    }
}

impl Drop for WebPrintListener {
    fn drop(&mut self) {
        if let Err(err) = self
            .list
            .remove_event_listener_with_callback("change", self.closure.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove print media listener: {:?}", err);
        }
    }
}
