use compose_visibility::{ElementId, IdentityTable};
use js_sys::{Object, WeakMap};
use wasm_bindgen::JsValue;
use web_sys::Element;

/// Element identities kept in a JS `WeakMap`, so the browser can collect
/// elements that are still watched.
pub struct ElementWeakMap {
    map: WeakMap,
}

impl Default for ElementWeakMap {
    fn default() -> Self {
        Self {
            map: WeakMap::new(),
        }
    }
}

fn key(element: &Element) -> &Object {
    element.as_ref()
}

impl IdentityTable<Element> for ElementWeakMap {
    fn get(&self, element: &Element) -> Option<ElementId> {
        self.map
            .get(key(element))
            .as_f64()
            .and_then(|raw| ElementId::from_raw(raw as u64))
    }

    fn assign(&mut self, element: &Element, id: ElementId) {
        self.map.set(key(element), &JsValue::from_f64(id.get() as f64));
    }

    fn take(&mut self, element: &Element) -> Option<ElementId> {
        let id = self.get(element)?;
        self.map.delete(key(element));
        Some(id)
    }
}
