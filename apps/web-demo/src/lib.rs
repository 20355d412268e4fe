use compose_platform_web::{WebVisibilityHost, WebVisibilityNotifier};
use compose_visibility::{RootMargin, VisibilityConfig, VisibilityReason, WatchDisposer};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Visibility demo starting...");
}

/// Appends placeholder rows to a container and fills each one in when it
/// nears the viewport or when the page is printed.
#[wasm_bindgen]
pub struct LazyRowsDemo {
    notifier: WebVisibilityNotifier,
    rows: Vec<Element>,
    disposers: Vec<WatchDisposer<WebVisibilityHost>>,
}

#[wasm_bindgen]
impl LazyRowsDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        row_count: u32,
        margin_px: f32,
    ) -> Result<LazyRowsDemo, JsValue> {
        let window = web_sys::window().ok_or("no global window exists")?;
        let document = window.document().ok_or("should have a document on window")?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| format!("container with id '{}' not found", container_id))?;

        let config =
            VisibilityConfig::new().with_root_margin(RootMargin::symmetric(0.0, margin_px));
        let host = WebVisibilityHost::with_window(window);
        let notifier = WebVisibilityNotifier::with_config(&host, config);
        if !notifier.supported() {
            log::warn!("IntersectionObserver unavailable, rows stay as placeholders");
        }

        let mut rows = Vec::with_capacity(row_count as usize);
        let mut disposers = Vec::with_capacity(row_count as usize);
        for index in 0..row_count {
            let row = placeholder_row(&document, index)?;
            container.append_child(&row)?;

            let target = row.clone();
            disposers.push(notifier.use_once(&row, move |reason| {
                fill_row(&target, index, reason)
            }));
            rows.push(row);
        }
        log::info!("watching {} rows", notifier.watched_count());

        Ok(LazyRowsDemo {
            notifier,
            rows,
            disposers,
        })
    }

    /// Rows still waiting to be filled by an intersection.
    pub fn pending(&self) -> usize {
        self.notifier.watched_count()
    }

    /// Releases every outstanding watch and removes the rows.
    pub fn unmount(&mut self) {
        for disposer in self.disposers.drain(..) {
            disposer.dispose();
        }
        for row in self.rows.drain(..) {
            row.remove();
        }
    }
}

fn placeholder_row(document: &Document, index: u32) -> Result<Element, JsValue> {
    let row = document.create_element("div")?;
    row.set_class_name("lazy-row");
    row.set_attribute("data-state", "pending")?;
    row.set_text_content(Some(&format!("Row {} (not loaded)", index)));
    Ok(row)
}

fn fill_row(row: &Element, index: u32, reason: VisibilityReason) {
    row.set_text_content(Some(&format!("Row {} loaded ({})", index, reason)));
    if let Err(err) = row.set_attribute("data-state", reason.as_str()) {
        log::warn!("failed to mark row {}: {:?}", index, err);
    }
}
