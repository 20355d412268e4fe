#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use compose_platform_web::{ElementWeakMap, WebVisibilityHost, WebVisibilityNotifier};
use compose_visibility::{
    ElementId, IdentityTable, IntersectionDispatcher, IntersectionRecord, PrintDispatcher,
    RootMargin, VisibilityConfig, VisibilityHost, VisibilityObserver, VisibilityReason,
};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Element, Event, MediaQueryList};

wasm_bindgen_test_configure!(run_in_browser);

fn create_element() -> Element {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.create_element("div").ok())
        .expect("document should create a div")
}

fn attached_element(style: &str) -> Element {
    let element = create_element();
    element
        .set_attribute("style", style)
        .expect("style should be settable");
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
        .expect("document should have a body")
        .append_child(&element)
        .expect("body should accept the element");
    element
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .expect("window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("setTimeout");
    });
    JsFuture::from(promise).await.expect("timer resolves");
}

fn dispatch(list: &MediaQueryList, event: &Event) {
    list.dispatch_event(event).expect("dispatch change event");
}

/// Yields to the event loop until `done` holds or roughly two seconds pass.
async fn wait_until(done: impl Fn() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        sleep(20).await;
    }
}

#[wasm_bindgen_test]
fn weak_map_tracks_identity_per_element() {
    let mut table = ElementWeakMap::default();
    let first = create_element();
    let second = create_element();
    let id = ElementId::from_raw(3).unwrap();

    table.assign(&first, id);
    assert_eq!(table.get(&first), Some(id));
    assert_eq!(table.get(&first.clone()), Some(id));
    assert_eq!(table.get(&second), None);

    assert_eq!(table.take(&first), Some(id));
    assert_eq!(table.get(&first), None);
}

#[wasm_bindgen_test]
fn browser_host_supports_observer_and_print() {
    let host = WebVisibilityHost::new();
    assert!(host.supports_intersection_observer());

    let notifier = WebVisibilityNotifier::new(&host);
    assert!(notifier.supported());
    assert!(notifier.print_hook_installed());

    let element = create_element();
    notifier.watch(&element, |_| {});
    assert!(notifier.is_watching(&element));
    notifier.unwatch(&element);
    assert!(!notifier.is_watching(&element));
}

#[wasm_bindgen_test]
fn notifier_cell_memoises_browser_notifier() {
    let cell = WebVisibilityHost::notifier_cell(VisibilityConfig::default());
    let element = create_element();

    cell.get().watch(&element, |_| {});
    assert!(cell.get().is_watching(&element));

    cell.reset();
    assert!(!cell.get().is_watching(&element));
}

#[wasm_bindgen_test]
async fn observer_turns_entries_into_records() {
    let host = WebVisibilityHost::new();
    let seen: Rc<RefCell<Vec<(Element, bool)>>> = Rc::default();
    let dispatcher = {
        let seen = Rc::clone(&seen);
        IntersectionDispatcher::new(move |records: Vec<IntersectionRecord<Element>>| {
            seen.borrow_mut().extend(
                records
                    .into_iter()
                    .map(|record| (record.target, record.is_intersecting)),
            );
        })
    };
    let observer = host
        .create_observer(&RootMargin::uniform(0.0), dispatcher)
        .expect("browser should provide an observer");

    let onscreen = attached_element("width: 20px; height: 20px;");
    let offscreen =
        attached_element("position: absolute; top: 100000px; width: 20px; height: 20px;");
    observer.observe(&onscreen);
    observer.observe(&offscreen);

    wait_until(|| seen.borrow().len() >= 2).await;
    {
        let seen = seen.borrow();
        assert!(seen.contains(&(onscreen.clone(), true)));
        assert!(seen.contains(&(offscreen.clone(), false)));
    }

    drop(observer);
    onscreen.remove();
    offscreen.remove();
}

#[wasm_bindgen_test]
async fn notifier_fires_once_for_a_visible_element() {
    let notifier = WebVisibilityNotifier::new(&WebVisibilityHost::new());
    let element = attached_element("width: 20px; height: 20px;");
    let reasons: Rc<RefCell<Vec<VisibilityReason>>> = Rc::default();
    {
        let reasons = Rc::clone(&reasons);
        notifier.watch(&element, move |reason| reasons.borrow_mut().push(reason));
    }

    wait_until(|| !reasons.borrow().is_empty()).await;

    assert_eq!(*reasons.borrow(), vec![VisibilityReason::Intersect]);
    assert!(!notifier.is_watching(&element));
    element.remove();
}

#[wasm_bindgen_test]
fn print_listener_reports_the_window_media_state() {
    let host = WebVisibilityHost::new();
    let listener = host
        .subscribe_print("print", PrintDispatcher::new(|_| {}))
        .expect("browser should support matchMedia");
    let window_state = web_sys::window()
        .and_then(|window| window.match_media("print").ok().flatten())
        .expect("print media query list")
        .matches();

    assert_eq!(listener.matches(), window_state);
    assert!(!listener.matches());
}

#[wasm_bindgen_test]
fn change_event_dispatches_current_match_state() {
    let host = WebVisibilityHost::new();
    let seen: Rc<RefCell<Vec<bool>>> = Rc::default();
    let recorder = {
        let seen = Rc::clone(&seen);
        PrintDispatcher::new(move |matches| seen.borrow_mut().push(matches))
    };
    let change = Event::new("change").expect("change event");

    let matching = host
        .subscribe_print("all", recorder.clone())
        .expect("listener for 'all'");
    let never = host
        .subscribe_print("not all", recorder)
        .expect("listener for 'not all'");
    dispatch(matching.media_query_list(), &change);
    dispatch(never.media_query_list(), &change);
    assert_eq!(*seen.borrow(), vec![true, false]);

    let list = matching.media_query_list().clone();
    drop(matching);
    dispatch(&list, &change);
    assert_eq!(seen.borrow().len(), 2);
}
