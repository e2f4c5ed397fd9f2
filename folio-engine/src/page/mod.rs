// page/ - Progressive enhancements for the static page
//
// Every feature looks up its own elements and quietly does nothing when
// they are absent. Listeners and observers live in `Page`; dropping it
// detaches them.

mod contact;
mod drawer;
mod reveal;
mod tilt;

pub use contact::{validate, FormError, Status, Submission};
pub use drawer::Drawer;
pub use reveal::RevealTracker;
pub use tilt::{tilt_angles, tilt_transform};

use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
    ScrollToOptions,
};

use crate::config::PageConfig;

pub struct Page {
    _listeners: Vec<EventListener>,
    _reveal: Option<reveal::Reveal>,
    _drawer: Option<Rc<drawer::DrawerView>>,
    _tilt: Vec<Rc<tilt::Tilt>>,
    _contact: Option<contact::ContactForm>,
}

/// Attach every enhancement whose elements exist on the page.
pub fn mount(config: &PageConfig) -> Page {
    let mut listeners = Vec::new();

    set_year();
    listeners.extend(anchor_links());
    listeners.extend(to_top(config.to_top_threshold));
    typewriter(config);

    Page {
        _listeners: listeners,
        _reveal: reveal::Reveal::observe(),
        _drawer: drawer::DrawerView::mount(&config.drawer_breakpoint),
        _tilt: tilt::Tilt::attach_all(config.tilt_max_deg as f32, config.tilt_reset_ms),
        _contact: contact::ContactForm::mount(config.submit_delay_ms),
    }
}

/// Toggle `no-scroll` on both `html` and `body`.
pub fn scroll_lock(locked: bool) {
    let Some(document) = document() else {
        return;
    };
    let roots = [
        document.document_element(),
        document.body().map(Element::from),
    ];
    for root in roots.into_iter().flatten() {
        let _ = root.class_list().toggle_with_force("no-scroll", locked);
    }
}

/// Selector an in-page link should scroll to, if any.
pub fn anchor_target(href: &str) -> Option<&str> {
    let href = href.trim();
    (href.starts_with('#') && href.len() > 1).then_some(href)
}

/// First `chars` characters of `text`.
pub fn typed_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn to_top_visible(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

fn set_year() {
    if let Some(year) = element_by_id::<Element>("year") {
        let now = js_sys::Date::new_0();
        year.set_text_content(Some(&now.get_full_year().to_string()));
    }
}

fn anchor_links() -> Vec<EventListener> {
    query_all("a[href^=\"#\"]")
        .into_iter()
        .map(|link| {
            let anchor = link.clone();
            EventListener::new_with_options(
                &link,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(href) = anchor.get_attribute("href") else {
                        return;
                    };
                    // Invalid selectors and missing targets fall through to the browser
                    let Some(target) = anchor_target(&href).and_then(query) else {
                        return;
                    };
                    event.prevent_default();
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    options.set_block(ScrollLogicalPosition::Start);
                    target.scroll_into_view_with_scroll_into_view_options(&options);
                },
            )
        })
        .collect()
}

fn to_top(threshold: f64) -> Vec<EventListener> {
    let (Some(window), Some(button)) = (web_sys::window(), element_by_id::<Element>("to-top"))
    else {
        return Vec::new();
    };

    let update = {
        let window = window.clone();
        let button = button.clone();
        move || {
            let visible = to_top_visible(window.scroll_y().unwrap_or(0.0), threshold);
            let _ = button.class_list().toggle_with_force("visible", visible);
        }
    };
    update();

    let scroll = EventListener::new(&window, "scroll", move |_| update());
    let click = EventListener::new(&button, "click", move |_| {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    });
    vec![scroll, click]
}

fn typewriter(config: &PageConfig) {
    let Some(element) = element_by_id::<Element>("typewriter") else {
        return;
    };
    element.set_text_content(Some(""));

    let text = config.typewriter_text.clone();
    let delay = config.typewriter_delay_ms;
    let speed = config.typewriter_speed_ms;
    spawn_local(async move {
        TimeoutFuture::new(delay).await;
        let total = text.chars().count();
        for typed in 1..=total {
            element.set_text_content(Some(typed_prefix(&text, typed)));
            if typed < total {
                TimeoutFuture::new(speed).await;
            }
        }
    });
}

pub(crate) fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub(crate) fn element_by_id<T: JsCast>(id: &str) -> Option<T> {
    document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub(crate) fn query(selector: &str) -> Option<Element> {
    document()?.query_selector(selector).ok().flatten()
}

pub(crate) fn query_all(selector: &str) -> Vec<Element> {
    document()
        .and_then(|d| d.query_selector_all(selector).ok())
        .map(|list| {
            (0..list.length())
                .filter_map(|i| list.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect()
        })
        .unwrap_or_default()
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn scroll_lock_toggles_html_and_body() {
        let document = document().unwrap();
        let html = document.document_element().unwrap();
        let body = document.body().unwrap();

        scroll_lock(true);
        assert!(html.class_list().contains("no-scroll"));
        assert!(body.class_list().contains("no-scroll"));

        scroll_lock(false);
        assert!(!html.class_list().contains("no-scroll"));
        assert!(!body.class_list().contains("no-scroll"));
    }

    #[wasm_bindgen_test]
    fn year_is_filled_in() {
        let document = document().unwrap();
        let span = document.create_element("span").unwrap();
        span.set_id("year");
        document.body().unwrap().append_child(&span).unwrap();

        set_year();
        let text = span.text_content().unwrap_or_default();
        assert_eq!(text.len(), 4);
        assert!(text.parse::<u32>().unwrap() >= 2024);
        span.remove();
    }
}
