// reveal.rs - Fade sections in as they scroll into view

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use super::query_all;

const SELECTOR: &str = ".reveal, .fade-in";
const ROOT_MARGIN: &str = "0px 0px -10% 0px";
const THRESHOLD: f64 = 0.15;

/// Which observed elements have already been revealed.
#[derive(Debug, Default)]
pub struct RevealTracker {
    shown: Vec<bool>,
}

impl RevealTracker {
    pub fn new(count: usize) -> Self {
        Self {
            shown: vec![false; count],
        }
    }

    /// Mark `index` revealed. True only the first time; out-of-range
    /// indices are never revealed.
    pub fn reveal(&mut self, index: usize) -> bool {
        match self.shown.get_mut(index) {
            Some(shown) if !*shown => {
                *shown = true;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.shown.iter().filter(|shown| !**shown).count()
    }
}

pub(super) struct Reveal {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Reveal {
    pub(super) fn observe() -> Option<Self> {
        let elements = query_all(SELECTOR);
        if elements.is_empty() {
            return None;
        }
        let tracker = Rc::new(RefCell::new(RevealTracker::new(elements.len())));

        let targets = elements.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    let Some(index) = targets.iter().position(|el| el.is_same_node(Some(&target)))
                    else {
                        continue;
                    };
                    if tracker.borrow_mut().reveal(index) {
                        let _ = target.class_list().add_1("visible");
                    }
                    observer.unobserve(&target);
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(ROOT_MARGIN);
        init.set_threshold(&JsValue::from_f64(THRESHOLD));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init).ok()?;
        for element in &elements {
            observer.observe(element);
        }

        Some(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for Reveal {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
