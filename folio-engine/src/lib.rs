// lib.rs - Portfolio page engine
//
// The JS host does `new Site(configJson).start()` once the DOM is ready.
// Everything else (intro flight, ambient background, page enhancements)
// hangs off that call.

pub mod config;
pub mod error;
pub mod flag;
pub mod page;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod sequencer;
pub mod sim;

use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use wasm_bindgen::prelude::*;

use config::Config;
use flag::WebFlagStore;
use page::Page;
use runtime::Runtime;
use sequencer::Event;

#[wasm_bindgen]
pub struct Site {
    config: Config,
    runtime: Rc<Runtime>,
    page: RefCell<Option<Page>>,
}

#[wasm_bindgen]
impl Site {
    /// `config_json` may override any subset of the defaults. Only a
    /// malformed override is an error.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Site, JsValue> {
        let config = Config::from_json(config_json.as_deref())?;
        let runtime = Runtime::new(config.clone(), Box::new(WebFlagStore));
        Ok(Self {
            config,
            runtime,
            page: RefCell::new(None),
        })
    }

    /// Mount page enhancements and begin the intro sequence. Idempotent.
    pub fn start(&self) {
        if self.page.borrow().is_some() {
            return;
        }
        *self.page.borrow_mut() = Some(page::mount(&self.config.page));
        self.runtime.start();
        console::log!("folio-engine started");
    }

    #[wasm_bindgen(js_name = skipIntro)]
    pub fn skip_intro(&self) {
        self.runtime.dispatch(Event::Skip);
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        self.runtime.teardown();
    }
}
