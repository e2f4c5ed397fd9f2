// runtime.rs - Executes sequencer effects in the browser
//
// One event queue: `dispatch` appends and, unless a drain is already in
// progress further up the stack, drains it. Effects never call back into
// the sequencer directly, so a step never observes a half-applied step.
//
// Timers and frame callbacks hold a Weak back-reference; dropping their
// handle cancels them.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use gloo::console;
use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, PageTransitionEvent};

use crate::config::Config;
use crate::flag::FlagStore;
use crate::page;
use crate::render::{AmbientScene, IntroScene};
use crate::scene::{self, Surface};
use crate::sequencer::{Effect, Event, Phase, Sequencer, Timings};
use crate::sim::seed_from;

pub struct Runtime {
    config: Config,
    flags: Box<dyn FlagStore>,
    overlay: Option<HtmlElement>,
    sequencer: RefCell<Sequencer>,
    queue: RefCell<VecDeque<Event>>,
    draining: Cell<bool>,
    seed: u32,

    safety: RefCell<Option<Timeout>>,
    cleanup: RefCell<Option<Timeout>>,
    frame: RefCell<Option<AnimationFrame>>,
    background_frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,

    intro: RefCell<Option<IntroScene>>,
    background: RefCell<Option<AmbientScene>>,
}

impl Runtime {
    pub fn new(config: Config, flags: Box<dyn FlagStore>) -> Rc<Self> {
        let overlay = page::element_by_id::<HtmlElement>("intro");
        let timings = Timings::from(&config.intro);
        Rc::new(Self {
            config,
            flags,
            overlay,
            sequencer: RefCell::new(Sequencer::new(timings)),
            queue: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
            seed: seed_from(js_sys::Date::now()),
            safety: RefCell::new(None),
            cleanup: RefCell::new(None),
            frame: RefCell::new(None),
            background_frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            intro: RefCell::new(None),
            background: RefCell::new(None),
        })
    }

    /// Wire the skip control and page teardown, then kick off the sequence.
    pub fn start(self: &Rc<Self>) {
        let mut listeners = Vec::new();
        if let Some(skip) = page::query(".skip-intro") {
            let this = Rc::downgrade(self);
            listeners.push(EventListener::new(&skip, "click", move |_| {
                send(&this, Event::Skip);
            }));
        }
        if let Some(window) = web_sys::window() {
            let this = Rc::downgrade(self);
            listeners.push(EventListener::new(&window, "pagehide", move |event| {
                // A page entering the back/forward cache resumes as it was
                let cached = event
                    .dyn_ref::<PageTransitionEvent>()
                    .is_some_and(|event| event.persisted());
                if !cached {
                    send(&this, Event::Teardown);
                }
            }));
        }
        self.listeners.borrow_mut().extend(listeners);

        self.dispatch(Event::Start);
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.borrow().phase()
    }

    pub fn dispatch(self: &Rc<Self>, event: Event) {
        self.queue.borrow_mut().push_back(event);
        if self.draining.replace(true) {
            return;
        }
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            let before = self.phase();
            let effects = self.sequencer.borrow_mut().step(event);
            let after = self.phase();
            if before != after {
                console::debug!(format!("intro: {before:?} -> {after:?} on {event:?}"));
                if let Phase::IntroEnding { .. } = after {
                    let reason = self.sequencer.borrow().exit_reason();
                    console::debug!(format!("intro ended: {reason:?}"));
                }
            }
            for effect in effects {
                self.apply(effect);
            }
        }
        self.draining.set(false);
    }

    fn apply(self: &Rc<Self>, effect: Effect) {
        match effect {
            Effect::ReadFlag => {
                // No overlay or canvas on this page: nothing to play, nothing to record
                let played = self.overlay.is_none()
                    || Surface::Intro.canvas().is_err()
                    || self.flags.has_played();
                self.queue.borrow_mut().push_back(Event::FlagRead(played));
            }
            Effect::LockPage => page::scroll_lock(true),
            Effect::UnlockPage => page::scroll_lock(false),
            Effect::LoadBackend => self.load_intro(),
            Effect::ArmSafetyTimer(ms) => {
                let this = Rc::downgrade(self);
                let timer = Timeout::new(ms, move || send(&this, Event::SafetyTimeout));
                *self.safety.borrow_mut() = Some(timer);
            }
            Effect::CancelSafetyTimer => {
                self.safety.borrow_mut().take();
            }
            Effect::RequestFrame => {
                let this = Rc::downgrade(self);
                let handle = request_animation_frame(move |now| send(&this, Event::Frame { now }));
                *self.frame.borrow_mut() = Some(handle);
            }
            Effect::CancelFrame => {
                self.frame.borrow_mut().take();
            }
            Effect::RenderIntro { progress, rebuild_trail } => {
                if let Some(intro) = self.intro.borrow_mut().as_mut() {
                    // A bad frame is cosmetic; the safety timer still guarantees exit
                    if let Err(err) = intro.render(progress, rebuild_trail) {
                        console::warn!(format!("intro frame failed: {err}"));
                    }
                }
            }
            Effect::MarkPlayed => self.flags.mark_played(),
            Effect::HideOverlay => {
                if let Some(overlay) = &self.overlay {
                    let _ = overlay.class_list().add_1("hidden");
                }
            }
            Effect::RemoveOverlay => {
                if let Some(overlay) = &self.overlay {
                    let _ = overlay.style().set_property("display", "none");
                }
            }
            Effect::StartBackground => self.start_background(),
            Effect::ScheduleCleanup(ms) => {
                let this = Rc::downgrade(self);
                let timer = Timeout::new(ms, move || send(&this, Event::CleanupDue));
                *self.cleanup.borrow_mut() = Some(timer);
            }
            Effect::CancelCleanup => {
                self.cleanup.borrow_mut().take();
            }
            Effect::DisposeIntro => {
                let intro = self.intro.borrow_mut().take();
                if let Some(intro) = intro {
                    intro.dispose();
                    console::debug!("intro resources released");
                }
            }
        }
    }

    fn load_intro(self: &Rc<Self>) {
        let this = Rc::downgrade(self);
        let config = self.config.clone();
        let seed = self.seed;
        spawn_local(async move {
            let built = match scene::load(&config.backend_url).await {
                Ok(three) => IntroScene::build(&three, &config, seed),
                Err(err) => Err(err),
            };
            let Some(this) = this.upgrade() else {
                return;
            };
            match built {
                Ok(intro) => {
                    *this.intro.borrow_mut() = Some(intro);
                    this.dispatch(Event::IntroReady { now: now() });
                }
                Err(err) => {
                    console::warn!(format!("intro unavailable, skipping: {err}"));
                    this.dispatch(Event::BackendFailed);
                }
            }
        });
    }

    /// Bring up the background. After an intro, wait one frame so the
    /// overlay fade begins first; with no intro, start right away.
    fn start_background(self: &Rc<Self>) {
        if self.phase() == Phase::SkipToBackground {
            self.load_background();
            return;
        }
        let this = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            if let Some(this) = this.upgrade() {
                this.load_background();
            }
        });
        *self.background_frame.borrow_mut() = Some(handle);
    }

    /// Failure leaves the page without a 3D backdrop.
    fn load_background(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let config = self.config.clone();
        let seed = self.seed.rotate_left(16) | 1;
        spawn_local(async move {
            let started = match scene::load(&config.backend_url).await {
                Ok(three) => AmbientScene::start(&three, &config, seed, now()),
                Err(err) => Err(err),
            };
            let Some(this) = weak.upgrade() else {
                return;
            };
            match started {
                Ok(background) => {
                    *this.background.borrow_mut() = Some(background);
                    this.dispatch(Event::BackgroundStarted);
                }
                Err(err) => {
                    console::warn!(format!("continuing without 3D background: {err}"));
                }
            }
        });
    }

    /// Stop everything this runtime scheduled.
    pub fn teardown(self: &Rc<Self>) {
        self.dispatch(Event::Teardown);
        if let Some(background) = self.background.borrow().as_ref() {
            background.pause();
        }
        self.background_frame.borrow_mut().take();
        self.listeners.borrow_mut().clear();
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn frame_pending(&self) -> bool {
        self.frame.borrow().is_some()
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn background_waiting(&self) -> bool {
        self.background_frame.borrow().is_some()
    }
}

fn send(runtime: &Weak<Runtime>, event: Event) {
    if let Some(runtime) = runtime.upgrade() {
        if event == Event::Teardown {
            runtime.teardown();
        } else {
            runtime.dispatch(event);
        }
    }
}

/// Milliseconds on the same clock as animation frame timestamps.
fn now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::flag::MemoryFlagStore;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn with_overlay() -> HtmlElement {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(existing) = document.get_element_by_id("intro") {
            existing.remove();
        }
        let overlay = document
            .create_element("div")
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap();
        overlay.set_id("intro");
        let canvas = document.create_element("canvas").unwrap();
        canvas.set_id("intro-canvas");
        overlay.append_child(&canvas).unwrap();
        document.body().unwrap().append_child(&overlay).unwrap();
        overlay
    }

    #[wasm_bindgen_test]
    fn played_flag_skips_without_frames() {
        let overlay = with_overlay();
        let runtime = Runtime::new(Config::default(), Box::new(MemoryFlagStore::played()));
        runtime.start();
        assert_eq!(runtime.phase(), Phase::SkipToBackground);
        assert!(!runtime.frame_pending());
        // No intro to fade out, so the background does not wait a frame
        assert!(!runtime.background_waiting());
        assert!(overlay.class_list().contains("hidden"));
        assert_eq!(overlay.style().get_property_value("display").unwrap(), "none");
        overlay.remove();
    }

    #[wasm_bindgen_test]
    fn missing_overlay_counts_as_played() {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(existing) = document.get_element_by_id("intro") {
            existing.remove();
        }
        let runtime = Runtime::new(Config::default(), Box::new(MemoryFlagStore::default()));
        runtime.start();
        assert_eq!(runtime.phase(), Phase::SkipToBackground);
    }

    #[wasm_bindgen_test]
    fn unplayed_flag_locks_the_page() {
        let overlay = with_overlay();
        let runtime = Runtime::new(Config::default(), Box::new(MemoryFlagStore::default()));
        runtime.start();
        assert!(matches!(runtime.phase(), Phase::PlayingIntro(_)));
        let body = web_sys::window().unwrap().document().unwrap().body().unwrap();
        assert!(body.class_list().contains("no-scroll"));
        runtime.dispatch(Event::Skip);
        assert!(matches!(runtime.phase(), Phase::IntroEnding { .. }));
        assert!(!body.class_list().contains("no-scroll"));
        assert!(runtime.background_waiting());
        runtime.teardown();
        overlay.remove();
    }

    #[wasm_bindgen_test]
    fn missing_canvas_skips_without_recording() {
        let overlay = with_overlay();
        if let Some(canvas) = overlay.query_selector("#intro-canvas").unwrap() {
            canvas.remove();
        }
        let flags = Rc::new(MemoryFlagStore::default());
        let runtime = Runtime::new(Config::default(), Box::new(Rc::clone(&flags)));
        runtime.start();
        assert_eq!(runtime.phase(), Phase::SkipToBackground);
        assert_eq!(flags.writes(), 0);
        overlay.remove();
    }

    #[wasm_bindgen_test]
    fn teardown_mid_intro_unlocks_and_uncovers() {
        let overlay = with_overlay();
        let runtime = Runtime::new(Config::default(), Box::new(MemoryFlagStore::default()));
        runtime.start();
        let body = web_sys::window().unwrap().document().unwrap().body().unwrap();
        assert!(body.class_list().contains("no-scroll"));

        runtime.teardown();
        assert_eq!(runtime.phase(), Phase::TornDown);
        assert!(!body.class_list().contains("no-scroll"));
        assert!(overlay.class_list().contains("hidden"));
        assert_eq!(overlay.style().get_property_value("display").unwrap(), "none");
        overlay.remove();
    }
}
