// tilt.rs - Pointer-driven 3D tilt for `[data-tilt]` cards
//
// At most one style write per animation frame: a newer pointer move drops
// (and so cancels) the pending frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MouseEvent};

use super::query_all;

const ENTER_TRANSITION: &str = "transform 160ms ease-out";
const NEUTRAL: &str = "rotateX(0) rotateY(0)";

/// `(rot_x, rot_y)` in degrees for a pointer over a box with the given
/// centre and half extents. A degenerate box yields no tilt.
pub fn tilt_angles(pointer: Vec2, center: Vec2, half: Vec2, max_deg: f32) -> (f32, f32) {
    if half.x <= 0.0 || half.y <= 0.0 {
        return (0.0, 0.0);
    }
    let offset = (pointer - center) / half;
    let rot_y = (offset.x * max_deg).clamp(-max_deg, max_deg);
    let rot_x = (-offset.y * max_deg).clamp(-max_deg, max_deg);
    (rot_x, rot_y)
}

pub fn tilt_transform(rot_x: f32, rot_y: f32) -> String {
    format!("rotateX({rot_x}deg) rotateY({rot_y}deg)")
}

pub(super) struct Tilt {
    element: HtmlElement,
    max_deg: f32,
    reset_ms: u32,
    frame: RefCell<Option<AnimationFrame>>,
    settle: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl Tilt {
    pub(super) fn attach_all(max_deg: f32, reset_ms: u32) -> Vec<Rc<Self>> {
        query_all("[data-tilt]")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .map(|element| Self::attach(element, max_deg, reset_ms))
            .collect()
    }

    fn attach(element: HtmlElement, max_deg: f32, reset_ms: u32) -> Rc<Self> {
        let tilt = Rc::new(Self {
            element,
            max_deg,
            reset_ms,
            frame: RefCell::new(None),
            settle: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&tilt);
        let moved = EventListener::new(&tilt.element, "mousemove", move |event| {
            let (Some(tilt), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
                return;
            };
            tilt.pointer_moved(Vec2::new(event.client_x() as f32, event.client_y() as f32));
        });
        let weak = Rc::downgrade(&tilt);
        let left = EventListener::new(&tilt.element, "mouseleave", move |_| {
            if let Some(tilt) = weak.upgrade() {
                tilt.reset();
            }
        });
        let weak = Rc::downgrade(&tilt);
        let entered = EventListener::new(&tilt.element, "mouseenter", move |_| {
            if let Some(tilt) = weak.upgrade() {
                tilt.set_style("transition", ENTER_TRANSITION);
            }
        });
        tilt.listeners.borrow_mut().extend([moved, left, entered]);
        tilt
    }

    fn pointer_moved(self: &Rc<Self>, pointer: Vec2) {
        let rect = self.element.get_bounding_client_rect();
        let half = Vec2::new(rect.width() as f32, rect.height() as f32) / 2.0;
        let center = Vec2::new(rect.left() as f32, rect.top() as f32) + half;
        let (rot_x, rot_y) = tilt_angles(pointer, center, half, self.max_deg);

        let weak: Weak<Self> = Rc::downgrade(self);
        let frame = request_animation_frame(move |_| {
            if let Some(tilt) = weak.upgrade() {
                tilt.set_style("transform", &tilt_transform(rot_x, rot_y));
            }
        });
        // Replacing the handle cancels the frame it held
        *self.frame.borrow_mut() = Some(frame);
    }

    fn reset(self: &Rc<Self>) {
        self.frame.borrow_mut().take();
        self.set_style(
            "transition",
            &format!("transform {}ms cubic-bezier(.2,.8,.2,1)", self.reset_ms),
        );
        self.set_style("transform", NEUTRAL);

        let weak = Rc::downgrade(self);
        let settle = Timeout::new(self.reset_ms, move || {
            if let Some(tilt) = weak.upgrade() {
                tilt.set_style("transition", "");
            }
        });
        *self.settle.borrow_mut() = Some(settle);
    }

    fn set_style(&self, property: &str, value: &str) {
        let _ = self.element.style().set_property(property, value);
    }
}
