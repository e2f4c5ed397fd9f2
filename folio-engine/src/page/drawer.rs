// drawer.rs - Off-canvas navigation for narrow screens
//
// The desktop link list is cloned into a drawer appended to <body>. The
// drawer, the menu button and the backdrop always reflect one `Drawer`
// state; every close trigger funnels through `DrawerView::close`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent};

use super::{document, query};

const CLOSE_ICON: &str = r#"<svg width="18" height="18" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="M6 6l12 12M18 6L6 18" stroke="currentColor" stroke-width="2" stroke-linecap="round"/></svg>"#;

/// Open/closed state. Every transition reports whether anything changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Drawer {
    open: bool,
}

impl Drawer {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn open(&mut self) -> bool {
        self.set(true)
    }

    pub fn close(&mut self) -> bool {
        self.set(false)
    }

    pub fn toggle(&mut self) -> bool {
        self.set(!self.open)
    }

    fn set(&mut self, open: bool) -> bool {
        let changed = self.open != open;
        self.open = open;
        changed
    }
}

pub(super) struct DrawerView {
    state: Cell<Drawer>,
    panel: Element,
    button: Element,
    backdrop: HtmlElement,
    listeners: RefCell<Vec<EventListener>>,
}

impl DrawerView {
    pub(super) fn mount(breakpoint: &str) -> Option<Rc<Self>> {
        let button = query(".menu-toggle")?;
        let links = query(".site-nav .nav-links")?;
        let backdrop = query(".nav-backdrop")?.dyn_into::<HtmlElement>().ok()?;
        let document = document()?;
        let window = web_sys::window()?;

        let panel = document.create_element("div").ok()?;
        panel.set_class_name("nav-drawer");
        let header = document.create_element("div").ok()?;
        header.set_class_name("drawer-header");
        let title = document.create_element("div").ok()?;
        title.set_class_name("drawer-title");
        title.set_text_content(Some("Menu"));
        let close = document.create_element("button").ok()?;
        close.set_class_name("drawer-close");
        close.set_attribute("aria-label", "Close menu").ok()?;
        close.set_inner_html(CLOSE_ICON);
        header.append_child(&title).ok()?;
        header.append_child(&close).ok()?;
        let list = links.clone_node_with_deep(true).ok()?.dyn_into::<Element>().ok()?;
        panel.append_child(&header).ok()?;
        panel.append_child(&list).ok()?;
        document.body()?.append_child(&panel).ok()?;

        let view = Rc::new(Self {
            state: Cell::new(Drawer::default()),
            panel,
            button,
            backdrop,
            listeners: RefCell::new(Vec::new()),
        });

        let mut listeners = vec![
            on(&view.button, "click", &view, |view| view.toggle()),
            on(&view.backdrop, "click", &view, |view| view.close()),
            on(&close, "click", &view, |view| view.close()),
        ];
        if let Ok(anchors) = list.query_selector_all("a") {
            for anchor in (0..anchors.length()).filter_map(|i| anchors.item(i)) {
                listeners.push(on(&anchor, "click", &view, |view| view.close()));
            }
        }
        {
            let weak = Rc::downgrade(&view);
            listeners.push(EventListener::new(&window, "keydown", move |event| {
                let escape = event
                    .dyn_ref::<KeyboardEvent>()
                    .is_some_and(|key| key.key() == "Escape");
                if escape {
                    with(&weak, |view| view.close());
                }
            }));
        }
        // Crossing back to the desktop layout leaves no drawer behind
        if let Ok(Some(media)) = window.match_media(breakpoint) {
            listeners.push(on(&media, "change", &view, |view| view.close()));
        }
        view.listeners.borrow_mut().extend(listeners);

        view.render();
        Some(view)
    }

    pub(super) fn is_open(&self) -> bool {
        self.state.get().is_open()
    }

    fn toggle(&self) {
        self.update(Drawer::toggle);
    }

    fn close(&self) {
        self.update(Drawer::close);
    }

    fn update(&self, transition: impl FnOnce(&mut Drawer) -> bool) {
        let mut state = self.state.get();
        if transition(&mut state) {
            self.state.set(state);
            self.render();
        }
    }

    fn render(&self) {
        let open = self.is_open();
        let _ = self.panel.class_list().toggle_with_force("open", open);
        let _ = self.button.class_list().toggle_with_force("open", open);
        self.backdrop.set_hidden(!open);
        let _ = self
            .button
            .set_attribute("aria-expanded", if open { "true" } else { "false" });
    }
}

impl Drop for DrawerView {
    fn drop(&mut self) {
        self.listeners.get_mut().clear();
        self.panel.remove();
    }
}

fn on(
    target: &web_sys::EventTarget,
    event: &'static str,
    view: &Rc<DrawerView>,
    action: fn(&DrawerView),
) -> EventListener {
    let weak = Rc::downgrade(view);
    EventListener::new(target, event, move |_| with(&weak, action))
}

fn with(view: &Weak<DrawerView>, action: impl FnOnce(&DrawerView)) {
    if let Some(view) = view.upgrade() {
        action(&view);
    }
}
