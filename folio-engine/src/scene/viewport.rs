// viewport.rs - Canvas, renderer and camera for one phase
//
// Each phase owns one Viewport. The resize listener lives as long as the
// Viewport; dropping it detaches the listener.

use glam::Vec3;
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use super::backend::Three;
use super::bindings::{Object3D, PerspectiveCamera, WebGlRenderer};
use crate::error::{EngineError, EngineResult};

/// The two drawable surfaces on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Intro,
    Background,
}

impl Surface {
    pub fn canvas_id(self) -> &'static str {
        match self {
            Self::Intro => "intro-canvas",
            Self::Background => "bg-canvas",
        }
    }

    fn selector(self) -> &'static str {
        match self {
            Self::Intro => "#intro-canvas",
            Self::Background => "#bg-canvas",
        }
    }

    pub fn canvas(self) -> EngineResult<HtmlCanvasElement> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(self.canvas_id()))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(EngineError::MissingElement(self.selector()))
    }
}

/// Camera and clear settings for a phase.
#[derive(Clone, Copy, Debug)]
pub struct Lens {
    pub fov: f64,
    pub position: Vec3,
    pub clear_color: u32,
    pub clear_alpha: f64,
}

pub struct Viewport {
    renderer: WebGlRenderer,
    camera: PerspectiveCamera,
    _resize: EventListener,
}

impl Viewport {
    pub fn new(three: &Three, surface: Surface, lens: Lens, max_pixel_ratio: f64) -> EngineResult<Self> {
        let window = web_sys::window().ok_or(EngineError::MissingElement("window"))?;
        let canvas = surface.canvas()?;

        let renderer = three.renderer(&canvas)?;
        renderer.set_pixel_ratio(window.device_pixel_ratio().min(max_pixel_ratio));
        renderer.set_clear_color(lens.clear_color, lens.clear_alpha);

        let camera = three.camera(lens.fov, 0.1, 100.0)?;
        camera.position().copy_from(lens.position);

        fit(&window, &renderer, &camera);
        let resize = {
            let (win, renderer, camera) = (window.clone(), renderer.clone(), camera.clone());
            EventListener::new(&window, "resize", move |_| fit(&win, &renderer, &camera))
        };

        Ok(Self {
            renderer,
            camera,
            _resize: resize,
        })
    }

    pub fn render(&self, scene: &Object3D) {
        self.renderer.render(scene, &self.camera);
    }

    /// Release the GL context and detach the resize listener.
    pub fn dispose(self) {
        self.renderer.dispose();
    }
}

fn fit(window: &web_sys::Window, renderer: &WebGlRenderer, camera: &PerspectiveCamera) {
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    renderer.set_size(width, height);
    camera.set_aspect(width / height);
    camera.update_projection_matrix();
}
