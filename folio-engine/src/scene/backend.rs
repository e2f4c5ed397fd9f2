// backend.rs - Lazy loading and construction helpers
//
// The imported module is cached for the life of the page. Both phases go
// through `load`, so the background reuses whatever the intro fetched.

use std::cell::RefCell;

use glam::Vec3;
use js_sys::{Array, Float32Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlCanvasElement;

use super::bindings::{Disposable, Object3D, PerspectiveCamera, WebGlRenderer};
use crate::error::{EngineError, EngineResult};

#[wasm_bindgen(inline_js = "export function import_module(url) { return import(url); }")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(url: &str) -> Result<Promise, JsValue>;
}

thread_local! {
    static BACKEND: RefCell<Option<Three>> = const { RefCell::new(None) };
}

/// Handle to the imported three.js module.
#[derive(Clone, Debug)]
pub struct Three {
    module: Object,
}

/// Import the backend from `url`, or return the cached module.
pub async fn load(url: &str) -> EngineResult<Three> {
    if let Some(three) = BACKEND.with(|slot| slot.borrow().clone()) {
        return Ok(three);
    }

    let promise = import_module(url).map_err(EngineError::backend)?;
    let module = JsFuture::from(promise).await.map_err(EngineError::backend)?;
    let module = module
        .dyn_into::<Object>()
        .map_err(|_| EngineError::BackendUnavailable(format!("{url} is not a module")))?;
    let three = Three { module };
    // Fail here rather than halfway through building a scene
    three.class("WebGLRenderer")?;

    BACKEND.with(|slot| {
        *slot.borrow_mut() = Some(three.clone());
    });
    Ok(three)
}

impl Three {
    fn class(&self, name: &str) -> EngineResult<Function> {
        Reflect::get(&self.module, &JsValue::from_str(name))
            .map_err(EngineError::backend)?
            .dyn_into::<Function>()
            .map_err(|_| EngineError::BackendUnavailable(format!("module has no class {name}")))
    }

    /// `new THREE[name](...args)`, viewed as `T`.
    pub fn construct<T: JsCast>(&self, name: &str, args: &[JsValue]) -> EngineResult<T> {
        let class = self.class(name)?;
        let args: Array = args.iter().collect();
        let value = Reflect::construct(&class, &args).map_err(EngineError::scene)?;
        Ok(value.unchecked_into())
    }

    /// A named export that is a plain value (e.g. a blending mode).
    pub fn constant(&self, name: &str) -> EngineResult<JsValue> {
        let value = Reflect::get(&self.module, &JsValue::from_str(name)).map_err(EngineError::backend)?;
        if value.is_undefined() {
            return Err(EngineError::BackendUnavailable(format!("module has no export {name}")));
        }
        Ok(value)
    }

    pub fn group(&self) -> EngineResult<Object3D> {
        self.construct("Group", &[])
    }

    pub fn scene(&self) -> EngineResult<Object3D> {
        self.construct("Scene", &[])
    }

    pub fn camera(&self, fov: f64, near: f64, far: f64) -> EngineResult<PerspectiveCamera> {
        self.construct(
            "PerspectiveCamera",
            &[fov.into(), JsValue::from_f64(1.0), near.into(), far.into()],
        )
    }

    pub fn renderer(&self, canvas: &HtmlCanvasElement) -> EngineResult<WebGlRenderer> {
        let options = params(&[
            ("canvas", js(canvas)),
            ("antialias", true.into()),
            ("alpha", true.into()),
        ])?;
        self.construct("WebGLRenderer", &[options.into()])
    }

    pub fn vector3(&self, v: Vec3) -> EngineResult<JsValue> {
        self.construct("Vector3", &[v.x.into(), v.y.into(), v.z.into()])
    }

    /// Geometry built from a class name and its numeric constructor args.
    pub fn geometry(&self, name: &str, args: &[f64]) -> EngineResult<Disposable> {
        let args: Vec<JsValue> = args.iter().map(|&a| a.into()).collect();
        self.construct(name, &args)
    }

    /// `BufferGeometry` with a single xyz `position` attribute.
    pub fn point_geometry(&self, positions: &[f32]) -> EngineResult<Disposable> {
        let geometry: Disposable = self.construct("BufferGeometry", &[])?;
        let array = Float32Array::from(positions);
        let attribute: JsValue = self.construct("BufferAttribute", &[array.into(), JsValue::from(3)])?;
        let set_attribute = Reflect::get(&geometry, &JsValue::from_str("setAttribute"))
            .map_err(EngineError::scene)?
            .dyn_into::<Function>()
            .map_err(|_| EngineError::Scene("BufferGeometry.setAttribute missing".into()))?;
        set_attribute
            .call2(&geometry, &JsValue::from_str("position"), &attribute)
            .map_err(EngineError::scene)?;
        Ok(geometry)
    }

    pub fn material(&self, name: &str, options: &[(&str, JsValue)]) -> EngineResult<Disposable> {
        let options = params(options)?;
        self.construct(name, &[options.into()])
    }

    pub fn mesh(&self, geometry: &Disposable, material: &Disposable) -> EngineResult<Object3D> {
        self.construct("Mesh", &[js(geometry), js(material)])
    }

    pub fn points(&self, geometry: &Disposable, material: &Disposable) -> EngineResult<Object3D> {
        self.construct("Points", &[js(geometry), js(material)])
    }

    pub fn point_light(&self, color: u32, intensity: f64, distance: f64) -> EngineResult<Object3D> {
        self.construct("PointLight", &[color.into(), intensity.into(), distance.into()])
    }

    pub fn ambient_light(&self, color: u32, intensity: f64) -> EngineResult<Object3D> {
        self.construct("AmbientLight", &[color.into(), intensity.into()])
    }
}

/// Clone a bound object into a constructor argument.
pub fn js(value: &impl AsRef<JsValue>) -> JsValue {
    value.as_ref().clone()
}

/// Plain JS options object.
pub fn params(entries: &[(&str, JsValue)]) -> EngineResult<Object> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), value).map_err(EngineError::scene)?;
    }
    Ok(object)
}
