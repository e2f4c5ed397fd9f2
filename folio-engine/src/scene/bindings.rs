// bindings.rs - Typed views over three.js objects
//
// Only the members the intro and background scenes touch are bound.

use glam::Vec3;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, Debug)]
    pub type Object3D;

    #[wasm_bindgen(method)]
    pub fn add(this: &Object3D, child: &Object3D);

    #[wasm_bindgen(method)]
    pub fn remove(this: &Object3D, child: &Object3D);

    #[wasm_bindgen(method, getter)]
    pub fn position(this: &Object3D) -> Vector3;

    #[wasm_bindgen(method, getter)]
    pub fn rotation(this: &Object3D) -> Euler;

    #[wasm_bindgen(method, getter)]
    pub fn scale(this: &Object3D) -> Vector3;

    #[wasm_bindgen(method, js_name = lookAt)]
    pub fn look_at(this: &Object3D, x: f64, y: f64, z: f64);

    #[wasm_bindgen(method, js_name = rotateZ)]
    pub fn rotate_z(this: &Object3D, angle: f64);

    #[derive(Clone, Debug)]
    #[wasm_bindgen(extends = Object3D)]
    pub type PerspectiveCamera;

    #[wasm_bindgen(method, setter)]
    pub fn set_aspect(this: &PerspectiveCamera, aspect: f64);

    #[wasm_bindgen(method, js_name = updateProjectionMatrix)]
    pub fn update_projection_matrix(this: &PerspectiveCamera);

    #[derive(Clone, Debug)]
    pub type Vector3;

    #[wasm_bindgen(method)]
    pub fn set(this: &Vector3, x: f64, y: f64, z: f64);

    #[wasm_bindgen(method, setter)]
    pub fn set_x(this: &Vector3, x: f64);

    #[wasm_bindgen(method, setter)]
    pub fn set_y(this: &Vector3, y: f64);

    #[derive(Clone, Debug)]
    pub type Euler;

    #[wasm_bindgen(method, setter)]
    pub fn set_x(this: &Euler, x: f64);

    #[wasm_bindgen(method, setter)]
    pub fn set_y(this: &Euler, y: f64);

    #[wasm_bindgen(method, setter)]
    pub fn set_z(this: &Euler, z: f64);

    /// Geometries and materials: anything holding GPU buffers.
    #[derive(Clone, Debug)]
    pub type Disposable;

    #[wasm_bindgen(method)]
    pub fn dispose(this: &Disposable);

    #[derive(Clone, Debug)]
    pub type WebGlRenderer;

    #[wasm_bindgen(method, js_name = setPixelRatio)]
    pub fn set_pixel_ratio(this: &WebGlRenderer, ratio: f64);

    #[wasm_bindgen(method, js_name = setClearColor)]
    pub fn set_clear_color(this: &WebGlRenderer, color: u32, alpha: f64);

    #[wasm_bindgen(method, js_name = setSize)]
    pub fn set_size(this: &WebGlRenderer, width: f64, height: f64);

    #[wasm_bindgen(method)]
    pub fn render(this: &WebGlRenderer, scene: &Object3D, camera: &PerspectiveCamera);

    #[wasm_bindgen(method)]
    pub fn dispose(this: &WebGlRenderer);
}

impl Vector3 {
    pub fn copy_from(&self, v: Vec3) {
        self.set(v.x as f64, v.y as f64, v.z as f64);
    }
}

impl Euler {
    pub fn copy_from(&self, v: Vec3) {
        self.set_x(v.x as f64);
        self.set_y(v.y as f64);
        self.set_z(v.z as f64);
    }
}
