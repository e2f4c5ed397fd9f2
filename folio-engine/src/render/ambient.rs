// ambient.rs - Persistent decorative background
//
// Torus knot and icosahedron in a parallax group, plus a slowly turning
// particle sphere. Runs an unbounded frame loop until paused or dropped.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::MouseEvent;

use super::Resources;
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::scene::{Disposable, Lens, Object3D, Surface, Three, Viewport};
use crate::sim::{particle_sphere, AmbientMotion};

const LENS: Lens = Lens {
    fov: 55.0,
    position: Vec3::new(0.0, 0.2, 6.0),
    clear_color: 0x000000,
    clear_alpha: 0.0,
};

const PARTICLE_RADIUS: f32 = 6.0;

pub struct AmbientScene {
    inner: Rc<Inner>,
    _listeners: Vec<EventListener>,
}

struct Inner {
    viewport: Viewport,
    scene: Object3D,
    group: Object3D,
    knot: Object3D,
    ico: Object3D,
    particles: Object3D,
    motion: RefCell<AmbientMotion>,
    started_at: f64,
    frame: RefCell<Option<AnimationFrame>>,
    // Held for the page lifetime; the host reclaims GPU memory on unload.
    _resources: Resources,
}

impl AmbientScene {
    /// Build the scene and start its frame loop.
    pub fn start(three: &Three, config: &Config, seed: u32, now: f64) -> EngineResult<Self> {
        let window = web_sys::window().ok_or(EngineError::MissingElement("window"))?;
        let viewport = Viewport::new(three, Surface::Background, LENS, config.max_pixel_ratio)?;
        let scene = three.scene()?;
        let mut resources = Resources::default();

        let light = three.point_light(0x7c3aed, 1.5, 30.0)?;
        light.position().copy_from(Vec3::new(-4.0, 2.0, 2.0));
        scene.add(&light);
        let light = three.point_light(0x06b6d4, 1.3, 30.0)?;
        light.position().copy_from(Vec3::new(4.0, -1.0, 1.0));
        scene.add(&light);
        scene.add(&three.ambient_light(0x446688, 0.35)?);

        let group = three.group()?;
        scene.add(&group);

        let material_a = resources.keep(glass(three, 0x3b82f6, 0x1b2a5a, 80.0, 0x88aaff, 0.9)?);
        let material_b = resources.keep(glass(three, 0x7c3aed, 0x2a0a4a, 120.0, 0xaa88ff, 0.85)?);

        let knot_geo = resources.keep(three.geometry("TorusKnotGeometry", &[1.0, 0.28, 180.0, 24.0])?);
        let knot = three.mesh(&knot_geo, &material_a)?;
        knot.position().copy_from(Vec3::new(-1.6, 0.2, -1.5));
        group.add(&knot);

        let ico_geo = resources.keep(three.geometry("IcosahedronGeometry", &[1.1, 0.0])?);
        let ico = three.mesh(&ico_geo, &material_b)?;
        ico.position().copy_from(Vec3::new(1.7, -0.3, -1.2));
        group.add(&ico);

        let mut rng = seed;
        let positions = particle_sphere(config.background.particle_count, PARTICLE_RADIUS, &mut rng);
        let particle_geo = resources.keep(three.point_geometry(&positions)?);
        let particle_mat = resources.keep(three.material(
            "PointsMaterial",
            &[
                ("color", JsValue::from(0x8fb5ff)),
                ("size", JsValue::from(0.02)),
                ("transparent", true.into()),
                ("opacity", JsValue::from(0.65)),
            ],
        )?);
        let particles = three.points(&particle_geo, &particle_mat)?;
        scene.add(&particles);

        let inner = Rc::new(Inner {
            viewport,
            scene,
            group,
            knot,
            ico,
            particles,
            motion: RefCell::new(AmbientMotion::new(config.background.smoothing)),
            started_at: now,
            frame: RefCell::new(None),
            _resources: resources,
        });

        let pointer = {
            let inner = Rc::clone(&inner);
            let win = window.clone();
            EventListener::new(&window, "mousemove", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let viewport = Vec2::new(
                    win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
                    win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
                );
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                inner.motion.borrow_mut().set_pointer(client, viewport);
            })
        };

        inner.tick(now);
        inner.schedule();

        Ok(Self {
            inner,
            _listeners: vec![pointer],
        })
    }

    /// Stop the frame loop. Resources stay alive until the scene is dropped.
    pub fn pause(&self) {
        self.inner.frame.borrow_mut().take();
    }
}

impl Inner {
    fn schedule(self: &Rc<Self>) {
        let this = Rc::downgrade(self);
        let handle = request_animation_frame(move |now| {
            if let Some(this) = this.upgrade() {
                this.tick(now);
                this.schedule();
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn tick(&self, now: f64) {
        let elapsed = ((now - self.started_at) / 1000.0).max(0.0) as f32;
        let pose = self.motion.borrow_mut().step(elapsed);

        self.knot.rotation().copy_from(pose.knot_rotation);
        self.ico.rotation().copy_from(pose.ico_rotation);
        self.particles.rotation().set_y(pose.particles_rotation_y as f64);

        let position = self.group.position();
        position.set_x(pose.group_position.x as f64);
        position.set_y(pose.group_position.y as f64);

        self.viewport.render(&self.scene);
    }
}

fn glass(
    three: &Three,
    color: u32,
    emissive: u32,
    shininess: f64,
    specular: u32,
    opacity: f64,
) -> EngineResult<Disposable> {
    three.material(
        "MeshPhongMaterial",
        &[
            ("color", color.into()),
            ("emissive", emissive.into()),
            ("shininess", shininess.into()),
            ("specular", specular.into()),
            ("transparent", true.into()),
            ("opacity", opacity.into()),
        ],
    )
}
