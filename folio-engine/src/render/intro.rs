// intro.rs - One-shot jet flight over a starfield
//
// Scene graph:
//   scene
//   ├── stars   (Points, parallax with progress)
//   ├── jet     (Group: fuselage, nose, tail, wings, fin, two glow lights)
//   ├── trail   (Group: two additive tubes rebuilt from recent positions)
//   └── ambient light

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use wasm_bindgen::JsValue;

use super::Resources;
use crate::config::Config;
use crate::error::EngineResult;
use crate::scene::{Disposable, Lens, Object3D, Surface, Three, Viewport};
use crate::sim::{starfield, FlightPath, IntroPose, TrailHistory};

const LENS: Lens = Lens {
    fov: 60.0,
    position: Vec3::new(0.0, 0.3, 5.5),
    clear_color: 0x000000,
    clear_alpha: 1.0,
};

const CYAN: u32 = 0x06b6d4;
const PURPLE: u32 = 0x7c3aed;

// Tube geometry: segments, radius, radial segments
const TUBE_SEGMENTS: f64 = 60.0;
const TUBE_RADIAL: f64 = 12.0;
const CORE_RADIUS: f64 = 0.06;
const HALO_RADIUS: f64 = 0.09;

pub struct IntroScene {
    three: Three,
    viewport: Viewport,
    scene: Object3D,
    stars: Object3D,
    jet: Object3D,
    path: FlightPath,
    trail: TrailHistory,
    ribbon: Ribbon,
    resources: Resources,
}

impl IntroScene {
    pub fn build(three: &Three, config: &Config, seed: u32) -> EngineResult<Self> {
        let viewport = Viewport::new(three, Surface::Intro, LENS, config.max_pixel_ratio)?;
        let scene = three.scene()?;
        let mut resources = Resources::default();

        // Stars
        let mut rng = seed;
        let positions = starfield(config.intro.star_count, &mut rng);
        let star_geo = resources.keep(three.point_geometry(&positions)?);
        let star_mat = resources.keep(three.material(
            "PointsMaterial",
            &[
                ("color", JsValue::from(0x9fbfff)),
                ("size", JsValue::from(0.02)),
                ("transparent", true.into()),
                ("opacity", JsValue::from(0.7)),
            ],
        )?);
        let stars = three.points(&star_geo, &star_mat)?;
        scene.add(&stars);

        let jet = build_jet(three, &mut resources)?;
        scene.add(&jet);

        let ribbon = Ribbon::new(three, &mut resources)?;
        scene.add(&ribbon.group);

        scene.add(&three.ambient_light(0x446688, 0.6)?);

        Ok(Self {
            three: three.clone(),
            viewport,
            scene,
            stars,
            jet,
            path: FlightPath::default(),
            trail: TrailHistory::new(config.intro.trail_capacity),
            ribbon,
            resources,
        })
    }

    /// Pose the scene at `progress` in [0, 1] and draw it.
    pub fn render(&mut self, progress: f32, rebuild_trail: bool) -> EngineResult<()> {
        let pose = IntroPose::at(&self.path, progress);

        self.jet.position().copy_from(pose.position);
        self.jet.look_at(
            pose.look_at.x as f64,
            pose.look_at.y as f64,
            pose.look_at.z as f64,
        );
        self.jet.rotate_z(pose.roll as f64);

        self.stars.rotation().set_y(pose.stars_rotation_y as f64);
        self.stars.position().set_x(pose.stars_offset_x as f64);

        self.trail.push(pose.position);
        if rebuild_trail && self.trail.ready() {
            self.ribbon.rebuild(&self.three, &self.trail)?;
        }

        self.viewport.render(&self.scene);
        Ok(())
    }

    /// Release every geometry, material and the renderer.
    pub fn dispose(mut self) {
        self.trail.clear();
        self.ribbon.release();
        self.resources.release();
        self.viewport.dispose();
    }
}

fn build_jet(three: &Three, resources: &mut Resources) -> EngineResult<Object3D> {
    let jet = three.group()?;

    let fuselage = resources.keep(three.geometry("CylinderGeometry", &[0.08, 0.18, 1.6, 16.0])?);
    let nose = resources.keep(three.geometry("ConeGeometry", &[0.18, 0.5, 20.0])?);
    let tail = resources.keep(three.geometry("ConeGeometry", &[0.12, 0.4, 16.0])?);
    let wing = resources.keep(three.geometry("BoxGeometry", &[0.9, 0.04, 0.25])?);
    let fin = resources.keep(three.geometry("BoxGeometry", &[0.04, 0.4, 0.25])?);

    let cyan = resources.keep(phong(three, CYAN, 0x0b3a44, 160.0, 0x66e0ff)?);
    let purple = resources.keep(phong(three, PURPLE, 0x220b45, 180.0, 0xd0a6ff)?);

    let parts = [
        (&fuselage, &cyan, Vec3::ZERO, Vec3::new(0.0, 0.0, FRAC_PI_2)),
        (&nose, &purple, Vec3::new(0.85, 0.0, 0.0), Vec3::new(0.0, 0.0, -FRAC_PI_2)),
        (&tail, &purple, Vec3::new(-0.95, 0.0, 0.0), Vec3::new(0.0, 0.0, FRAC_PI_2)),
        (&wing, &cyan, Vec3::new(-0.1, -0.18, 0.0), Vec3::new(0.0, 0.15, 0.0)),
        (&wing, &cyan, Vec3::new(-0.1, 0.18, 0.0), Vec3::new(0.0, -0.15, 0.0)),
        (&fin, &purple, Vec3::new(-0.65, 0.0, 0.18), Vec3::ZERO),
    ];
    for (geometry, material, position, rotation) in parts {
        let mesh = three.mesh(geometry, material)?;
        mesh.position().copy_from(position);
        mesh.rotation().copy_from(rotation);
        jet.add(&mesh);
    }
    jet.scale().copy_from(Vec3::splat(0.9));

    let glow = three.point_light(PURPLE, 1.2, 8.0)?;
    glow.position().copy_from(Vec3::new(-0.6, 0.0, 0.0));
    jet.add(&glow);
    let glow = three.point_light(CYAN, 1.0, 7.0)?;
    glow.position().copy_from(Vec3::new(0.2, 0.0, 0.0));
    jet.add(&glow);

    Ok(jet)
}

fn phong(three: &Three, color: u32, emissive: u32, shininess: f64, specular: u32) -> EngineResult<Disposable> {
    three.material(
        "MeshPhongMaterial",
        &[
            ("color", color.into()),
            ("emissive", emissive.into()),
            ("shininess", shininess.into()),
            ("specular", specular.into()),
        ],
    )
}

/// Exhaust trail: two concentric additive tubes along recent positions.
struct Ribbon {
    group: Object3D,
    core: Disposable,
    halo: Disposable,
    meshes: Vec<Object3D>,
    geometries: Vec<Disposable>,
}

impl Ribbon {
    fn new(three: &Three, resources: &mut Resources) -> EngineResult<Self> {
        let additive = three.constant("AdditiveBlending")?;
        let core = resources.keep(three.material(
            "MeshBasicMaterial",
            &[
                ("color", JsValue::from(0x32e6ff)),
                ("transparent", true.into()),
                ("opacity", JsValue::from(0.45)),
                ("blending", additive.clone()),
            ],
        )?);
        let halo = resources.keep(three.material(
            "MeshBasicMaterial",
            &[
                ("color", JsValue::from(0xb388ff)),
                ("transparent", true.into()),
                ("opacity", JsValue::from(0.25)),
                ("blending", additive),
            ],
        )?);
        Ok(Self {
            group: three.group()?,
            core,
            halo,
            meshes: Vec::new(),
            geometries: Vec::new(),
        })
    }

    /// Swap in fresh tubes, then release the previous ones so the renderer
    /// never sees a disposed buffer.
    fn rebuild(&mut self, three: &Three, trail: &TrailHistory) -> EngineResult<()> {
        let points = trail
            .iter()
            .map(|p| three.vector3(*p))
            .collect::<EngineResult<js_sys::Array>>()?;
        let curve: JsValue = three.construct("CatmullRomCurve3", &[points.into()])?;

        let mut geometries = Vec::with_capacity(2);
        let mut meshes = Vec::with_capacity(2);
        for (radius, material) in [(CORE_RADIUS, &self.core), (HALO_RADIUS, &self.halo)] {
            let geometry: Disposable = three.construct(
                "TubeGeometry",
                &[
                    curve.clone(),
                    TUBE_SEGMENTS.into(),
                    radius.into(),
                    TUBE_RADIAL.into(),
                    false.into(),
                ],
            )?;
            meshes.push(three.mesh(&geometry, material)?);
            geometries.push(geometry);
        }

        for old in self.meshes.drain(..) {
            self.group.remove(&old);
        }
        for mesh in &meshes {
            self.group.add(mesh);
        }
        self.meshes = meshes;

        let stale = std::mem::replace(&mut self.geometries, geometries);
        for geometry in stale {
            geometry.dispose();
        }
        Ok(())
    }

    fn release(self) {
        for mesh in &self.meshes {
            self.group.remove(mesh);
        }
        for geometry in self.geometries {
            geometry.dispose();
        }
    }
}
