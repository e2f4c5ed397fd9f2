// config.rs - Tunable constants
//
// Every field has a default matching the shipped page. The JS host may pass
// a partial JSON object to override any of them.

use serde::Deserialize;

use crate::error::EngineResult;

pub const DEFAULT_BACKEND_URL: &str = "https://unpkg.com/three@0.160.0/build/three.module.js";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// ES module URL of the 3D backend.
    pub backend_url: String,
    /// Upper bound applied to `devicePixelRatio`.
    pub max_pixel_ratio: f64,
    pub intro: IntroConfig,
    pub background: BackgroundConfig,
    pub page: PageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            max_pixel_ratio: 2.0,
            intro: IntroConfig::default(),
            background: BackgroundConfig::default(),
            page: PageConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntroConfig {
    /// Nominal flight duration.
    pub flight_ms: f64,
    /// Hard upper bound on how long the overlay may block the page.
    pub safety_timeout_ms: u32,
    /// Delay between hiding the overlay and releasing its resources.
    pub cleanup_grace_ms: u32,
    pub trail_capacity: usize,
    pub star_count: usize,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            flight_ms: 3400.0,
            safety_timeout_ms: 4200,
            cleanup_grace_ms: 700,
            trail_capacity: 80,
            star_count: 1500,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Fraction of the remaining distance the group covers per frame.
    pub smoothing: f32,
    pub particle_count: usize,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.04,
            particle_count: 500,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub typewriter_text: String,
    pub typewriter_delay_ms: u32,
    pub typewriter_speed_ms: u32,
    pub to_top_threshold: f64,
    pub tilt_max_deg: f64,
    pub tilt_reset_ms: u32,
    pub submit_delay_ms: u32,
    pub drawer_breakpoint: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            typewriter_text:
                "I build scalable backend systems with .NET Core & modern web technologies."
                    .to_owned(),
            typewriter_delay_ms: 400,
            typewriter_speed_ms: 24,
            to_top_threshold: 300.0,
            tilt_max_deg: 10.0,
            tilt_reset_ms: 320,
            submit_delay_ms: 900,
            drawer_breakpoint: "(min-width: 641px)".to_owned(),
        }
    }
}

impl Config {
    /// Parse a possibly partial JSON override. `None` or blank input yields
    /// the defaults.
    pub fn from_json(json: Option<&str>) -> EngineResult<Self> {
        let Some(json) = json.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };
        Ok(serde_json::from_str(json)?)
    }
}
