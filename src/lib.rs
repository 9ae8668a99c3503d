#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Injection-session planning core: places template-relative injection points on a
//! patient photo and on a canonical 3D face, and checks them against zone and
//! dosage limits.

pub mod config;
pub mod geom;
pub mod mapping;
pub mod model;
pub mod plan;
pub mod safety;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use config::{ConfigResult, PlannerConfig};
use geom::{Point3, Rect};
use mapping::{ManualPlacement, PhotoMapper, PhotoPlacement, SurfaceMapper, SurfacePlacement};
use model::{Detection, DetectionSlot, InjectionPoint, PhotoToken, ZoneClassifier};
use plan::TreatmentPlan;
use safety::{DosageSafetyEngine, PointValidation, SafetyCheck, ZoneValidator};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start rayon thread pool: {err}")))
}

/// Public entry point for the planning UI.
///
/// Holds the engines built from one [`PlannerConfig`], the detection state of the
/// current photo and the session's [`TreatmentPlan`].
#[wasm_bindgen]
pub struct Planner {
    config: PlannerConfig,
    classifier: ZoneClassifier,
    surface: SurfaceMapper,
    validator: ZoneValidator,
    dosage: DosageSafetyEngine,
    detection: DetectionSlot,
    plan: TreatmentPlan,
}

impl Default for Planner {
    fn default() -> Self {
        Self::build(PlannerConfig::default())
    }
}

#[wasm_bindgen]
impl Planner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Planner {
        Planner::default()
    }

    /// Planner with (partial) configuration overrides from JS.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<Planner, JsValue> {
        let config = PlannerConfig::from_deserializer(serde_wasm_bindgen::Deserializer::from(config))
            .map_err(to_js_error)?;
        Ok(Planner::build(config))
    }

    /// Start a new photo. The returned token must accompany its detection result.
    #[wasm_bindgen]
    pub fn begin_photo(&mut self) -> u32 {
        self.detection.begin_photo().0
    }

    /// Apply a detector result (`null` when no face was found). Returns `false`
    /// when the result belongs to a replaced photo.
    #[wasm_bindgen]
    pub fn apply_detection(&mut self, token: u32, detection: JsValue) -> Result<bool, JsValue> {
        let detection: Option<Detection> = if detection.is_null() || detection.is_undefined() {
            None
        } else {
            Some(from_js(detection)?)
        };
        Ok(self.detection.resolve(PhotoToken(token), detection))
    }

    #[wasm_bindgen]
    pub fn clear_detection(&mut self) {
        self.detection.clear();
    }

    /// Pixel placements of `points` inside the displayed image rectangle.
    #[wasm_bindgen]
    pub fn map_points_2d(&self, points: JsValue, display: JsValue) -> Result<JsValue, JsValue> {
        let points: Vec<InjectionPoint> = from_js(points)?;
        let display: Rect = from_js(display)?;
        if !display.is_finite() {
            return Err(js_error("display rectangle must be finite"));
        }
        to_js(&self.photo_placements(&points, display))
    }

    #[wasm_bindgen]
    pub fn map_points_3d(&self, points: JsValue) -> Result<JsValue, JsValue> {
        let points: Vec<InjectionPoint> = from_js(points)?;
        to_js(&self.surface_placements(&points))
    }

    /// Template coordinates and muscle for a click on the 3D surface.
    #[wasm_bindgen]
    pub fn place_from_surface(&self, x: f64, y: f64, z: f64) -> Result<JsValue, JsValue> {
        to_js(&self.manual_placement(Point3::new(x, y, z)))
    }

    #[wasm_bindgen]
    pub fn validate_points(&self, points: JsValue) -> Result<JsValue, JsValue> {
        let points: Vec<InjectionPoint> = from_js(points)?;
        to_js(&self.validations(&points))
    }

    #[wasm_bindgen]
    pub fn safety_checks(&self, points: JsValue) -> Result<JsValue, JsValue> {
        let points: Vec<InjectionPoint> = from_js(points)?;
        to_js(&self.evaluate_safety(&points))
    }

    /// Points of the current plan.
    #[wasm_bindgen]
    pub fn plan_points(&self) -> Result<JsValue, JsValue> {
        to_js(&self.plan.points())
    }

    #[wasm_bindgen]
    pub fn load_plan(&mut self, points: JsValue) -> Result<(), JsValue> {
        let points: Vec<InjectionPoint> = from_js(points)?;
        self.plan.load(points).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn add_point(&mut self, point: JsValue) -> Result<(), JsValue> {
        let point: InjectionPoint = from_js(point)?;
        self.plan.add(point).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn remove_point(&mut self, id: &str) -> Result<(), JsValue> {
        self.plan.remove(id).map(drop).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_dosage(&mut self, id: &str, dosage: u32) -> Result<(), JsValue> {
        self.plan.set_dosage(id, dosage).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn move_point(&mut self, id: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.plan.move_point(id, x, y).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn undo(&mut self) -> Result<(), JsValue> {
        self.plan.undo().map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn redo(&mut self) -> Result<(), JsValue> {
        self.plan.redo().map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn reset_plan(&mut self) {
        self.plan.reset();
    }
}

impl Planner {
    /// Validates `config` and builds every engine from it.
    pub fn from_config(config: PlannerConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PlannerConfig) -> Self {
        let classifier = config.classifier();
        log::debug!(
            "planner configured: {} dosage limits, {} zone boundaries, {} surface bands",
            config.dosage.muscles.len(),
            config.zones.iter().count(),
            config.surface.bands.len()
        );
        Self {
            surface: SurfaceMapper::new(config.surface.clone(), classifier.clone()),
            validator: ZoneValidator::new(config.zones.clone(), classifier.clone()),
            dosage: DosageSafetyEngine::new(config.dosage.clone(), classifier.clone()),
            classifier,
            config,
            detection: DetectionSlot::new(),
            plan: TreatmentPlan::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    #[must_use]
    pub fn classifier(&self) -> &ZoneClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn detection(&self) -> &DetectionSlot {
        &self.detection
    }

    pub fn detection_mut(&mut self) -> &mut DetectionSlot {
        &mut self.detection
    }

    #[must_use]
    pub fn plan(&self) -> &TreatmentPlan {
        &self.plan
    }

    pub fn plan_mut(&mut self) -> &mut TreatmentPlan {
        &mut self.plan
    }

    /// Photo mapper for the current detection state.
    #[must_use]
    pub fn photo_mapper(&self) -> PhotoMapper {
        PhotoMapper::from_detection(self.detection.current())
    }

    #[must_use]
    pub fn photo_placements(&self, points: &[InjectionPoint], display: Rect) -> Vec<PhotoPlacement> {
        let mapper = self.photo_mapper();
        map_batch(points, |point| mapper.place(point, display))
    }

    #[must_use]
    pub fn surface_placements(&self, points: &[InjectionPoint]) -> Vec<SurfacePlacement> {
        map_batch(points, |point| self.surface.place(point))
    }

    #[must_use]
    pub fn manual_placement(&self, position: Point3) -> ManualPlacement {
        self.surface.inverse(position)
    }

    #[must_use]
    pub fn validations(&self, points: &[InjectionPoint]) -> Vec<PointValidation> {
        self.validator.validate_all(points)
    }

    #[must_use]
    pub fn evaluate_safety(&self, points: &[InjectionPoint]) -> Vec<SafetyCheck> {
        self.dosage.evaluate_points(points)
    }
}

fn map_batch<T, F>(points: &[InjectionPoint], map: F) -> Vec<T>
where
    T: Send,
    F: Fn(&InjectionPoint) -> T + Sync + Send,
{
    cfg_if::cfg_if! {
        if #[cfg(feature = "parallel")] {
            use rayon::prelude::*;
            points.par_iter().map(map).collect()
        } else {
            points.iter().map(map).collect()
        }
    }
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
