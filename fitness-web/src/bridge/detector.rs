//! `ExerciseDetector` - the JS-facing detector
//!
//! Configuration, callbacks and the control surface live here, plus the
//! detection loop: one `requestAnimationFrame` tick awaits one call to the
//! pose source, processes the frame, then schedules the next tick. A stop
//! flag is checked at the top of each tick and before rescheduling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Float32Array, Function, Promise};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::config::DetectorConfig;
use crate::detection::{
    DetectionEvent, DetectionObserver, DetectionResult, Detector, Dispatcher, ExerciseKind,
};
use crate::error::DetectionError;
use crate::form::FormRules;
use crate::pose::{Landmark, LandmarkFrame};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Settings survive until an exercise is chosen
#[derive(Default)]
struct DetectorCore {
    detector: Option<Detector>,
    rules: FormRules,
    config: DetectorConfig,
}

impl DetectorCore {
    fn select(&mut self, kind: ExerciseKind) {
        match self.detector.as_mut() {
            Some(detector) => {
                detector.set_exercise(kind);
            }
            None => {
                log::info!("exercise: {}", kind.name());
                self.detector = Some(Detector::with_settings(
                    kind,
                    self.rules.clone(),
                    self.config.clone(),
                ));
            }
        }
    }

    fn set_rules(&mut self, rules: FormRules) {
        if let Some(detector) = self.detector.as_mut() {
            detector.set_rules(rules.clone());
        }
        self.rules = rules;
    }

    fn set_config(&mut self, config: DetectorConfig) {
        if let Some(detector) = self.detector.as_mut() {
            detector.set_config(config.clone());
        }
        self.config = config;
    }
}

/// One optional JS function per output
#[derive(Default)]
struct JsCallbacks {
    rep_detected: Option<Function>,
    form_error: Option<Function>,
    detection_update: Option<Function>,
}

/// Forwards detection events to the JS callbacks
struct JsCallbackObserver {
    callbacks: Rc<RefCell<JsCallbacks>>,
}

impl DetectionObserver for JsCallbackObserver {
    fn on_rep_detected(&self, rep_count: u32) {
        // Clone out so a callback may replace itself
        let callback = self.callbacks.borrow().rep_detected.clone();
        if let Some(callback) = callback {
            invoke(&callback, &JsValue::from(rep_count));
        }
    }

    fn on_form_error(&self, errors: &[String]) {
        let callback = self.callbacks.borrow().form_error.clone();
        if let Some(callback) = callback {
            match to_js(&errors) {
                Ok(value) => invoke(&callback, &value),
                Err(err) => log::warn!("form errors not delivered: {:?}", err),
            }
        }
    }

    fn on_detection_update(&self, result: &DetectionResult) {
        let callback = self.callbacks.borrow().detection_update.clone();
        if let Some(callback) = callback {
            match to_js(result) {
                Ok(value) => invoke(&callback, &value),
                Err(err) => log::warn!("detection result not delivered: {:?}", err),
            }
        }
    }
}

fn invoke(callback: &Function, arg: &JsValue) {
    if let Err(err) = callback.call1(&JsValue::NULL, arg) {
        log::warn!("callback threw: {}", describe(&err));
    }
}

/// Detection loop flags; `detecting` guards against a second loop
#[derive(Default)]
struct DetectionLoop {
    detecting: Cell<bool>,
    stop_requested: Cell<bool>,
    pose_source: RefCell<Option<Function>>,
}

impl DetectionLoop {
    fn finish(&self) {
        self.detecting.set(false);
        self.stop_requested.set(false);
        log::info!("detection stopped");
    }
}

// ============================================================================
// JS CLASS
// ============================================================================

#[wasm_bindgen]
pub struct ExerciseDetector {
    core: Rc<RefCell<DetectorCore>>,
    callbacks: Rc<RefCell<JsCallbacks>>,
    dispatcher: Rc<Dispatcher>,
    detection: Rc<DetectionLoop>,
}

#[wasm_bindgen]
impl ExerciseDetector {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ExerciseDetector {
        let callbacks = Rc::new(RefCell::new(JsCallbacks::default()));
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(Box::new(JsCallbackObserver {
            callbacks: callbacks.clone(),
        }));
        ExerciseDetector {
            core: Rc::new(RefCell::new(DetectorCore::default())),
            callbacks,
            dispatcher: Rc::new(dispatcher),
            detection: Rc::new(DetectionLoop::default()),
        }
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Select the exercise by name. A different exercise resets rep and hold state.
    #[wasm_bindgen(js_name = setExercise)]
    pub fn set_exercise(&self, name: &str) -> Result<(), JsValue> {
        let kind = ExerciseKind::from_name(name)?;
        self.core.borrow_mut().select(kind);
        Ok(())
    }

    /// Canonical name of the selected exercise
    pub fn exercise(&self) -> Option<String> {
        self.core
            .borrow()
            .detector
            .as_ref()
            .map(|detector| detector.kind().name().to_string())
    }

    #[wasm_bindgen(js_name = isStaticHold)]
    pub fn is_static_hold(&self) -> bool {
        self.core
            .borrow()
            .detector
            .as_ref()
            .is_some_and(|detector| detector.kind().is_static_hold())
    }

    /// Replace the form rules with a `{metric: {min, max, threshold}}` object;
    /// `null` clears them
    #[wasm_bindgen(js_name = setFormRules)]
    pub fn set_form_rules(&self, rules: JsValue) -> Result<(), JsValue> {
        let rules = if rules.is_null() || rules.is_undefined() {
            FormRules::new()
        } else {
            serde_wasm_bindgen::from_value(rules).map_err(DetectionError::from)?
        };
        self.core.borrow_mut().set_rules(rules);
        Ok(())
    }

    #[wasm_bindgen(js_name = setFormRulesJson)]
    pub fn set_form_rules_json(&self, json: &str) -> Result<(), JsValue> {
        let rules = FormRules::from_json(json)?;
        self.core.borrow_mut().set_rules(rules);
        Ok(())
    }

    #[wasm_bindgen(js_name = clearFormRules)]
    pub fn clear_form_rules(&self) {
        self.core.borrow_mut().set_rules(FormRules::new());
    }

    #[wasm_bindgen(js_name = formRules)]
    pub fn form_rules(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().rules)
    }

    /// `{holdGraceFrames, requireAlternatingLegs}`; missing keys take defaults
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, config: JsValue) -> Result<(), JsValue> {
        let config = if config.is_null() || config.is_undefined() {
            DetectorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(DetectionError::from)?
        };
        self.core.borrow_mut().set_config(config);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------------

    /// `callback(repCount)` once per counted rep; `null` unsubscribes
    #[wasm_bindgen(js_name = onRepDetected)]
    pub fn on_rep_detected(&self, callback: Option<Function>) {
        self.callbacks.borrow_mut().rep_detected = callback;
    }

    /// `callback(errors: string[])` for every frame with form problems
    #[wasm_bindgen(js_name = onFormError)]
    pub fn on_form_error(&self, callback: Option<Function>) {
        self.callbacks.borrow_mut().form_error = callback;
    }

    /// `callback(result)` once per processed frame
    #[wasm_bindgen(js_name = onDetectionUpdate)]
    pub fn on_detection_update(&self, callback: Option<Function>) {
        self.callbacks.borrow_mut().detection_update = callback;
    }

    // ------------------------------------------------------------------------
    // Control surface
    // ------------------------------------------------------------------------

    /// Start the detection loop. `poseSource()` is called once per animation
    /// frame and returns landmarks (or a promise of them), or null for no pose.
    pub fn start(&self, pose_source: Function) -> Result<(), JsValue> {
        if self.core.borrow().detector.is_none() {
            return Err(DetectionError::NotInitialized("call setExercise before start").into());
        }
        *self.detection.pose_source.borrow_mut() = Some(pose_source);

        if self.detection.detecting.get() {
            // Still running, possibly with a stop pending: keep the one loop
            self.detection.stop_requested.set(false);
            return Ok(());
        }

        self.detection.detecting.set(true);
        self.detection.stop_requested.set(false);
        log::info!("detection started");
        schedule(self.tick());
        Ok(())
    }

    /// Request the loop to stop; no-op when not running
    pub fn stop(&self) {
        if self.detection.detecting.get() {
            self.detection.stop_requested.set(true);
        }
    }

    #[wasm_bindgen(js_name = isDetecting)]
    pub fn is_detecting(&self) -> bool {
        self.detection.detecting.get() && !self.detection.stop_requested.get()
    }

    #[wasm_bindgen(js_name = resetRepCount)]
    pub fn reset_rep_count(&self) {
        if let Some(detector) = self.core.borrow_mut().detector.as_mut() {
            detector.reset_rep_count();
        }
    }

    #[wasm_bindgen(js_name = resetHoldTimer)]
    pub fn reset_hold_timer(&self) {
        if let Some(detector) = self.core.borrow_mut().detector.as_mut() {
            detector.reset_hold_timer();
        }
    }

    // ------------------------------------------------------------------------
    // Direct processing and state
    // ------------------------------------------------------------------------

    /// Process one frame outside the loop. Returns the detection result,
    /// or null when `landmarks` holds no pose.
    #[wasm_bindgen(js_name = processFrame)]
    pub fn process_frame(
        &self,
        landmarks: JsValue,
        timestamp_ms: Option<f64>,
    ) -> Result<JsValue, JsValue> {
        if self.core.borrow().detector.is_none() {
            return Err(DetectionError::NotInitialized("call setExercise before processFrame").into());
        }
        let Some(frame) = frame_from_js(&landmarks)? else {
            return Ok(JsValue::NULL);
        };
        match self.tick().process(&frame, timestamp_ms.unwrap_or_else(now_ms)) {
            Some(result) => to_js(&result),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = repCount)]
    pub fn rep_count(&self) -> u32 {
        self.core
            .borrow()
            .detector
            .as_ref()
            .map_or(0, |detector| detector.rep_state().rep_count)
    }

    /// Seconds the current hold has lasted
    #[wasm_bindgen(js_name = holdDuration)]
    pub fn hold_duration(&self) -> f64 {
        self.core
            .borrow()
            .detector
            .as_ref()
            .map_or(0.0, |detector| detector.hold_state().duration)
    }

    #[wasm_bindgen(js_name = repState)]
    pub fn rep_state(&self) -> Result<JsValue, JsValue> {
        let state = self.core.borrow().detector.as_ref().map(Detector::rep_state);
        to_js(&state.unwrap_or_default())
    }

    #[wasm_bindgen(js_name = holdState)]
    pub fn hold_state(&self) -> Result<JsValue, JsValue> {
        let state = self
            .core
            .borrow()
            .detector
            .as_ref()
            .map(|detector| detector.hold_state().clone());
        to_js(&state.unwrap_or_default())
    }
}

impl ExerciseDetector {
    fn tick(&self) -> Tick {
        Tick {
            core: self.core.clone(),
            dispatcher: self.dispatcher.clone(),
            detection: self.detection.clone(),
        }
    }
}

impl Default for ExerciseDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DETECTION LOOP
// ============================================================================

/// Everything one loop iteration needs
#[derive(Clone)]
struct Tick {
    core: Rc<RefCell<DetectorCore>>,
    dispatcher: Rc<Dispatcher>,
    detection: Rc<DetectionLoop>,
}

impl Tick {
    fn run(self) {
        if self.detection.stop_requested.get() {
            self.detection.finish();
            return;
        }
        spawn_local(async move {
            if let Some(frame) = self.next_frame().await {
                self.process(&frame, now_ms());
            }
            if self.detection.stop_requested.get() {
                self.detection.finish();
            } else {
                schedule(self);
            }
        });
    }

    /// Ask the pose source for a frame; any failure counts as no frame
    async fn next_frame(&self) -> Option<LandmarkFrame> {
        let source = self.detection.pose_source.borrow().clone()?;
        let value = match source.call0(&JsValue::NULL) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{}", DetectionError::Inference(describe(&err)));
                return None;
            }
        };
        let value = match value.dyn_into::<Promise>() {
            Ok(promise) => match JsFuture::from(promise).await {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("{}", DetectionError::Inference(describe(&err)));
                    return None;
                }
            },
            Err(value) => value,
        };
        match frame_from_js(&value) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }

    /// Run the detector, release it, then notify observers
    fn process(&self, frame: &LandmarkFrame, now_ms: f64) -> Option<DetectionResult> {
        let events = {
            let mut core = self.core.borrow_mut();
            core.detector.as_mut()?.process(frame, now_ms)
        };
        self.dispatcher.publish(&events);
        events.into_iter().find_map(|event| match event {
            DetectionEvent::Update(result) => Some(*result),
            _ => None,
        })
    }
}

fn schedule(tick: Tick) {
    let Some(window) = web_sys::window() else {
        log::warn!("no window: detection loop cannot run");
        tick.detection.finish();
        return;
    };
    let detection = tick.detection.clone();
    let callback = Closure::once_into_js(move || tick.run());
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        log::warn!("requestAnimationFrame failed: {}", describe(&err));
        detection.finish();
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Landmark payloads accepted from JS besides `Float32Array`
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkPayload {
    Flat(Vec<f32>),
    Points(Vec<Option<Landmark>>),
}

/// `null`, `undefined` or an empty array mean no pose this frame
fn frame_from_js(value: &JsValue) -> Result<Option<LandmarkFrame>, DetectionError> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    if let Some(array) = value.dyn_ref::<Float32Array>() {
        let data = array.to_vec();
        return if data.is_empty() {
            Ok(None)
        } else {
            LandmarkFrame::from_flat(&data).map(Some)
        };
    }

    let payload: LandmarkPayload = serde_wasm_bindgen::from_value(value.clone())
        .map_err(|err| DetectionError::MalformedFrame(err.to_string()))?;
    match payload {
        LandmarkPayload::Flat(data) if data.is_empty() => Ok(None),
        LandmarkPayload::Flat(data) => LandmarkFrame::from_flat(&data).map(Some),
        LandmarkPayload::Points(points) if points.is_empty() => Ok(None),
        LandmarkPayload::Points(points) => LandmarkFrame::from_landmarks(points).map(Some),
    }
}

/// Plain JS objects and arrays, `null` for `None`
pub(super) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn describe(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Milliseconds on the `performance.now()` clock
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}
