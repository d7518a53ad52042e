use std::sync::{Condvar, Mutex};

use thiserror::Error;

use crate::classification::domain::inference_engine::InferenceEngine;
use crate::classification::domain::labels::LabelList;
use crate::detection::domain::face_detector::FaceDetector;

/// Lifecycle of the one-time pipeline initialization.
///
/// Transitions once: Uninitialized → Loading → Ready, or → Failed on the
/// first error. There is no retry; a Failed sequencer stays failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// The four ordered initialization steps, reported for status display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStep {
    FetchDetectorAsset,
    BindDetector,
    LoadModel,
    LoadLabels,
}

impl InitStep {
    pub fn describe(&self) -> &'static str {
        match self {
            InitStep::FetchDetectorAsset => "fetching detector asset",
            InitStep::BindDetector => "binding face detector",
            InitStep::LoadModel => "loading emotion model",
            InitStep::LoadLabels => "loading class labels",
        }
    }
}

/// Initialization failures, one variant per step so the user-visible status
/// can say which stage broke.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not fetch the detector asset")]
    AssetFetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Could not bind the face detector")]
    DetectorBind(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Could not load the emotion model")]
    ModelLoad(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Could not load the class labels")]
    LabelLoad(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A previous initialization attempt failed; the recorded cause follows.
    #[error("Initialization previously failed: {0}")]
    AlreadyFailed(String),
}

/// Everything the pipeline needs that is created once and never replaced.
pub struct PipelineContext {
    pub detector: Box<dyn FaceDetector>,
    pub engine: Box<dyn InferenceEngine>,
    pub labels: LabelList,
    /// Spatial input resolution of the loaded model.
    pub tensor_size: u32,
}

/// Supplies the four fallible construction steps. The sequencer owns their
/// ordering and failure bookkeeping; implementations own the I/O.
pub trait ContextBuilder: Send {
    /// Produce the raw bytes of the serialized detector cascade.
    fn fetch_detector_asset(
        &mut self,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;

    /// Construct a detector bound to the fetched asset.
    fn bind_detector(
        &mut self,
        asset: &[u8],
    ) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error + Send + Sync>>;

    /// Load the inference engine; also reports its input resolution.
    fn load_engine(
        &mut self,
    ) -> Result<(Box<dyn InferenceEngine>, u32), Box<dyn std::error::Error + Send + Sync>>;

    /// Load the class-label list.
    fn load_labels(&mut self) -> Result<LabelList, Box<dyn std::error::Error + Send + Sync>>;
}

struct InitState {
    readiness: Readiness,
    /// Human-readable cause, kept after Failed for late callers.
    failure: Option<String>,
    /// Present once Ready, until the loop takes it.
    context: Option<PipelineContext>,
}

/// Runs the one-time initialization exactly once, whatever the number of
/// callers.
///
/// The first caller performs the four steps; callers arriving while Loading
/// block until the outcome is known and adopt it. Re-invocation when Ready
/// is a no-op; re-invocation after a failure reports the original cause
/// without re-running anything.
pub struct InitSequencer {
    state: Mutex<InitState>,
    done: Condvar,
}

impl Default for InitSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl InitSequencer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InitState {
                readiness: Readiness::Uninitialized,
                failure: None,
                context: None,
            }),
            done: Condvar::new(),
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.state.lock().unwrap().readiness
    }

    /// Cause of the failure, once Failed.
    pub fn failure(&self) -> Option<String> {
        self.state.lock().unwrap().failure.clone()
    }

    /// Run (or wait for, or adopt the outcome of) initialization.
    ///
    /// `on_step` fires before each of the four steps, in order, only in the
    /// caller that actually performs the work.
    pub fn initialize(
        &self,
        builder: &mut dyn ContextBuilder,
        on_step: &mut dyn FnMut(InitStep),
    ) -> Result<(), InitError> {
        {
            let mut state = self.state.lock().unwrap();
            loop {
                match state.readiness {
                    Readiness::Ready => return Ok(()),
                    Readiness::Failed => {
                        let cause = state.failure.clone().unwrap_or_default();
                        return Err(InitError::AlreadyFailed(cause));
                    }
                    Readiness::Loading => {
                        state = self.done.wait(state).unwrap();
                    }
                    Readiness::Uninitialized => {
                        state.readiness = Readiness::Loading;
                        break;
                    }
                }
            }
        }

        // Lock released: the build steps may block on network and model I/O.
        let result = run_steps(builder, on_step);

        let mut state = self.state.lock().unwrap();
        match result {
            Ok(context) => {
                state.readiness = Readiness::Ready;
                state.context = Some(context);
                self.done.notify_all();
                Ok(())
            }
            Err(error) => {
                state.readiness = Readiness::Failed;
                state.failure = Some(error_chain(&error));
                self.done.notify_all();
                Err(error)
            }
        }
    }

    /// Hands the built context to the loop, exactly once.
    pub fn take_context(&self) -> Option<PipelineContext> {
        self.state.lock().unwrap().context.take()
    }
}

fn run_steps(
    builder: &mut dyn ContextBuilder,
    on_step: &mut dyn FnMut(InitStep),
) -> Result<PipelineContext, InitError> {
    on_step(InitStep::FetchDetectorAsset);
    let asset = builder
        .fetch_detector_asset()
        .map_err(InitError::AssetFetch)?;

    on_step(InitStep::BindDetector);
    let detector = builder
        .bind_detector(&asset)
        .map_err(InitError::DetectorBind)?;

    on_step(InitStep::LoadModel);
    let (engine, tensor_size) = builder.load_engine().map_err(InitError::ModelLoad)?;

    on_step(InitStep::LoadLabels);
    let labels = builder.load_labels().map_err(InitError::LabelLoad)?;

    Ok(PipelineContext {
        detector,
        engine,
        labels,
        tensor_size,
    })
}

/// Flattens an error and its sources into one line.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::shared::frame::GrayFrame;
    use crate::shared::region::Region;
    use ndarray::Array4;

    // --- Stubs ---

    struct StubDetector;

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _frame: &GrayFrame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
    }

    struct StubEngine;

    impl InferenceEngine for StubEngine {
        fn infer(&mut self, _input: Array4<f32>) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
            Ok(vec![1.0])
        }
    }

    /// Builder whose steps succeed unless told to fail at one of them.
    struct StubBuilder {
        fail_at: Option<InitStep>,
        calls: Vec<&'static str>,
        invocations: Option<Arc<AtomicUsize>>,
        delay: Option<Duration>,
    }

    impl StubBuilder {
        fn ok() -> Self {
            Self {
                fail_at: None,
                calls: Vec::new(),
                invocations: None,
                delay: None,
            }
        }

        fn failing_at(step: InitStep) -> Self {
            Self {
                fail_at: Some(step),
                ..Self::ok()
            }
        }

        fn fail_if(&self, step: InitStep) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail_at == Some(step) {
                return Err(format!("boom at {}", step.describe()).into());
            }
            Ok(())
        }
    }

    impl ContextBuilder for StubBuilder {
        fn fetch_detector_asset(
            &mut self,
        ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
            if let Some(counter) = &self.invocations {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.calls.push("fetch");
            self.fail_if(InitStep::FetchDetectorAsset)?;
            Ok(vec![1, 2, 3])
        }

        fn bind_detector(
            &mut self,
            asset: &[u8],
        ) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error + Send + Sync>> {
            assert_eq!(asset, &[1, 2, 3]);
            self.calls.push("bind");
            self.fail_if(InitStep::BindDetector)?;
            Ok(Box::new(StubDetector))
        }

        fn load_engine(
            &mut self,
        ) -> Result<(Box<dyn InferenceEngine>, u32), Box<dyn std::error::Error + Send + Sync>>
        {
            self.calls.push("engine");
            self.fail_if(InitStep::LoadModel)?;
            Ok((Box::new(StubEngine), 64))
        }

        fn load_labels(&mut self) -> Result<LabelList, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.push("labels");
            self.fail_if(InitStep::LoadLabels)?;
            Ok(LabelList::new(vec!["happy".into()]))
        }
    }

    // --- Tests ---

    #[test]
    fn test_success_reaches_ready_with_context() {
        let sequencer = InitSequencer::new();
        let mut builder = StubBuilder::ok();

        sequencer.initialize(&mut builder, &mut |_| {}).unwrap();

        assert_eq!(sequencer.readiness(), Readiness::Ready);
        let context = sequencer.take_context().unwrap();
        assert_eq!(context.tensor_size, 64);
        assert_eq!(context.labels.label_for(0), "happy");
    }

    #[test]
    fn test_steps_run_in_order() {
        let sequencer = InitSequencer::new();
        let mut builder = StubBuilder::ok();
        let mut reported = Vec::new();

        sequencer
            .initialize(&mut builder, &mut |step| reported.push(step))
            .unwrap();

        assert_eq!(builder.calls, vec!["fetch", "bind", "engine", "labels"]);
        assert_eq!(
            reported,
            vec![
                InitStep::FetchDetectorAsset,
                InitStep::BindDetector,
                InitStep::LoadModel,
                InitStep::LoadLabels,
            ]
        );
    }

    #[test]
    fn test_take_context_hands_over_once() {
        let sequencer = InitSequencer::new();
        sequencer
            .initialize(&mut StubBuilder::ok(), &mut |_| {})
            .unwrap();

        assert!(sequencer.take_context().is_some());
        assert!(sequencer.take_context().is_none());
        // Still Ready: the handover does not reset the lifecycle.
        assert_eq!(sequencer.readiness(), Readiness::Ready);
    }

    #[test]
    fn test_reinvocation_when_ready_is_noop() {
        let sequencer = InitSequencer::new();
        sequencer
            .initialize(&mut StubBuilder::ok(), &mut |_| {})
            .unwrap();

        let mut second = StubBuilder::ok();
        sequencer.initialize(&mut second, &mut |_| {}).unwrap();

        assert!(second.calls.is_empty());
        assert_eq!(sequencer.readiness(), Readiness::Ready);
    }

    #[test]
    fn test_halts_at_first_failing_step() {
        let sequencer = InitSequencer::new();
        let mut builder = StubBuilder::failing_at(InitStep::BindDetector);

        let error = sequencer.initialize(&mut builder, &mut |_| {}).unwrap_err();

        assert!(matches!(error, InitError::DetectorBind(_)));
        assert_eq!(builder.calls, vec!["fetch", "bind"]);
        assert_eq!(sequencer.readiness(), Readiness::Failed);
        assert!(sequencer.take_context().is_none());
    }

    #[test]
    fn test_failure_records_distinguishing_cause() {
        for (step, phrase) in [
            (InitStep::FetchDetectorAsset, "detector asset"),
            (InitStep::BindDetector, "face detector"),
            (InitStep::LoadModel, "emotion model"),
            (InitStep::LoadLabels, "class labels"),
        ] {
            let sequencer = InitSequencer::new();
            let mut builder = StubBuilder::failing_at(step);
            sequencer.initialize(&mut builder, &mut |_| {}).unwrap_err();

            let cause = sequencer.failure().unwrap();
            assert!(cause.contains(phrase), "cause {cause:?} for {step:?}");
            assert!(cause.contains("boom"), "cause {cause:?} keeps the source");
        }
    }

    #[test]
    fn test_reinvocation_after_failure_reports_original_cause() {
        let sequencer = InitSequencer::new();
        sequencer
            .initialize(
                &mut StubBuilder::failing_at(InitStep::LoadModel),
                &mut |_| {},
            )
            .unwrap_err();

        let mut second = StubBuilder::ok();
        let error = sequencer.initialize(&mut second, &mut |_| {}).unwrap_err();

        assert!(second.calls.is_empty());
        match error {
            InitError::AlreadyFailed(cause) => assert!(cause.contains("emotion model")),
            other => panic!("expected AlreadyFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_callers_build_once() {
        let sequencer = Arc::new(InitSequencer::new());
        let invocations = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let sequencer = Arc::clone(&sequencer);
                let invocations = Arc::clone(&invocations);
                scope.spawn(move || {
                    let mut builder = StubBuilder {
                        invocations: Some(invocations),
                        delay: Some(Duration::from_millis(20)),
                        ..StubBuilder::ok()
                    };
                    sequencer.initialize(&mut builder, &mut |_| {}).unwrap();
                });
            }
        });

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        assert_eq!(sequencer.readiness(), Readiness::Ready);
    }

    #[test]
    fn test_waiting_callers_adopt_failure() {
        let sequencer = Arc::new(InitSequencer::new());

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..3)
                .map(|_| {
                    let sequencer = Arc::clone(&sequencer);
                    scope.spawn(move || {
                        let mut builder = StubBuilder {
                            delay: Some(Duration::from_millis(20)),
                            ..StubBuilder::failing_at(InitStep::FetchDetectorAsset)
                        };
                        sequencer.initialize(&mut builder, &mut |_| {})
                    })
                })
                .collect();

            for handle in handles {
                assert!(handle.join().unwrap().is_err());
            }
        });

        assert_eq!(sequencer.readiness(), Readiness::Failed);
    }

    #[test]
    fn test_error_chain_flattens_sources() {
        let error = InitError::ModelLoad("file truncated".into());
        let chain = error_chain(&error);
        assert_eq!(chain, "Could not load the emotion model: file truncated");
    }

    #[test]
    fn test_step_descriptions_are_human_readable() {
        assert_eq!(
            InitStep::FetchDetectorAsset.describe(),
            "fetching detector asset"
        );
        assert_eq!(InitStep::LoadLabels.describe(), "loading class labels");
    }
}
