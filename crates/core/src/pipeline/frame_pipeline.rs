use std::sync::Arc;
use std::time::Instant;

use crate::classification::domain::inference_engine::InferenceEngine;
use crate::classification::domain::interpreter::{Classification, ScoreInterpreter};
use crate::classification::domain::preprocessor::TensorPreprocessor;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_selector::select_primary;
use crate::pipeline::init_sequencer::{InitSequencer, PipelineContext, Readiness};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::reading::SharedReading;
use crate::pipeline::scheduler::CycleScheduler;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::video::domain::frame_sink::FrameSink;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::overlay::{Overlay, BLACK, LIME, WHITE};

const BOX_THICKNESS: u32 = 2;
const LABEL_BAND_WIDTH: u32 = 220;
const LABEL_BAND_HEIGHT: u32 = 28;
const LABEL_BAND_ALPHA: f32 = 0.6;
const LABEL_TEXT_SIZE: f32 = 16.0;
const LABEL_TEXT_INSET: i32 = 6;

/// What one call to [`FramePipeline::run_cycle`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Initialization has not produced a context yet; nothing was consumed.
    Gated,
    /// The frame source is exhausted.
    SourceEnded,
    /// A frame went through but no face was selected.
    NoFace,
    /// A face was classified and the reading published.
    Classified(Classification),
    /// The cycle hit a transient error and its work was dropped.
    Faulted(String),
}

/// The working set built from a [`PipelineContext`] once initialization
/// completes.
struct ActiveContext {
    detector: Box<dyn FaceDetector>,
    engine: Box<dyn InferenceEngine>,
    preprocessor: TensorPreprocessor,
    interpreter: ScoreInterpreter,
}

impl From<PipelineContext> for ActiveContext {
    fn from(context: PipelineContext) -> Self {
        Self {
            detector: context.detector,
            engine: context.engine,
            preprocessor: TensorPreprocessor::new(context.tensor_size),
            interpreter: ScoreInterpreter::new(context.labels),
        }
    }
}

/// The per-frame loop: acquire, detect, annotate, classify, present.
///
/// Cycles never run before initialization has delivered its context; until
/// then every cycle gates out without touching the source. Per-cycle errors
/// are absorbed so one bad frame never ends the run, and the latest
/// classification survives cycles that produce none.
pub struct FramePipeline {
    source: Box<dyn FrameSource>,
    sink: Box<dyn FrameSink>,
    overlay: Box<dyn Overlay>,
    logger: Box<dyn PipelineLogger>,
    sequencer: Arc<InitSequencer>,
    reading: SharedReading,
    context: Option<ActiveContext>,
}

impl FramePipeline {
    pub fn new(
        source: Box<dyn FrameSource>,
        sink: Box<dyn FrameSink>,
        overlay: Box<dyn Overlay>,
        logger: Box<dyn PipelineLogger>,
        sequencer: Arc<InitSequencer>,
        reading: SharedReading,
    ) -> Self {
        Self {
            source,
            sink,
            overlay,
            logger,
            sequencer,
            reading,
            context: None,
        }
    }

    /// Execute one cycle.
    ///
    /// The first cycle after initialization completes adopts the built
    /// context; earlier cycles return [`CycleOutcome::Gated`] without
    /// consuming a frame.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        if self.context.is_none() {
            match self.sequencer.take_context() {
                Some(built) => {
                    self.context = Some(ActiveContext::from(built));
                    self.logger.info("Pipeline ready");
                }
                None => return CycleOutcome::Gated,
            }
        }

        let acquire_started = Instant::now();
        let mut frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return CycleOutcome::SourceEnded,
            Err(error) => {
                let cause = format!("Frame acquisition failed: {error}");
                log::warn!("{cause}");
                return CycleOutcome::Faulted(cause);
            }
        };
        self.logger.timing("acquire", ms_since(acquire_started));

        let result = match self.context.as_mut() {
            Some(context) => process_frame(
                context,
                self.overlay.as_ref(),
                &self.reading,
                self.logger.as_mut(),
                &mut frame,
            ),
            None => return CycleOutcome::Gated,
        };

        // The frame goes out annotated as far as processing got, even when a
        // stage failed mid-cycle.
        let present_started = Instant::now();
        if let Err(error) = self.sink.present(&frame) {
            log::warn!("Frame presentation failed: {error}");
        }
        self.logger.timing("present", ms_since(present_started));
        self.logger.cycle(frame.index());

        match result {
            Ok(Some(classification)) => CycleOutcome::Classified(classification),
            Ok(None) => CycleOutcome::NoFace,
            Err(cause) => {
                log::warn!("{cause}");
                CycleOutcome::Faulted(cause)
            }
        }
    }

    /// Run cycles under the given scheduler until the source ends or
    /// initialization fails.
    ///
    /// Transient per-cycle faults keep the loop going. A failed
    /// initialization is the one fatal condition and is returned as the
    /// error, with the recorded cause.
    pub fn run(
        &mut self,
        scheduler: &mut dyn CycleScheduler,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut init_failure: Option<String> = None;
        scheduler.run(&mut || match self.run_cycle() {
            CycleOutcome::Gated => {
                if self.sequencer.readiness() == Readiness::Failed {
                    init_failure = Some(self.sequencer.failure().unwrap_or_default());
                    false
                } else {
                    true
                }
            }
            CycleOutcome::SourceEnded => false,
            _ => true,
        });
        self.logger.summary();
        match init_failure {
            Some(cause) => Err(cause.into()),
            None => Ok(()),
        }
    }

    /// Handle observers use to read the latest classification.
    pub fn reading(&self) -> SharedReading {
        self.reading.clone()
    }
}

/// Detect, annotate, and classify one acquired frame.
///
/// Candidate boxes are drawn before the face crop is taken, so the crop
/// carries the box pixels along its border. The classifier sees the frame
/// as the viewer does.
fn process_frame(
    context: &mut ActiveContext,
    overlay: &dyn Overlay,
    reading: &SharedReading,
    logger: &mut dyn PipelineLogger,
    frame: &mut Frame,
) -> Result<Option<Classification>, String> {
    let detect_started = Instant::now();
    let gray = frame.to_luma();
    let candidates = context
        .detector
        .detect(&gray)
        .map_err(|error| format!("Detection failed: {error}"))?;
    logger.timing("detect", ms_since(detect_started));

    for candidate in &candidates {
        overlay.draw_rect(frame, candidate, LIME, BOX_THICKNESS);
    }

    let selected = match select_primary(&candidates) {
        Some(region) => region.clone(),
        None => return Ok(None),
    };

    let crop = crop_region(frame, &selected);

    let preprocess_started = Instant::now();
    let tensor = context
        .preprocessor
        .prepare(&crop)
        .map_err(|error| format!("Preprocess failed: {error}"))?;
    logger.timing("preprocess", ms_since(preprocess_started));

    let infer_started = Instant::now();
    let scores = context
        .engine
        .infer(tensor)
        .map_err(|error| format!("Inference failed: {error}"))?;
    logger.timing("infer", ms_since(infer_started));

    let result = context
        .interpreter
        .interpret(&scores)
        .map_err(|error| format!("Interpretation failed: {error}"))?;

    reading.publish(result.clone());
    logger.reading(&result);

    let (band_x, band_y) = label_layout(&selected);
    overlay.fill_rect(
        frame,
        band_x,
        band_y,
        LABEL_BAND_WIDTH,
        LABEL_BAND_HEIGHT,
        BLACK,
        LABEL_BAND_ALPHA,
    );
    overlay.draw_text(
        frame,
        &format_label(&result),
        band_x + LABEL_TEXT_INSET,
        band_y + LABEL_TEXT_INSET,
        LABEL_TEXT_SIZE,
        WHITE,
    );

    Ok(Some(result))
}

/// Top-left corner of the label band: above the face box, clamped to the
/// frame top when the box sits too high.
fn label_layout(region: &Region) -> (i32, i32) {
    let x = region.x as i32;
    let y = (region.y as i32 - LABEL_BAND_HEIGHT as i32).max(0);
    (x, y)
}

fn format_label(result: &Classification) -> String {
    format!("{} {:.1}%", result.label, result.confidence * 100.0)
}

/// Copy the region out of the frame into its own buffer, keeping the source
/// frame index. The rectangle is clipped to the frame, so a region hanging
/// off the edge yields its visible part.
fn crop_region(frame: &Frame, region: &Region) -> Frame {
    let image = frame.as_image();
    let cropped = image::imageops::crop_imm(
        &image,
        region.x,
        region.y,
        region.width,
        region.height,
    )
    .to_image();
    let (width, height) = cropped.dimensions();
    Frame::new(cropped.into_raw(), width, height, frame.index())
}

fn ms_since(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
