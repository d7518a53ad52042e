use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;

use moodcam_core::detection::domain::face_detector::DetectorSettings;
use moodcam_core::pipeline::frame_pipeline::FramePipeline;
use moodcam_core::pipeline::infrastructure::asset_context_builder::AssetContextBuilder;
use moodcam_core::pipeline::infrastructure::refresh_scheduler::RefreshScheduler;
use moodcam_core::pipeline::init_sequencer::InitSequencer;
use moodcam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use moodcam_core::pipeline::reading::SharedReading;
use moodcam_core::shared::asset_resolver::{self, ProgressFn};
use moodcam_core::shared::constants::{OVERLAY_FONT_NAME, OVERLAY_FONT_URL};
use moodcam_core::video::domain::frame_sink::FrameSink;
use moodcam_core::video::infrastructure::glyph_overlay::GlyphOverlay;
use moodcam_core::video::infrastructure::image_dir_sink::{ImageDirSink, NullSink};
use moodcam_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

/// Live face emotion classification over a stream of frames.
#[derive(Parser)]
#[command(name = "moodcam")]
struct Cli {
    /// Input directory of images, or one or more image files.
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Write annotated frames as numbered PNGs into this directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Loop the input sequence to simulate a live feed.
    #[arg(long)]
    repeat: bool,

    /// Target cycle rate in frames per second.
    #[arg(long, default_value = "30")]
    fps: f64,

    /// Stop after this many pipeline cycles.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Print the final reading as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    /// Overlay font file (TTF/OTF); defaults to the downloaded font.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Look for pipeline assets here before hitting the cache or network.
    #[arg(long)]
    bundled_dir: Option<PathBuf>,

    /// Face detector pyramid scale step.
    #[arg(long, default_value = "1.1")]
    scale_factor: f32,

    /// Detection evidence threshold; higher means fewer false faces.
    #[arg(long, default_value = "3")]
    min_neighbors: u32,

    /// Smallest face searched for, in pixels.
    #[arg(long, default_value = "20")]
    min_face_size: u32,

    /// Print cycle progress every Nth cycle.
    #[arg(long, default_value = "30")]
    log_every: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let source = build_source(&cli)?;
    let sink: Box<dyn FrameSink> = match &cli.out {
        Some(dir) => Box::new(ImageDirSink::new(dir.clone())),
        None => Box::new(NullSink),
    };
    let overlay = GlyphOverlay::from_font_bytes(load_font(&cli)?)?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })?;
    }

    let sequencer = Arc::new(InitSequencer::new());
    spawn_initializer(&cli, Arc::clone(&sequencer));

    let reading = SharedReading::new();
    let mut pipeline = FramePipeline::new(
        Box::new(source),
        sink,
        Box::new(overlay),
        Box::new(StdoutPipelineLogger::new(cli.log_every)),
        sequencer,
        reading.clone(),
    );

    let mut scheduler = RefreshScheduler::new(cli.fps, cli.max_frames, Some(stop));
    pipeline.run(&mut scheduler)?;

    if let Some(dir) = &cli.out {
        log::info!("Annotated frames written to {}", dir.display());
    }
    report_reading(&reading, cli.json)?;
    Ok(())
}

/// Runs the four initialization steps off the cycle loop's thread; the
/// pipeline gates on the sequencer until they finish.
fn spawn_initializer(cli: &Cli, sequencer: Arc<InitSequencer>) {
    let settings = DetectorSettings {
        scale_factor: cli.scale_factor,
        min_neighbors: cli.min_neighbors,
        min_face_size: cli.min_face_size,
    };
    let bundled_dir = cli.bundled_dir.clone();

    thread::spawn(move || {
        let progress: ProgressFn = Box::new(download_progress);
        let mut builder = AssetContextBuilder::new(settings, bundled_dir, Some(progress));
        // Failure is recorded in the sequencer and surfaces through the
        // pipeline's run loop.
        let _ = sequencer.initialize(&mut builder, &mut |step| {
            eprintln!("Initializing: {}", step.describe());
        });
    });
}

fn build_source(cli: &Cli) -> Result<ImageSequenceSource, Box<dyn std::error::Error>> {
    if cli.input.len() == 1 && cli.input[0].is_dir() {
        return ImageSequenceSource::from_dir(&cli.input[0], cli.repeat);
    }
    for path in &cli.input {
        if !path.is_file() {
            return Err(format!("Input file not found: {}", path.display()).into());
        }
    }
    Ok(ImageSequenceSource::from_paths(cli.input.clone(), cli.repeat))
}

fn load_font(cli: &Cli) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let path = match &cli.font {
        Some(path) => path.clone(),
        None => {
            let progress: ProgressFn = Box::new(download_progress);
            asset_resolver::resolve(
                OVERLAY_FONT_NAME,
                OVERLAY_FONT_URL,
                cli.bundled_dir.as_deref(),
                Some(&progress),
            )?
        }
    };
    Ok(std::fs::read(path)?)
}

fn report_reading(reading: &SharedReading, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match reading.get() {
        Some(result) if json => println!("{}", serde_json::to_string(&result)?),
        Some(result) => println!(
            "Final reading: {} {:.1}%",
            result.label,
            result.confidence * 100.0
        ),
        None if json => println!("null"),
        None => println!("Final reading: none"),
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.fps <= 0.0 {
        return Err(format!("Target fps must be positive, got {}", cli.fps).into());
    }
    if cli.scale_factor <= 1.0 {
        return Err(format!(
            "Scale factor must be greater than 1.0, got {}",
            cli.scale_factor
        )
        .into());
    }
    if cli.min_face_size == 0 {
        return Err("Minimum face size must be at least 1 pixel".into());
    }
    if let Some(font) = &cli.font {
        if !font.is_file() {
            return Err(format!("Font file not found: {}", font.display()).into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading pipeline asset... {pct}%");
    } else {
        eprint!("\rDownloading pipeline asset... {downloaded} bytes");
    }
}
