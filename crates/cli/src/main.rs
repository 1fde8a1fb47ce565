use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use emosignal_core::capture::domain::frame_source::FrameSource;
use emosignal_core::capture::infrastructure::http_snapshot_source::HttpSnapshotSource;
use emosignal_core::capture::infrastructure::opencv_camera_source::OpenCvCameraSource;
use emosignal_core::classification::infrastructure::onnx_emotion_classifier::OnnxEmotionClassifier;
use emosignal_core::detection::infrastructure::haar_cascade_locator::HaarCascadeLocator;
use emosignal_core::display::domain::frame_display::{FrameDisplay, HeadlessDisplay};
use emosignal_core::display::infrastructure::opencv_window_display::OpenCvWindowDisplay;
use emosignal_core::pipeline::emotion_signal_use_case::EmotionSignalUseCase;
use emosignal_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use emosignal_core::shared::config::AppConfig;
use emosignal_core::shared::constants::{
    ARMING_SQUARE_SIZE, CAMERA_ARMING_SQUARE_ORIGIN, CASCADE_MODEL_NAME, CASCADE_MODEL_URL,
    EMOTION_MODEL_NAME, EMOTION_MODEL_URL, SNAPSHOT_ARMING_SQUARE_ORIGIN, WINDOW_TITLE,
};
use emosignal_core::shared::model_resolver;
use emosignal_core::shared::region::Region;
use emosignal_core::signal::domain::arming_gate::FixedGate;
use emosignal_core::signal::infrastructure::http_signal_reporter::HttpSignalReporter;

/// Turns facial emotions seen by a camera into numeric signals for a
/// networked receiver.
#[derive(Parser)]
#[command(name = "emosignal", version)]
struct Cli {
    #[command(subcommand)]
    source: SourceCommand,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Subcommand)]
enum SourceCommand {
    /// Read frames from a local capture device.
    Camera {
        /// Capture device index.
        #[arg(long)]
        device: Option<i32>,
    },
    /// Poll a network camera's still-image URL.
    Snapshot {
        /// Snapshot URL, e.g. http://192.168.4.5/cam-hi.jpg.
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Args)]
struct SharedArgs {
    /// JSON config file; flags given here override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Receiver host, optionally with :port (default 192.168.4.1).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Haar cascade XML (downloaded to the model cache if omitted).
    #[arg(long, global = true)]
    cascade: Option<PathBuf>,

    /// FER+ emotion ONNX model (downloaded to the model cache if omitted).
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Run without a preview window.
    #[arg(long, global = true)]
    headless: bool,

    /// Report 0 for every face.
    #[arg(long, global = true)]
    disarmed: bool,

    /// Stop after this many processed frames.
    #[arg(long, global = true)]
    max_frames: Option<usize>,

    /// Classify the colour crop instead of the luminance crop.
    #[arg(long, global = true)]
    color_faces: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = build_use_case(Cli::parse())?;
    let outcome = use_case.run();

    log::info!(
        "Stopped ({:?}) after {} frames, {} reports",
        outcome.stop,
        outcome.stats.frames_processed,
        outcome.stats.reports_dispatched
    );
    Ok(())
}

fn build_use_case(cli: Cli) -> Result<EmotionSignalUseCase, Box<dyn std::error::Error>> {
    let config = build_config(&cli)?;

    // A missing capture device fails before any model download.
    let (source, square_origin): (Box<dyn FrameSource>, (i32, i32)) = match cli.source {
        SourceCommand::Camera { .. } => {
            log::info!("Opening capture device {}", config.camera_index);
            (
                Box::new(OpenCvCameraSource::open(config.camera_index)?),
                CAMERA_ARMING_SQUARE_ORIGIN,
            )
        }
        SourceCommand::Snapshot { .. } => {
            log::info!("Polling snapshots from {}", config.snapshot_url);
            (
                Box::new(HttpSnapshotSource::new(config.snapshot_url.clone())),
                SNAPSHOT_ARMING_SQUARE_ORIGIN,
            )
        }
    };

    let cascade_path = model_path(
        config.cascade_path.as_deref(),
        CASCADE_MODEL_NAME,
        CASCADE_MODEL_URL,
    )?;
    let emotion_model_path = model_path(
        config.model_path.as_deref(),
        EMOTION_MODEL_NAME,
        EMOTION_MODEL_URL,
    )?;

    let locator = HaarCascadeLocator::new(&cascade_path, config.cascade)?;
    let classifier = OnnxEmotionClassifier::new(&emotion_model_path)?;

    let display: Box<dyn FrameDisplay> = if config.headless {
        Box::new(HeadlessDisplay)
    } else {
        let (x, y) = square_origin;
        let (w, h) = ARMING_SQUARE_SIZE;
        Box::new(OpenCvWindowDisplay::new(
            WINDOW_TITLE,
            Some(Region::new(x, y, w, h)),
        )?)
    };

    log::info!(
        "Reporting to http://{}/data/ ({})",
        config.endpoint,
        if config.armed { "armed" } else { "disarmed" }
    );

    Ok(EmotionSignalUseCase::new(
        source,
        Box::new(locator),
        Box::new(classifier),
        Box::new(FixedGate(config.armed)),
        Box::new(HttpSignalReporter::new(config.endpoint.clone())),
        display,
        Box::new(StdoutPipelineLogger::default()),
        config.pipeline_settings(),
        None,
    ))
}

/// File values first, then command-line overrides, then validation.
fn build_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.shared.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match &cli.source {
        SourceCommand::Camera { device } => {
            if let Some(device) = device {
                config.camera_index = *device;
            }
        }
        SourceCommand::Snapshot { url } => {
            if let Some(url) = url {
                config.snapshot_url = url.clone();
            }
        }
    }

    let shared = &cli.shared;
    if let Some(endpoint) = &shared.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(cascade) = &shared.cascade {
        config.cascade_path = Some(cascade.clone());
    }
    if let Some(model) = &shared.model {
        config.model_path = Some(model.clone());
    }
    if shared.max_frames.is_some() {
        config.max_frames = shared.max_frames;
    }
    config.headless |= shared.headless;
    if shared.disarmed {
        config.armed = false;
    }
    if shared.color_faces {
        config.grayscale_faces = false;
    }

    config.validate()?;
    Ok(config)
}

fn model_path(
    explicit: Option<&Path>,
    name: &'static str,
    url: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(format!("Model file not found: {}", path.display()).into());
        }
        return Ok(path.to_path_buf());
    }

    log::info!("Resolving model: {name}");
    let path = model_resolver::resolve(
        name,
        url,
        None,
        Some(Box::new(move |downloaded, total| {
            download_progress(name, downloaded, total)
        })),
    )?;
    eprintln!();
    Ok(path)
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emosignal_core::capture::domain::frame_source::FrameAcquisitionError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_missing_device_fails_before_models_are_touched() {
        let cli = parse(&[
            "emosignal",
            "camera",
            "--device",
            "9999",
            "--cascade",
            "/nonexistent/haarcascade.xml",
            "--model",
            "/nonexistent/emotion.onnx",
            "--headless",
        ]);

        let err = match build_use_case(cli) {
            Ok(_) => panic!("device 9999 should not open"),
            Err(e) => e,
        };
        assert!(matches!(
            err.downcast_ref::<FrameAcquisitionError>(),
            Some(FrameAcquisitionError::DeviceOpen { index: 9999, .. })
        ));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "emosignal",
            "snapshot",
            "--url",
            "http://10.0.0.7/cam-lo.jpg",
            "--endpoint",
            "10.0.0.2:8080",
            "--disarmed",
            "--color-faces",
            "--max-frames",
            "5",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.snapshot_url, "http://10.0.0.7/cam-lo.jpg");
        assert_eq!(config.endpoint, "10.0.0.2:8080");
        assert!(!config.armed);
        assert!(!config.grayscale_faces);
        assert_eq!(config.max_frames, Some(5));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let cli = parse(&["emosignal", "camera", "--endpoint", "http://host/"]);
        assert!(build_config(&cli).is_err());
    }
}
