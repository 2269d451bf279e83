use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use cast_index_core::appearance::domain::appearance_resolver::resolve_frame;
use cast_index_core::appearance::domain::detection::FrameDetections;
use cast_index_core::appearance::face_identifier::FaceIdentifier;
use cast_index_core::identity::identity_collection_manager::IdentityCollectionManager;
use cast_index_core::pipeline::extract_frames_use_case::ExtractFramesUseCase;
use cast_index_core::pipeline::handle_storage_event_use_case::HandleStorageEventUseCase;
use cast_index_core::pipeline::infrastructure::video_pipeline::{PipelineSettings, VideoPipeline};
use cast_index_core::pipeline::pipeline_launcher::VideoRequest;
use cast_index_core::pipeline::process_frame_use_case::ProcessFrameUseCase;
use cast_index_core::pipeline::record_job_use_case::RecordJobUseCase;
use cast_index_core::pipeline::start_shot_detection_use_case::StartShotDetectionUseCase;
use cast_index_core::pipeline::storage_event::{EventResponse, StorageNotification};
use cast_index_core::shared::config::IndexerConfig;
use cast_index_core::shared::storage_path::StorageKey;
use cast_index_core::storage::domain::record_store::AppearanceStore;
use cast_index_core::storage::infrastructure::json_record_store::JsonRecordStore;
use cast_index_core::storage::infrastructure::local_object_store::LocalObjectStore;
use cast_index_core::video::domain::frame_encoder::FrameEncoder;
use cast_index_core::video::domain::shot_frame_selector::ShotFrameSelector;
use cast_index_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use cast_index_core::video::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use cast_index_core::vision::infrastructure::http_vision_client::HttpVisionClient;

/// Cast appearance indexing for episodic video.
#[derive(Parser)]
#[command(name = "cast-index", version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the configuration file. Flags win over environment
/// variables, which win over the file.
#[derive(Args, Default)]
struct Settings {
    /// JSON configuration file.
    #[arg(long, global = true, env = "CAST_INDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory of the object store.
    #[arg(long, global = true, env = "STORAGE_ROOT")]
    storage_root: Option<PathBuf>,

    /// Directory holding the record tables.
    #[arg(long, global = true, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL of the vision service gateway.
    #[arg(long, global = true, env = "VISION_ENDPOINT")]
    vision_endpoint: Option<String>,

    /// Minimum confidence (0-100) for label detection.
    #[arg(long, global = true, env = "LABEL_MINIMUM_CONFIDENCE_LEVEL")]
    label_min_confidence: Option<f64>,

    /// Minimum similarity (0-100) for a face to match an identity.
    #[arg(long, global = true, env = "FACE_MINIMUM_CONFIDENCE_LEVEL")]
    face_min_confidence: Option<f64>,

    /// Minimum confidence (0-100) for a shot boundary.
    #[arg(long, global = true, env = "MIN_SEGMENT_CONFIDENCE")]
    segment_min_confidence: Option<f64>,

    /// Frames processed concurrently.
    #[arg(long, global = true, env = "FRAME_WORKERS")]
    frame_workers: Option<usize>,

    /// Delay between shot-detection status polls, in milliseconds.
    #[arg(long, global = true, env = "POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Status polls before giving up on shot detection.
    #[arg(long, global = true, env = "MAX_POLLS")]
    max_polls: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Route a storage notification (JSON file, or - for stdin).
    Event { input: PathBuf },

    /// Index one episode end to end.
    Run {
        /// Object key of the video: {series}/episodes/{episode}.mp4
        video_key: String,

        /// Bucket name reported to the vision service.
        #[arg(long, default_value = "local")]
        bucket: String,
    },

    /// Extract the frames at the given timestamps from a local video.
    SelectFrames {
        video: PathBuf,
        out_dir: PathBuf,

        /// Comma-separated frame timestamps in milliseconds.
        #[arg(long, value_delimiter = ',', required = true)]
        targets: Vec<i64>,
    },

    /// Resolve one frame's detections (JSON file, or - for stdin).
    Resolve { input: PathBuf },

    /// List the appearance records stored for a job.
    Appearances { job_id: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("LOG_LEVEL", "warn"))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.settings)?;

    match cli.command {
        Command::Event { input } => run_event(&config, &input),
        Command::Run { video_key, bucket } => run_pipeline(&config, &video_key, &bucket),
        Command::SelectFrames {
            video,
            out_dir,
            targets,
        } => run_select_frames(&video, &out_dir, &targets),
        Command::Resolve { input } => run_resolve(&input),
        Command::Appearances { job_id } => run_appearances(&config, &job_id),
    }
}

fn run_event(config: &IndexerConfig, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let notification: StorageNotification = serde_json::from_str(&read_input(input)?)?;

    let vision = vision_client(config)?;
    let objects = Arc::new(LocalObjectStore::new(&config.storage_root));
    let records = Arc::new(JsonRecordStore::open(&config.data_dir)?);
    let manager = IdentityCollectionManager::new(
        vision.clone(),
        records.clone(),
        records.clone(),
        objects.clone(),
    );
    let pipeline = build_pipeline(config, vision, objects, records);
    let use_case = HandleStorageEventUseCase::new(manager, Arc::new(pipeline));

    match use_case.execute(&notification) {
        Ok(outcome) => print_json(&EventResponse::from(&outcome)),
        Err(e) => {
            print_json(&EventResponse::from_error(&e))?;
            Err(e.into())
        }
    }
}

fn run_pipeline(
    config: &IndexerConfig,
    video_key: &str,
    bucket: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let StorageKey::Video(video) = StorageKey::parse(video_key)? else {
        return Err(format!("Not an episode key: {video_key}").into());
    };

    let vision = vision_client(config)?;
    let objects = Arc::new(LocalObjectStore::new(&config.storage_root));
    let records = Arc::new(JsonRecordStore::open(&config.data_dir)?);
    let pipeline = build_pipeline(config, vision, objects, records);

    let report = pipeline.run(&VideoRequest::new(bucket, &video))?;
    log::info!(
        "Job {}: {} frames, {} records, {} failed",
        report.job_id,
        report.frames,
        report.records,
        report.failed_frames.len()
    );
    print_json(&report)
}

fn run_select_frames(
    video: &Path,
    out_dir: &Path,
    targets: &[i64],
) -> Result<(), Box<dyn std::error::Error>> {
    if !video.exists() {
        return Err(format!("Input file not found: {}", video.display()).into());
    }
    let encoder = Arc::new(JpegFrameEncoder::new());
    let mut selector = ShotFrameSelector::new(Box::new(FfmpegReader::new()), encoder.clone());
    let targets: BTreeSet<i64> = targets.iter().copied().collect();
    let frames = selector.select(&targets, video)?;

    std::fs::create_dir_all(out_dir)?;
    for frame in &frames {
        let path = out_dir.join(format!("{}.{}", frame.timestamp_ms, encoder.extension()));
        std::fs::write(&path, &frame.image)?;
        log::debug!("Wrote {}", path.display());
    }
    eprintln!(
        "Matched {} of {} timestamps, frames written to {}",
        frames.len(),
        targets.len(),
        out_dir.display()
    );
    Ok(())
}

fn run_resolve(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let detections: FrameDetections = serde_json::from_str(&read_input(input)?)?;
    print_json(&resolve_frame(&detections))
}

fn run_appearances(config: &IndexerConfig, job_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let records = JsonRecordStore::open(&config.data_dir)?;
    print_json(&records.list_for_job(job_id)?)
}

fn build_pipeline(
    config: &IndexerConfig,
    vision: Arc<HttpVisionClient>,
    objects: Arc<LocalObjectStore>,
    records: Arc<JsonRecordStore>,
) -> VideoPipeline {
    VideoPipeline::new(
        StartShotDetectionUseCase::new(vision.clone(), config.segment_min_confidence),
        ExtractFramesUseCase::new(
            vision.clone(),
            objects.clone(),
            Box::new(|| Box::new(FfmpegReader::new())),
            Arc::new(JpegFrameEncoder::new()),
        ),
        RecordJobUseCase::new(records.clone()),
        ProcessFrameUseCase::new(
            vision.clone(),
            FaceIdentifier::new(vision, config.face_min_confidence),
            objects,
            records,
            config.label_min_confidence,
        ),
        PipelineSettings {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls,
            frame_workers: config.frame_workers,
        },
    )
}

fn vision_client(config: &IndexerConfig) -> Result<Arc<HttpVisionClient>, Box<dyn std::error::Error>> {
    let endpoint = config
        .vision_endpoint
        .as_deref()
        .ok_or("--vision-endpoint (or VISION_ENDPOINT) is required for this command")?;
    Ok(Arc::new(HttpVisionClient::new(
        endpoint,
        Duration::from_secs(config.request_timeout_secs),
    )?))
}

fn load_config(settings: &Settings) -> Result<IndexerConfig, Box<dyn std::error::Error>> {
    let mut config = match &settings.config {
        Some(path) => IndexerConfig::from_file(path)?,
        None => IndexerConfig::default(),
    };
    apply_overrides(&mut config, settings);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut IndexerConfig, settings: &Settings) {
    if let Some(root) = &settings.storage_root {
        config.storage_root = root.clone();
    }
    if let Some(dir) = &settings.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(endpoint) = &settings.vision_endpoint {
        config.vision_endpoint = Some(endpoint.clone());
    }
    if let Some(v) = settings.label_min_confidence {
        config.label_min_confidence = v;
    }
    if let Some(v) = settings.face_min_confidence {
        config.face_min_confidence = v;
    }
    if let Some(v) = settings.segment_min_confidence {
        config.segment_min_confidence = v;
    }
    if let Some(v) = settings.frame_workers {
        config.frame_workers = v;
    }
    if let Some(v) = settings.poll_interval_ms {
        config.poll_interval_ms = v;
    }
    if let Some(v) = settings.max_polls {
        config.max_polls = v;
    }
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
