use clap::Parser;
use detpipe::preprocess::image_dimensions;
use detpipe::{
    class_color, ClassNames, DetectConfig, Detection, DetectionOrder, DetectionPipeline,
    RawOutputTensor,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Detector output post-processing (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for the pipeline stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TensorFormat {
    /// Flat or nested JSON number arrays.
    #[default]
    Json,
    /// Packed little-endian `f32` values.
    F32le,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OrderConfig {
    #[default]
    Suppression,
    Candidate,
}

impl From<OrderConfig> for DetectionOrder {
    fn from(value: OrderConfig) -> Self {
        match value {
            OrderConfig::Suppression => DetectionOrder::Suppression,
            OrderConfig::Candidate => DetectionOrder::Candidate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectConfigJson {
    conf_threshold: f32,
    iou_threshold: f32,
    input_width: u32,
    input_height: u32,
    num_classes: usize,
    order: OrderConfig,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            conf_threshold: cfg.conf_threshold,
            iou_threshold: cfg.iou_threshold,
            input_width: cfg.input_width,
            input_height: cfg.input_height,
            num_classes: cfg.num_classes,
            order: OrderConfig::Suppression,
        }
    }
}

impl From<DetectConfigJson> for DetectConfig {
    fn from(value: DetectConfigJson) -> Self {
        Self {
            conf_threshold: value.conf_threshold,
            iou_threshold: value.iou_threshold,
            input_width: value.input_width,
            input_height: value.input_height,
            num_classes: value.num_classes,
            order: value.order.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    tensor_format: TensorFormat,
    tensor_shape: Option<Vec<usize>>,
    image_width: Option<u32>,
    image_height: Option<u32>,
    image_path: Option<String>,
    class_names_path: Option<String>,
    output_path: Option<String>,
    detect: DetectConfigJson,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    score: f32,
    class_id: usize,
    class_name: Option<String>,
    label: String,
    color: [u8; 3],
}

impl DetectionRecord {
    fn new(det: &Detection, names: &ClassNames) -> Self {
        Self {
            x: det.bbox.x,
            y: det.bbox.y,
            w: det.bbox.w,
            h: det.bbox.h,
            score: det.score,
            class_id: det.class_id,
            class_name: names.name(det.class_id).map(str::to_owned),
            label: det.label(names),
            color: class_color(det.class_id),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    image_width: u32,
    image_height: u32,
    count: usize,
    detections: Vec<DetectionRecord>,
}

fn flatten_numbers(value: &serde_json::Value, out: &mut Vec<f32>) -> Result<(), String> {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                flatten_numbers(item, out)?;
            }
            Ok(())
        }
        serde_json::Value::Number(n) => {
            let v = n.as_f64().ok_or_else(|| format!("unrepresentable number {n}"))?;
            out.push(v as f32);
            Ok(())
        }
        other => Err(format!("expected a number or array, found {other}")),
    }
}

fn read_tensor(path: &str, format: TensorFormat) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    match format {
        TensorFormat::Json => {
            let text = fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let mut data = Vec::new();
            flatten_numbers(&value, &mut data)?;
            Ok(data)
        }
        TensorFormat::F32le => {
            let bytes = fs::read(path)?;
            if bytes.len() % 4 != 0 {
                return Err(format!("{path}: length {} is not a multiple of 4", bytes.len()).into());
            }
            Ok(bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect())
        }
    }
}

fn resolve_image_size(config: &Config) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    match (config.image_width, config.image_height, &config.image_path) {
        (Some(w), Some(h), _) => Ok((w, h)),
        (_, _, Some(path)) => Ok(image_dimensions(path)?),
        _ => Err("set image_width and image_height, or image_path".into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detpipe=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let (image_width, image_height) = resolve_image_size(&config)?;
    let names = match &config.class_names_path {
        Some(path) => ClassNames::load(path)?,
        None => ClassNames::default(),
    };

    let data = read_tensor(&config.tensor_path, config.tensor_format)?;
    let shape = config.tensor_shape.clone();
    let pipeline = DetectionPipeline::new(config.detect.into())?;
    let num_classes = pipeline.config().num_classes;
    if !names.is_empty() {
        names.ensure_len(num_classes)?;
    }

    let raw = match &shape {
        Some(shape) => RawOutputTensor::with_shape(&data, shape)?,
        None => RawOutputTensor::from_slice(&data, num_classes)?,
    };
    info!(
        rows = raw.num_candidates(),
        image_width, image_height, "running pipeline"
    );

    let detections = pipeline.infer(raw, image_width, image_height)?;
    let output = Output {
        image_width,
        image_height,
        count: detections.len(),
        detections: detections
            .iter()
            .map(|det| DetectionRecord::new(det, &names))
            .collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
