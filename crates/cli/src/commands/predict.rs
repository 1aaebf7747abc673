//! Prediction command

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use predict_lib::{
    ConceptSelector, InferenceParams, Modality, ModelReference, OutputConfig, PredictionClient,
    PredictionResult, RequestBuilder,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::Tabled;

use crate::output::{
    color_score, format_bytes, format_offset, print_json, print_success, print_table,
    print_warning, OutputFormat,
};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file", "text"])))]
pub struct RunArgs {
    /// Model URL or owner/app/model[@version]
    pub model: String,

    /// Payload URL fetched by the service
    #[arg(long)]
    pub url: Option<String>,

    /// Local payload file, sent inline
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Inline text payload
    #[arg(long)]
    pub text: Option<String>,

    /// Input type: text, image, video, audio or multimodal (inferred when omitted)
    #[arg(long, short = 't')]
    pub input_type: Option<String>,

    /// Text prompt for multimodal input
    #[arg(long)]
    pub prompt: Option<String>,

    /// Maximum number of concepts to return
    #[arg(long)]
    pub max_concepts: Option<u32>,

    /// Drop concepts scoring below this value
    #[arg(long)]
    pub min_value: Option<f32>,

    /// Only return concepts with this name (repeatable)
    #[arg(long = "select-concept", value_name = "NAME")]
    pub select_concepts: Vec<String>,

    /// Only return concepts with this id (repeatable)
    #[arg(long = "select-concept-id", value_name = "ID")]
    pub select_concept_ids: Vec<String>,

    /// Video only: sample one frame every MS milliseconds
    #[arg(long, value_name = "MS")]
    pub sample_ms: Option<u32>,

    /// Model inference parameter (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write the result (or generated media) to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Row for concepts table
#[derive(Tabled)]
struct ConceptRow {
    #[tabled(rename = "Concept")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Score")]
    score: String,
}

/// Row for regions table
#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Top Concept")]
    concept: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Box (top, left, bottom, right)")]
    bounding_box: String,
    #[tabled(rename = "Mask")]
    mask: String,
}

/// Row for video frames table
#[derive(Tabled)]
struct FrameRow {
    #[tabled(rename = "Frame")]
    index: u32,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Concepts")]
    concepts: String,
}

/// Run a single prediction and render the result
pub async fn run(client: &PredictionClient, args: RunArgs, format: OutputFormat) -> Result<()> {
    let reference: ModelReference = args
        .model
        .parse()
        .with_context(|| format!("Invalid model reference: {}", args.model))?;

    let modality = match &args.input_type {
        Some(input_type) => input_type.parse::<Modality>()?,
        None => infer_modality(&args),
    };

    let mut builder = RequestBuilder::new(modality)
        .output_config(output_config(&args))
        .params(inference_params(&args.params)?);
    if let Some(prompt) = &args.prompt {
        builder = builder.prompt(prompt.clone());
    }
    builder = match (&args.url, &args.file, &args.text) {
        (Some(url), _, _) => builder.url(url.clone()),
        (_, Some(path), _) => builder.file_path(path.clone()),
        (_, _, Some(text)) => builder.bytes(text.clone().into_bytes()),
        _ => anyhow::bail!("One of --url, --file or --text is required"),
    };
    let request = builder.build().context("Invalid prediction request")?;

    let result = match args.timeout {
        Some(secs) => {
            client
                .predict_with_timeout(&reference, &request, Duration::from_secs(secs))
                .await
        }
        None => client.predict(&reference, &request).await,
    }
    .with_context(|| format!("Prediction with {} failed", reference))?;

    render(&result, format, args.output.as_deref())
}

/// Guess the input type from the payload when none is given
fn infer_modality(args: &RunArgs) -> Modality {
    if args.text.is_some() {
        return Modality::Text;
    }
    if args.prompt.is_some() {
        return Modality::Multimodal;
    }

    let name = args
        .file
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .or_else(|| args.url.clone())
        .unwrap_or_default();
    modality_for_name(&name)
}

fn modality_for_name(name: &str) -> Modality {
    let name = name.split(['?', '#']).next().unwrap_or(name);
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" | "mov" | "avi" | "mkv" | "webm" | "gif" => Modality::Video,
        "wav" | "mp3" | "flac" | "ogg" | "m4a" => Modality::Audio,
        "txt" | "md" | "csv" | "json" => Modality::Text,
        _ => Modality::Image,
    }
}

fn output_config(args: &RunArgs) -> OutputConfig {
    let mut config = OutputConfig::new();
    config.sample_ms = args.sample_ms;
    config.max_concepts = args.max_concepts;
    config.min_value = args.min_value;
    config.select_concepts = args
        .select_concepts
        .iter()
        .map(ConceptSelector::by_name)
        .chain(args.select_concept_ids.iter().map(ConceptSelector::by_id))
        .collect();
    config
}

fn inference_params(raw: &[String]) -> Result<InferenceParams> {
    let mut params = InferenceParams::new();
    for pair in raw {
        let (key, value) = InferenceParams::parse_pair(pair)?;
        params.insert(key, value);
    }
    Ok(params)
}

fn render(result: &PredictionResult, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    if let OutputFormat::Json = format {
        return match output {
            Some(path) => {
                let json = serde_json::to_string_pretty(result)?;
                write_file(path, json.as_bytes())
            }
            None => print_json(result),
        };
    }

    match result {
        PredictionResult::Concepts(concepts) => {
            if concepts.is_empty() {
                print_warning("No concepts returned");
                return Ok(());
            }
            let rows: Vec<ConceptRow> = concepts
                .iter()
                .map(|c| ConceptRow {
                    name: c.name.clone(),
                    id: c.id.clone().unwrap_or_default(),
                    score: color_score(c.value),
                })
                .collect();
            print_table(rows);
        }
        PredictionResult::Regions(regions) => {
            if regions.is_empty() {
                print_warning("No regions returned");
                return Ok(());
            }
            let rows: Vec<RegionRow> = regions
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    let top = r.top_concept();
                    RegionRow {
                        index: i,
                        concept: top.map(|c| c.name.clone()).unwrap_or_default(),
                        score: top.map(|c| color_score(c.value)).unwrap_or_default(),
                        bounding_box: r
                            .bounding_box
                            .map(|b| {
                                let b = b.rounded(3);
                                format!(
                                    "{}, {}, {}, {}",
                                    b.top_row, b.left_col, b.bottom_row, b.right_col
                                )
                            })
                            .unwrap_or_else(|| "-".to_string()),
                        mask: r
                            .mask
                            .as_ref()
                            .filter(|m| !m.is_empty())
                            .map(|m| format_bytes(m.len() as u64))
                            .unwrap_or_default(),
                    }
                })
                .collect();
            print_table(rows);
            println!("\nTotal: {} regions", regions.len());
        }
        PredictionResult::Frames(frames) => {
            if frames.is_empty() {
                print_warning("No frames returned");
                return Ok(());
            }
            let rows: Vec<FrameRow> = frames
                .iter()
                .map(|f| FrameRow {
                    index: f.index,
                    time: format_offset(f.time_ms),
                    concepts: f
                        .concepts
                        .iter()
                        .map(|c| format!("{} {:.3}", c.name, c.value))
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();
            print_table(rows);
        }
        PredictionResult::GeneratedText(text) => match output {
            Some(path) => write_file(path, text.as_bytes())?,
            None => println!("{}", text),
        },
        PredictionResult::GeneratedImage(bytes) | PredictionResult::GeneratedAudio(bytes) => {
            let path = output.with_context(|| {
                format!(
                    "Model returned {} ({}); pass --output FILE to save it",
                    result.kind().as_str(),
                    format_bytes(bytes.len() as u64)
                )
            })?;
            write_file(path, bytes)?;
        }
    }

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    print_success(&format!(
        "Wrote {} to {}",
        format_bytes(bytes.len() as u64),
        path.display()
    ));
    Ok(())
}
