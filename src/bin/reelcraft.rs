use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelcraft::{EncodeStrategy, ImageAsset, Pipeline, PipelineConfig, PipelineInput};

#[derive(Parser, Debug)]
#[command(name = "reelcraft", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose captioned frames and encode them into an MP4.
    Run(RunArgs),
    /// Print what the local ffmpeg supports.
    Probe,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Text segment (repeatable, in order).
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Read segments from a JSON array of strings, or a text file with one segment per
    /// paragraph (separated by blank lines).
    #[arg(long)]
    texts_file: Option<PathBuf>,

    /// Base image (repeatable, in order).
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,

    /// Preferred font file.
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    /// Pipeline configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory for run output (overrides the config).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Where the texts came from; copied into the manifest.
    #[arg(long)]
    source_ref: Option<String>,

    /// Encoding strategy: auto, sequence or clip-concat (overrides the config).
    #[arg(long)]
    strategy: Option<EncodeStrategy>,

    /// Seconds per frame (overrides the config with a uniform duration).
    #[arg(long)]
    seconds: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Probe => cmd_probe(),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.out_dir {
        cfg.output_dir = Some(dir);
    }
    if let Some(strategy) = args.strategy {
        cfg.encode.strategy = strategy;
    }
    if let Some(seconds) = args.seconds {
        cfg.duration = reelcraft::DurationPolicy::Uniform { seconds };
    }

    let mut texts = args.texts;
    if let Some(path) = &args.texts_file {
        texts.extend(read_texts_file(path)?);
    }

    let mut input = PipelineInput::new(
        texts,
        args.images.into_iter().map(ImageAsset::uploaded).collect(),
    );
    input.title = args.title;
    input.font_path = args.font;
    input.source_ref = args.source_ref;

    let mut pipeline = Pipeline::new(cfg)?;
    let mut last_pct = None;
    let project = pipeline.run(&input, &mut |p| {
        let pct = (p * 100.0).round() as u32;
        if last_pct != Some(pct) {
            last_pct = Some(pct);
            eprint!("\rprogress {pct:>3}%");
            let _ = std::io::stderr().flush();
        }
    })?;
    eprintln!();

    let manifest = project.output_dir.join("project.json");
    project.write_manifest(&manifest)?;

    for path in project.frame_paths() {
        eprintln!("frame {}", path.display());
    }
    match (&project.video, &project.encode_failure) {
        (Some(video), _) => eprintln!(
            "wrote {} ({:.2}s, {})",
            video.path.display(),
            video.duration_s,
            video.codec
        ),
        (None, Some(failure)) => eprintln!("no video: {}", failure.message),
        (None, None) => eprintln!("no video"),
    }
    println!("{}", manifest.display());
    Ok(())
}

fn cmd_probe() -> anyhow::Result<()> {
    let caps = reelcraft::probe_backend();
    let json = serde_json::to_string_pretty(&caps).context("serialize backend capabilities")?;
    println!("{json}");
    Ok(())
}

fn read_texts_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read texts file '{}'", path.display()))?;
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        return serde_json::from_str(&raw)
            .with_context(|| format!("parse texts file '{}' as a JSON array", path.display()));
    }
    Ok(paragraphs(&raw))
}

/// Split on blank lines. `lines()` also strips `\r`, so CRLF files split the same way.
fn paragraphs(raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}
