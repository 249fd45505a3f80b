//! sectionrank CLI - persona-driven section ranking tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use sectionrank::report::{to_json, ChallengeInput};
use sectionrank::{
    BlockSource, ChallengeReport, JsonFileSource, JsonFormat, Pipeline, RankOptions, Segmenter,
};

#[derive(Parser)]
#[command(name = "sectionrank")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rank document sections against a persona and task", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the sections of a document collection
    Rank {
        /// Challenge input file (documents, persona, job_to_be_done)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory holding one <file stem>.json block file per document
        #[arg(short, long, value_name = "DIR")]
        blocks_dir: PathBuf,

        /// JSON configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Number of ranked sections
        #[arg(long)]
        top_k: Option<usize>,

        /// Batch timeout for segmentation in milliseconds
        #[arg(long, env = "SECTIONRANK_TIMEOUT_MS")]
        timeout_ms: Option<u64>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write flat ranking records instead of the challenge report
        #[arg(long)]
        records: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the sections detected in a block file
    Segment {
        /// Block file (JSON array of text blocks)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file
    CheckConfig {
        /// JSON configuration file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Rank {
            input,
            blocks_dir,
            config,
            top_k,
            timeout_ms,
            output,
            records,
            compact,
        }) => cmd_rank(
            &input,
            &blocks_dir,
            config.as_deref(),
            top_k,
            timeout_ms,
            output.as_deref(),
            records,
            compact,
        ),
        Some(Commands::Segment {
            input,
            config,
            json,
        }) => cmd_segment(&input, config.as_deref(), json),
        Some(Commands::CheckConfig { input }) => cmd_check_config(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!(
                "{}",
                "Usage: sectionrank rank <INPUT> --blocks-dir <DIR>".yellow()
            );
            println!("       sectionrank --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_options(config: Option<&Path>) -> Result<RankOptions, Box<dyn std::error::Error>> {
    match config {
        Some(path) => Ok(RankOptions::from_json_file(path)?),
        None => Ok(RankOptions::default()),
    }
}

/// Block file for an input document: `<blocks_dir>/<file stem>.json`.
fn blocks_path(blocks_dir: &Path, filename: &str) -> PathBuf {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    blocks_dir.join(format!("{}.json", stem))
}

#[allow(clippy::too_many_arguments)]
fn cmd_rank(
    input: &Path,
    blocks_dir: &Path,
    config: Option<&Path>,
    top_k: Option<usize>,
    timeout_ms: Option<u64>,
    output: Option<&Path>,
    records: bool,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let challenge = ChallengeInput::from_json_file(input)?;

    let mut options = load_options(config)?;
    if let Some(k) = top_k {
        options = options.with_top_k(k);
    }
    if let Some(ms) = timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }
    let pipeline = Pipeline::new(options)?;
    for warning in pipeline.warnings() {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }

    let sources: Vec<Arc<dyn BlockSource>> = challenge
        .documents
        .iter()
        .map(|doc| {
            let path = blocks_path(blocks_dir, &doc.filename);
            log::debug!("{} -> {}", doc.filename, path.display());
            Arc::new(JsonFileSource::new(&doc.filename, path)) as Arc<dyn BlockSource>
        })
        .collect();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Ranking {} documents...", sources.len()));

    let result = pipeline.run(&sources, &challenge.query());
    pb.finish_and_clear();

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = if records {
        to_json(&result, format)?
    } else {
        ChallengeReport::new(&result, challenge.filenames()).to_json(format)?
    };

    for excluded in result.excluded() {
        eprintln!(
            "{} {}: {}",
            "Excluded".yellow(),
            excluded.document_id,
            excluded.reason
        );
    }

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!(
            "{} {} ({} sections from {} documents in {} ms)",
            "Saved to".green(),
            path.display(),
            result.results.len(),
            result.stats.segmented_count,
            result.stats.elapsed_ms
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_segment(
    input: &Path,
    config: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config)?;
    let segmenter = Segmenter::new(&options.segment)?;

    let source = JsonFileSource::from_path(input);
    let sections = sectionrank::pipeline::segment_document(&segmenter, &source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    println!(
        "{} {} ({} sections)",
        "Document".cyan().bold(),
        source.document_id(),
        sections.len()
    );
    println!("{}", "─".repeat(40).dimmed());

    for (i, section) in sections.iter().enumerate() {
        let heading = section.heading_text.as_deref().unwrap_or("(no heading)");
        println!(
            "{:>3}. {} {}",
            i + 1,
            heading.bold(),
            format!(
                "p.{} conf {:.2} {:?} {} words",
                section.page_range,
                section.structural_confidence,
                section.kind,
                section.word_count()
            )
            .dimmed()
        );
    }

    Ok(())
}

fn cmd_check_config(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = RankOptions::from_json_file(input)?;
    options.validate()?;
    Segmenter::new(&options.segment)?;

    println!("{} {}", "Valid configuration:".green(), input.display());
    println!(
        "  weights   tfidf {} / bm25 {} / contextual {}",
        options.weights.tfidf, options.weights.bm25, options.weights.contextual
    );
    println!("  bm25      k1 {} / b {}", options.bm25.k1, options.bm25.b);
    println!("  top_k     {}", options.top_k);
    println!("  workers   {}", options.worker_count());
    match options.timeout_ms {
        Some(ms) => println!("  timeout   {} ms", ms),
        None => println!("  timeout   none"),
    }

    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "sectionrank".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Persona-driven section ranking tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/sectionrank".dimmed()
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_path_uses_file_stem() {
        let dir = Path::new("/data/blocks");
        assert_eq!(
            blocks_path(dir, "South of France - Cities.pdf"),
            PathBuf::from("/data/blocks/South of France - Cities.json")
        );
        assert_eq!(blocks_path(dir, "notes"), PathBuf::from("/data/blocks/notes.json"));
    }

    #[test]
    fn test_load_options() {
        assert_eq!(load_options(None).unwrap(), RankOptions::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"top_k": 7}"#).unwrap();
        assert_eq!(load_options(Some(&path)).unwrap().top_k, 7);
    }
}
