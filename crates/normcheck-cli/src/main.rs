use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use normcheck_core::Norm;
use normcheck_core::config_file::{self, ConfigFile, DEFAULT_GROBID_URL};
use normcheck_grobid::GrobidClient;
use normcheck_ingest::{IngestError, TextExtractor, analyze_file};
use normcheck_parsing::{NormAnalyzer, ParsingConfigBuilder};

mod output;

use output::ColorMode;

/// Academic citation norm checker - Evaluate APA and IEEE references in theses and papers
#[derive(Parser, Debug)]
#[command(name = "normcheck", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (default: ./.normcheck.toml over the platform config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a PDF, Word or text document against a citation norm
    Analyze {
        /// Path to the document
        file_path: PathBuf,

        /// Norm to evaluate (apa or ieee); detected from the references when omitted
        #[arg(long)]
        norm: Option<Norm>,

        /// Base URL of the GROBID server
        #[arg(long)]
        grobid_url: Option<String>,

        /// GROBID request timeout in seconds
        #[arg(long)]
        grobid_timeout: Option<u64>,

        /// Directory to write the plain-text report into
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Print the result as JSON instead of the console summary
        #[arg(long)]
        json: bool,

        /// Path to output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Detect the dominant citation style of a document's reference list
    Classify {
        /// Path to the document
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Check one citation against a norm's grammar
    CheckCitation {
        /// Norm to check against (apa or ieee)
        #[arg(long)]
        norm: Norm,

        /// Citation text, e.g. "(García, 2020)" or "[3]"
        citation: String,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = match &cli.config {
        Some(path) => config_file::load_from_path(path)
            .with_context(|| format!("could not load config file {}", path.display()))?,
        None => config_file::load_config(),
    };

    match cli.command {
        Command::Analyze {
            file_path,
            norm,
            grobid_url,
            grobid_timeout,
            report_dir,
            json,
            output,
            no_color,
        } => {
            analyze(
                &file_config,
                file_path,
                norm,
                grobid_url,
                grobid_timeout,
                report_dir,
                json,
                output,
                no_color,
            )
            .await
        }
        Command::Classify {
            file_path,
            no_color,
        } => classify(&file_config, file_path, no_color).await,
        Command::CheckCitation {
            norm,
            citation,
            no_color,
        } => {
            let verdict = NormAnalyzer::new().check_citation(norm, &citation);
            let mut stdout = std::io::stdout();
            output::print_verdict(&mut stdout, &verdict, ColorMode(!no_color))?;
            if !verdict.is_valid {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn build_analyzer(file_config: &ConfigFile) -> anyhow::Result<NormAnalyzer> {
    let mut builder = ParsingConfigBuilder::new();
    if let Some(overrides) = &file_config.parsing {
        builder = builder.apply_overrides(overrides);
    }
    let config = builder.build().context("invalid [parsing] configuration")?;
    Ok(NormAnalyzer::with_config(config))
}

#[allow(clippy::too_many_arguments)]
async fn analyze(
    file_config: &ConfigFile,
    file_path: PathBuf,
    norm: Option<Norm>,
    grobid_url: Option<String>,
    grobid_timeout: Option<u64>,
    report_dir: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let grobid_url = grobid_url
        .or_else(|| std::env::var("GROBID_URL").ok())
        .or_else(|| file_config.grobid_url().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_GROBID_URL.to_string());
    let grobid_timeout = grobid_timeout
        .or_else(|| {
            std::env::var("GROBID_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or_else(|| file_config.grobid_timeout_secs());

    let use_color = !no_color && output.is_none() && !json;
    let color = ColorMode(use_color);

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    let extractor = TextExtractor::new();
    let parser = GrobidClient::new(grobid_url).with_timeout(Duration::from_secs(grobid_timeout));
    let analyzer = build_analyzer(file_config)?;

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    tracing::debug!(grobid = parser.base_url(), "analyzing {}", file_path.display());
    let analysis =
        match analyze_file(&file_path, norm, &extractor, &parser, &analyzer, &cancel).await {
            Ok(analysis) => analysis,
            Err(IngestError::Cancelled) => {
                eprintln!("Cancelled.");
                std::process::exit(130);
            }
            Err(e) => return Err(e).with_context(|| format!("{}", file_path.display())),
        };

    let report_path = match report_dir {
        Some(dir) => Some(
            normcheck_reporting::write_text_report(
                &analysis.result,
                &analysis.file_name,
                &dir,
                chrono::Local::now().naive_local(),
            )
            .with_context(|| format!("could not write report into {}", dir.display()))?,
        ),
        None => None,
    };

    if json {
        writeln!(writer, "{}", normcheck_reporting::export_json(&analysis.result)?)?;
    } else {
        output::print_analysis(&mut writer, &analysis, report_path.as_deref(), color)?;
    }
    Ok(())
}

async fn classify(
    file_config: &ConfigFile,
    file_path: PathBuf,
    no_color: bool,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    let analyzer = build_analyzer(file_config)?;
    let text = TextExtractor::new()
        .extract_text_blocking(&file_path)
        .await
        .with_context(|| format!("{}", file_path.display()))?;

    let entries = analyzer.extract_entries(&text);
    let classification = analyzer.classify(&entries, &[]);

    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut stdout = std::io::stdout();
    output::print_classification(
        &mut stdout,
        &name,
        entries.len(),
        &classification,
        ColorMode(!no_color),
    )?;
    Ok(())
}
