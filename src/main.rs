use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use inboxlens::config::{
    self, AnalyzerConfig, DEFAULT_BATCH_WORKERS, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_EMAILS,
    DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS,
};
use inboxlens::pipeline::analysis::{validate_model_name, EmailAnalyzer, LlmClient, OllamaClient};
use inboxlens::pipeline::batch::{load_email_inputs, BatchRunner, InputFormat, JsonlSink};

#[derive(Debug, Parser)]
#[command(
    name = "inboxlens",
    version,
    about = "Classify business emails with a local Ollama model"
)]
struct Cli {
    #[command(flatten)]
    analyzer: AnalyzerArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct AnalyzerArgs {
    /// Ollama model name
    #[arg(long, global = true, env = "INBOXLENS_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Ollama base URL (loopback only)
    #[arg(long, global = true, env = "INBOXLENS_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Accept an analysis once confidence/100 reaches this value
    #[arg(long, global = true, env = "INBOXLENS_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    threshold: f64,

    /// Extra model calls allowed when confidence is low
    #[arg(long, global = true, env = "INBOXLENS_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, global = true, env = "INBOXLENS_RETRY_DELAY_MS", default_value_t = 1000)]
    retry_delay_ms: u64,

    /// Sampling temperature
    #[arg(long, global = true, env = "INBOXLENS_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Cap on generated tokens (model default when unset)
    #[arg(long, global = true, env = "INBOXLENS_MAX_TOKENS")]
    max_tokens: Option<i32>,

    /// HTTP timeout per model call, in seconds
    #[arg(long, global = true, env = "INBOXLENS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl AnalyzerArgs {
    fn to_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            model: self.model.clone(),
            ollama_url: self.ollama_url.clone(),
            confidence_threshold: self.threshold,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze one email and print the record as JSON
    Analyze {
        /// Email text (reads stdin when neither --text nor --file is given)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// File containing the email text
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Analyze a JSONL or CSV file of emails with date and body fields
    Batch {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        /// Input layout: jsonl or csv (from the file extension when unset)
        #[arg(long)]
        format: Option<InputFormat>,

        /// JSONL results file
        #[arg(long, value_name = "FILE")]
        output: PathBuf,

        /// Parallel analyses
        #[arg(long, env = "INBOXLENS_WORKERS", default_value_t = DEFAULT_BATCH_WORKERS)]
        workers: usize,

        /// Stop after this many emails
        #[arg(long, default_value_t = DEFAULT_MAX_EMAILS)]
        max_emails: usize,

        /// Append to the output file instead of replacing it
        #[arg(long)]
        append: bool,
    },

    /// List installed Ollama models
    Models,
}

fn main() -> Result<()> {
    inboxlens::init_tracing();
    let cli = Cli::parse();
    let config = cli.analyzer.to_config();

    match cli.command {
        Command::Analyze { text, file } => run_analyze(config, text, file),
        Command::Batch {
            input,
            format,
            output,
            workers,
            max_emails,
            append,
        } => run_batch(config, &input, format, &output, workers, max_emails, append),
        Command::Models => run_models(&config),
    }
}

fn run_analyze(config: AnalyzerConfig, text: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let email = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read email from stdin")?;
            buf
        }
    };

    let analyzer = EmailAnalyzer::from_config(config).context("Invalid analyzer configuration")?;
    let record = analyzer.analyze(&email).context("Analysis failed")?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_batch(
    config: AnalyzerConfig,
    input: &std::path::Path,
    format: Option<InputFormat>,
    output: &std::path::Path,
    workers: usize,
    max_emails: usize,
    append: bool,
) -> Result<()> {
    let inputs = load_email_inputs(input, format, max_emails)
        .with_context(|| format!("Failed to load emails from {}", input.display()))?;

    let sink = if append {
        JsonlSink::append(output)
    } else {
        JsonlSink::create(output)
    }
    .with_context(|| format!("Failed to open {}", output.display()))?;

    let analyzer = EmailAnalyzer::from_config(config).context("Invalid analyzer configuration")?;
    let runner = BatchRunner::new(Box::new(analyzer), Box::new(sink), workers)
        .context("Failed to start batch runner")?;

    let report = runner.run(&inputs);
    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    Ok(())
}

fn run_models(config: &AnalyzerConfig) -> Result<()> {
    validate_model_name(&config.model).context("Invalid model name")?;
    let client = OllamaClient::new(&config.ollama_url, config.timeout_secs)
        .context("Invalid Ollama URL")?;
    let models = client
        .list_model_info()
        .with_context(|| format!("Failed to list models at {}", client.base_url()))?;

    if models.is_empty() {
        println!("No models installed at {}", client.base_url());
    }
    for model in &models {
        println!(
            "{:<40} {:>8.1} GB  {}",
            model.name,
            model.size as f64 / 1e9,
            model.modified_at.as_deref().unwrap_or("-")
        );
    }

    let installed = client
        .is_model_available(&config.model)
        .with_context(|| format!("Failed to check model at {}", client.base_url()))?;
    println!(
        "{} model '{}': {}",
        config::APP_NAME,
        config.model,
        if installed { "installed" } else { "not installed" }
    );
    Ok(())
}
