use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use seo_scribe::adapters::{ExportError, HttpPageFetcher, KeywordCsvFile, OllamaGenerator};
use seo_scribe::application::{
    AnalysisOutcome, ArticleWorkflow, SeoTasks, StageRun, StageUpdate, TaskError, TaskRun,
    TaskUpdate, WorkflowError,
};
use seo_scribe::config::{AppConfig, ConfigError, LoggingConfig};
use seo_scribe::domain::foundation::Percentage;
use seo_scribe::domain::keywords::split_keywords;
use seo_scribe::domain::tidy::Normalizer;
use seo_scribe::ports::{FetchError, TextGenerator};

#[derive(Parser, Debug)]
#[command(
    name = "seo-scribe",
    version,
    about = "Draft, humanize and tidy articles with a local Ollama model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a comma-separated keyword list for a topic
    Keywords(KeywordsArgs),
    /// Generate a meta title and a meta description for a topic
    Meta(MetaArgs),
    /// Draft an article, optionally humanizing and tidying it
    Article(ArticleArgs),
    /// Clean up an existing text without calling the model
    Tidy(TidyArgs),
    /// Fetch a page and review its on-page SEO
    Analyze(AnalyzeArgs),
    /// Chat with the model, one line per turn
    Chat,
}

#[derive(Parser, Debug)]
struct KeywordsArgs {
    /// Topic to research
    topic: String,

    /// Number of keywords to ask for
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Write the list as CSV to this file or directory
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct MetaArgs {
    /// Topic of the page
    topic: String,

    /// Maximum title length in characters
    #[arg(long, default_value_t = 60)]
    title_chars: u32,

    /// Maximum description length in characters
    #[arg(long, default_value_t = 160)]
    description_chars: u32,
}

#[derive(Parser, Debug)]
struct ArticleArgs {
    /// Idea or working title
    idea: String,

    /// Approximate length in tokens
    #[arg(long, default_value_t = 400)]
    tokens: u32,

    /// Rewrite the draft in a conversational register
    #[arg(long)]
    humanize: bool,

    /// Run the tidy pass on the final text
    #[arg(long)]
    tidy: bool,
}

#[derive(Parser, Debug)]
struct TidyArgs {
    /// File to clean; reads stdin when omitted
    file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Page URL (http or https)
    url: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A stream ended with an in-band error; the message is already user-facing.
    #[error("{0}")]
    Generation(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(2);
        }
    };
    init_tracing(&config.logging);

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<AppConfig, ConfigError> {
    let config = AppConfig::load()?;
    config.validate()?;
    Ok(config)
}

/// Logs go to stderr so stdout carries only generated text.
fn init_tracing(logging: &LoggingConfig) {
    if let Err(err) = install_subscriber(logging) {
        eprintln!("Logging disabled: {}", err);
    }
}

fn install_subscriber(
    logging: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<(), CliError> {
    if let Commands::Tidy(args) = &command {
        return tidy(args);
    }

    let generator = Arc::new(OllamaGenerator::new(config.backend.to_ollama_config()));
    let info = generator.backend_info();
    debug!(host = %info.host, model = %info.model, "Using generation backend");

    match command {
        Commands::Keywords(args) => keywords(generator, config, args).await,
        Commands::Meta(args) => meta(generator, config, args).await,
        Commands::Article(args) => article(generator, config, args).await,
        Commands::Analyze(args) => analyze(generator, config, args).await,
        Commands::Chat => chat(generator, config).await,
        Commands::Tidy(_) => Ok(()),
    }
}

fn seo_tasks(
    generator: Arc<OllamaGenerator>,
    config: &AppConfig,
) -> Result<SeoTasks<OllamaGenerator, HttpPageFetcher>, CliError> {
    let fetcher = HttpPageFetcher::new(config.fetch.to_fetcher_config())?;
    Ok(SeoTasks::new(generator, Arc::new(fetcher))
        .with_prompts(config.writing.prompt_builder())
        .with_page_max_chars(config.fetch.max_chars))
}

async fn keywords(
    generator: Arc<OllamaGenerator>,
    config: &AppConfig,
    args: KeywordsArgs,
) -> Result<(), CliError> {
    let tasks = seo_tasks(generator, config)?;
    let text = print_task(tasks.keywords(&args.topic, args.count)?).await?;
    let keywords = split_keywords(&text);
    eprintln!("{} keywords", keywords.len());

    if let Some(target) = args.csv {
        let path = KeywordCsvFile::new(target)
            .write(&args.topic, &keywords)
            .await?;
        info!(path = %path.display(), count = keywords.len(), "Keywords exported");
        eprintln!("Saved {}", path.display());
    }
    Ok(())
}

async fn meta(
    generator: Arc<OllamaGenerator>,
    config: &AppConfig,
    args: MetaArgs,
) -> Result<(), CliError> {
    let tasks = seo_tasks(generator, config)?;

    eprintln!("Meta title:");
    print_task(tasks.meta_title(&args.topic, args.title_chars)?).await?;
    eprintln!("Meta description:");
    print_task(tasks.meta_description(&args.topic, args.description_chars)?).await?;
    Ok(())
}

async fn article(
    generator: Arc<OllamaGenerator>,
    config: &AppConfig,
    args: ArticleArgs,
) -> Result<(), CliError> {
    let mut workflow =
        ArticleWorkflow::new(generator).with_prompts(config.writing.prompt_builder());

    print_stage(workflow.generate_draft(&args.idea, args.tokens)?).await?;

    if args.humanize {
        eprintln!("--- Humanized ---");
        print_stage(workflow.humanize()?).await?;
    }

    if args.tidy {
        eprintln!("--- Tidied ---");
        let article = workflow.tidy()?;
        println!("{}", article.content());
    }
    Ok(())
}

fn tidy(args: &TidyArgs) -> Result<(), CliError> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    println!("{}", Normalizer::default().normalize(&text));
    Ok(())
}

async fn analyze(
    generator: Arc<OllamaGenerator>,
    config: &AppConfig,
    args: AnalyzeArgs,
) -> Result<(), CliError> {
    let tasks = seo_tasks(generator, config)?;
    let outcome = tasks
        .analyze_page(&args.url, |phase, progress| {
            eprintln!("[{:>4}] {}", progress.to_string(), phase);
        })
        .await?;

    match outcome {
        AnalysisOutcome::Failed(message) => Err(CliError::Generation(message)),
        outcome => {
            println!("{}", outcome.message());
            Ok(())
        }
    }
}

async fn chat(generator: Arc<OllamaGenerator>, config: &AppConfig) -> Result<(), CliError> {
    let tasks = seo_tasks(generator, config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Type a message, or 'exit' to quit.");
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        // A failed turn is shown and the session goes on.
        if let Err(err) = print_task(tasks.chat_turn(line)?).await {
            eprintln!("{}", err);
        }
    }
    Ok(())
}

/// Progress lines for stderr, at most one per ten percent plus the final one.
struct ProgressMeter {
    label: String,
    last_step: Option<u8>,
}

impl ProgressMeter {
    fn new(label: impl ToString) -> Self {
        Self {
            label: label.to_string(),
            last_step: None,
        }
    }

    /// The line to show for `progress`, if it moved far enough.
    fn line(&mut self, progress: Percentage, terminal: bool) -> Option<String> {
        let step = progress.value() / 10;
        if !terminal && self.last_step == Some(step) {
            return None;
        }
        self.last_step = Some(step);
        Some(format!("[{:>4}] {}", progress.to_string(), self.label))
    }

    fn show(&mut self, progress: Percentage, terminal: bool) {
        if let Some(line) = self.line(progress, terminal) {
            eprintln!("{}", line);
        }
    }
}

/// Streams a task to stdout and returns the full text. Progress goes to stderr.
async fn print_task(mut run: TaskRun) -> Result<String, CliError> {
    let mut stdout = io::stdout();
    let mut meter = ProgressMeter::new(run.task());
    while let Some(update) = run.next().await {
        match update {
            TaskUpdate::Partial { delta, progress } => {
                write!(stdout, "{}", delta)?;
                stdout.flush()?;
                debug!(progress = %progress, "Token received");
                meter.show(progress, false);
            }
            TaskUpdate::Completed { text, progress } => {
                writeln!(stdout)?;
                meter.show(progress, true);
                return Ok(text);
            }
            TaskUpdate::Failed { message, progress } => {
                writeln!(stdout)?;
                meter.show(progress, true);
                return Err(CliError::Generation(message));
            }
        }
    }
    Ok(run.partial_text().to_string())
}

/// Streams a workflow stage to stdout.
async fn print_stage<G>(mut run: StageRun<'_, G>) -> Result<(), CliError>
where
    G: TextGenerator + ?Sized,
{
    let mut stdout = io::stdout();
    let mut meter = ProgressMeter::new(run.stage());
    while let Some(update) = run.next().await {
        match update {
            StageUpdate::Partial { delta, progress } => {
                write!(stdout, "{}", delta)?;
                stdout.flush()?;
                debug!(progress = %progress, "Token received");
                meter.show(progress, false);
            }
            StageUpdate::Completed { progress, .. } => {
                writeln!(stdout)?;
                meter.show(progress, true);
                return Ok(());
            }
            StageUpdate::Failed { message, progress } => {
                writeln!(stdout)?;
                meter.show(progress, true);
                return Err(CliError::Generation(message));
            }
        }
    }
    Ok(())
}
