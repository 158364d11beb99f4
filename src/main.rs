use anyhow::{bail, Context, Result};
use aops_hints::{
    aops::{print_url, AopsScraperBuilder, AopsThread, DEFAULT_POST_SELECTOR},
    extract::ClassMatch,
    gemini::{GeminiClient, GeminiModel},
    problem::Problem,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aops-hints", version)]
#[command(about = "Scrape AoPS problem statements and request hints for them")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the problem statement of one or more forum threads
    Scrape {
        #[command(flatten)]
        source: ThreadArgs,

        /// Print the scraped threads as JSON
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask Gemini for structured hints on a problem
    Hints {
        /// Problem statement text
        #[arg(long, conflicts_with_all = ["input", "urls", "topics"])]
        statement: Option<String>,

        /// Read the problem statement from a file
        #[arg(long, conflicts_with_all = ["urls", "topics"])]
        input: Option<PathBuf>,

        // scraped when neither text nor file is given
        #[command(flatten)]
        source: ThreadArgs,

        /// Problem id placed in the requested shape
        #[arg(long, default_value_t = 1)]
        id: u32,

        #[arg(long, default_value = "gemini-2.5-flash")]
        model: GeminiModel,

        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(long)]
        temperature: Option<f32>,

        /// Print the prompt without calling the API
        #[arg(long)]
        dry_run: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, ClapArgs)]
struct ThreadArgs {
    /// Thread URL (repeatable)
    #[arg(long = "url")]
    urls: Vec<String>,

    /// Community topic id such as c6h3107339p28104298 (repeatable)
    #[arg(long = "topic")]
    topics: Vec<String>,

    /// CSS selector for post containers
    #[arg(long, default_value = DEFAULT_POST_SELECTOR)]
    selector: String,

    #[arg(long, default_value = "exact")]
    class_match: ClassMatch,
}

impl ThreadArgs {
    fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.topics.is_empty()
    }

    async fn scrape(&self) -> Result<Vec<AopsThread>> {
        if self.is_empty() {
            bail!("no thread given, pass --url or --topic");
        }

        let urls = self
            .urls
            .iter()
            .cloned()
            .chain(self.topics.iter().map(|t| print_url(t)))
            .collect::<Vec<_>>();

        let scraper = AopsScraperBuilder::default()
            .urls(urls)
            .post_selector(self.selector.as_str())
            .class_match(self.class_match)
            .build()?;

        scraper.scrape().await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("aops_hints=info".parse()?),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Scrape {
            source,
            json,
            output,
        } => {
            let threads = source.scrape().await?;
            let content = if json {
                serde_json::to_string_pretty(&threads)?
            } else {
                AopsThread::combine(&threads)
            };
            emit(&content, output)?;
        }
        Command::Hints {
            statement,
            input,
            source,
            id,
            model,
            api_key,
            temperature,
            dry_run,
            output,
        } => {
            let statement = match statement_source(statement, input, &source)? {
                StatementSource::Text(text) => text,
                StatementSource::File(path) => fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                StatementSource::Threads => AopsThread::combine(&source.scrape().await?),
            };
            let problem = Problem::shape(id, statement.trim());

            let Some(api_key) = resolve_api_key(api_key, dry_run)? else {
                return emit(&problem.prompt()?, output);
            };
            let mut client = GeminiClient::new(api_key, model);
            if let Some(temperature) = temperature {
                client = client.with_temperature(temperature);
            }

            info!("waiting on {model}");
            let response = client.request_hints(&problem).await?;
            emit(&response, output)?;
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum StatementSource {
    Text(String),
    File(PathBuf),
    Threads,
}

/// Explicit text wins over a file, a file wins over scraping.
fn statement_source(
    statement: Option<String>,
    input: Option<PathBuf>,
    threads: &ThreadArgs,
) -> Result<StatementSource> {
    match (statement, input) {
        (Some(text), _) => Ok(StatementSource::Text(text)),
        (None, Some(path)) => Ok(StatementSource::File(path)),
        (None, None) if !threads.is_empty() => Ok(StatementSource::Threads),
        (None, None) => bail!("no problem given, pass --statement, --input, --url or --topic"),
    }
}

/// `None` means a dry run: only the prompt is printed, so no key is needed.
fn resolve_api_key(api_key: Option<String>, dry_run: bool) -> Result<Option<String>> {
    if dry_run {
        return Ok(None);
    }
    match api_key {
        Some(key) => Ok(Some(key)),
        None => bail!("missing API key, pass --api-key or set GEMINI_API_KEY"),
    }
}

fn emit(content: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "written");
        }
        None => println!("{}", content),
    }
    Ok(())
}
