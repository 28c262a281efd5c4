//! LinkKit CLI - Command-line interface for enriching links

use clap::{Parser, Subcommand, ValueEnum};
use linkkit::{
    process_email, query_links, EnrichError, EnrichRequest, EnrichedLink, Enricher, InboundEmail,
    JsonFileStore, LinkOrigin, LinkQuery, LinkStore, OpenAiClient, OpenAiConfig, SortOrder,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Library file used when `--store` is not given
const DEFAULT_STORE_FILE: &str = "linkkit-links.json";

/// Owner recorded for links saved from the command line
const DEFAULT_OWNER: &str = "local";

/// Output format for enrich subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// LinkKit - fetch a page, then summarize and categorize it
#[derive(Parser, Debug)]
#[command(name = "linkkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding saved links
    #[arg(long, global = true, default_value = DEFAULT_STORE_FILE)]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enrich a URL, save it and print the result
    Enrich {
        /// URL to enrich
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// Completion model (overrides LINKKIT_MODEL)
        #[arg(long)]
        model: Option<String>,

        /// Owner the link is saved for
        #[arg(long, default_value = DEFAULT_OWNER)]
        owner: String,

        /// Print the result without saving it
        #[arg(long)]
        no_save: bool,
    },
    /// Save every link found in an email body read from stdin
    Inbox {
        /// Sender address; links are saved for this owner
        #[arg(long)]
        from: String,

        /// Email subject
        #[arg(long)]
        subject: Option<String>,

        /// Completion model (overrides LINKKIT_MODEL)
        #[arg(long)]
        model: Option<String>,
    },
    /// List saved links as JSON
    List {
        /// Owner whose links are listed
        #[arg(long, default_value = DEFAULT_OWNER)]
        owner: String,

        /// Case-insensitive text to look for in title, URL and summary
        #[arg(long, default_value = "")]
        search: String,

        /// Only links in this category (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Sort order: newest, oldest or title
        #[arg(long, default_value = "newest")]
        sort: SortOrder,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Links per page
        #[arg(long, default_value_t = linkkit::library::DEFAULT_PER_PAGE)]
        per_page: usize,
    },
    /// Print the input and output JSON schemas
    Schema,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Enrich {
            url,
            output,
            user_agent,
            model,
            owner,
            no_save,
        } => {
            let enricher = build_enricher(model, user_agent);
            let store = open_store(&cli.store).await;
            let save_for = (!no_save).then_some(owner.as_str());
            let link = enrich_and_save(&enricher, &url, save_for, &store)
                .await
                .unwrap_or_else(|e| fail(&e));

            match output {
                OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(&link)),
                OutputFormat::Json => print_json(&link),
            }
        }
        Commands::Inbox {
            from,
            subject,
            model,
        } => {
            run_inbox(&cli.store, from, subject, model).await;
        }
        Commands::List {
            owner,
            search,
            categories,
            sort,
            page,
            per_page,
        } => {
            let query = LinkQuery {
                search,
                categories,
                sort,
                page,
                per_page,
            };
            let store = open_store(&cli.store).await;
            let links = store.list(&owner).await.unwrap_or_else(|e| fail(&e));
            print_json(&query_links(&links, &query));
        }
        Commands::Schema => run_schema(),
    }
}

fn build_enricher(model: Option<String>, user_agent: Option<String>) -> Enricher {
    let mut config = OpenAiConfig::from_env().unwrap_or_else(|e| fail(&e));
    if let Some(model) = model {
        config = config.with_model(model);
    }
    let client = OpenAiClient::new(config).unwrap_or_else(|e| fail(&e));

    let mut builder = Enricher::builder(Arc::new(client));
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    builder.build()
}

async fn open_store(path: &Path) -> JsonFileStore {
    JsonFileStore::open(path).await.unwrap_or_else(|e| fail(&e))
}

/// Enrich `url` and, when `save_for` names an owner, store it for them
///
/// The enriched record is returned either way, so the printed output does
/// not depend on whether it was saved.
async fn enrich_and_save(
    enricher: &Enricher,
    url: &str,
    save_for: Option<&str>,
    store: &dyn LinkStore,
) -> Result<EnrichedLink, EnrichError> {
    let link = enricher.enrich(EnrichRequest::new(url)).await?;

    if let Some(owner) = save_for {
        let saved = store
            .insert(owner, &link, LinkOrigin::Web)
            .await
            .map_err(EnrichError::Store)?;
        info!(id = %saved.id, owner, "Saved link");
    }

    Ok(link)
}

async fn run_inbox(
    store_path: &Path,
    from: String,
    subject: Option<String>,
    model: Option<String>,
) {
    let mut text = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut text).await {
        fail(&format!("reading email from stdin: {e}"));
    }

    let enricher = build_enricher(model, None);
    let store = open_store(store_path).await;
    let email = InboundEmail {
        from: from.clone(),
        subject,
        text,
    };

    let results = process_email(&enricher, &email, &from, &store).await;
    print_json(&results);
}

fn run_schema() {
    print_json(&serde_json::json!({
        "input": linkkit::schema_of::<EnrichRequest>(),
        "output": linkkit::schema_of::<EnrichedLink>(),
    }));
}

/// Format an enriched link as markdown with YAML frontmatter
fn format_md_with_frontmatter(link: &EnrichedLink) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", link.source_url));
    output.push_str(&format!("title: {}\n", link.title));
    output.push_str(&format!("categories: [{}]\n", link.categories.join(", ")));
    output.push_str("---\n");

    output.push_str(&format!("# {}\n\n", link.title));
    output.push_str(&link.summary);
    if !link.body_text.is_empty() {
        output.push_str("\n\n");
        output.push_str(&link.body_text);
    }

    output
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    });
    writeln_safe(&json);
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
