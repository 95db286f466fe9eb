// src/main.rs
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use futures::future;
use log::{debug, warn};

use genoview::banner;
use genoview::client::ApiClient;
use genoview::config::{AppConfig, RequestPreset, parse_output_types};
use genoview::credentials::CredentialStore;
use genoview::errors::{ClientError, Result};
use genoview::form::{FormState, Mode};
use genoview::models::{OntologySelection, search_reference_terms};
use genoview::orchestrator::Orchestrator;
use genoview::theme::ThemeStore;
use genoview::view::plot::PlotView;
use genoview::view::table::{ScoreTable, SortDir, SortKey};

/// Client for a genomic prediction API: interval prediction, variant effect
/// prediction and variant scoring.
#[derive(Parser, Debug)]
#[command(name = "genoview")]
#[command(version)]
#[command(about = "Configure genomic prediction requests and view the results")]
struct Cli {
    /// Override the API base URL (defaults to $GENOVIEW_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict regulatory tracks across a genomic interval
    Predict(PredictArgs),

    /// Predict the effect of a variant against its reference
    Variant(VariantArgs),

    /// Score a variant across tissues and output types
    Score(ScoreArgs),

    /// Run a request described in a TOML preset file
    Run {
        /// Path to the preset file
        preset: PathBuf,
    },

    /// Validate an API key against the server and store it
    SetKey {
        /// The key; prompted for on stdin when omitted
        key: Option<String>,
    },

    /// Remove the stored API key
    ClearKey,

    /// Fetch the output-type and ontology-term vocabularies
    Metadata,

    /// Look up tissue / cell line ontology terms
    Ontology {
        /// Substring to match against term names and codes
        #[arg(long)]
        search: Option<String>,

        /// Use the built-in reference list instead of the server
        #[arg(long)]
        offline: bool,
    },

    /// Show or set the colour theme preference (light, dark, system)
    Theme { value: Option<String> },

    /// Check server liveness
    Health,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Genomic interval, e.g. chr19:40991281-41018398
    #[arg(long)]
    interval: String,

    #[command(flatten)]
    common: CommonArgs,

    /// Ontology term codes (repeatable, at most 5), e.g. UBERON:0002048
    #[arg(long = "ontology")]
    ontology_terms: Vec<String>,
}

#[derive(Args, Debug)]
struct VariantArgs {
    /// Variant literal, e.g. chr22:36201698:A>C
    #[arg(long)]
    variant: String,

    #[command(flatten)]
    common: CommonArgs,

    /// Ontology term codes (repeatable, at most 5)
    #[arg(long = "ontology")]
    ontology_terms: Vec<String>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Variant literal, e.g. chr22:36201698:A>C
    #[arg(long)]
    variant: String,

    #[command(flatten)]
    common: CommonArgs,

    /// Filter rows by a case-insensitive substring
    #[arg(long)]
    filter: Option<String>,

    /// Sort column: gene or quantile, optionally :desc (e.g. quantile:desc)
    #[arg(long)]
    sort: Option<String>,

    /// Page of the score table to show (1-based)
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Output types, comma separated, e.g. RNA_SEQ,DNASE
    #[arg(long, value_delimiter = ',', default_value = "RNA_SEQ")]
    output_types: Vec<String>,
}

#[tokio::main]
async fn main() {
    // .env is optional for the CLI
    let _ = dotenvy::dotenv();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("❌ {}", e.surface());
        if matches!(e, ClientError::Unauthorized { .. }) {
            eprintln!("   The stored API key was cleared. Run `genoview set-key` to set a new one.");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }

    let credentials = CredentialStore::new(&config.data_dir);
    let theme_store = ThemeStore::new(&config.data_dir);
    debug!("theme preference: {}", theme_store.load());

    let client = ApiClient::new(&config.api_base, credentials.clone());

    match cli.command {
        Commands::Predict(args) => {
            let mut form = FormState::default();
            form.mode = Mode::Predict;
            form.interval = args.interval.parse()?;
            form.output_types = parse_output_types(&args.common.output_types)?;
            form.ontology = OntologySelection::from_codes(&args.ontology_terms)?;
            submit_and_render(&client, &form, None).await
        }
        Commands::Variant(args) => {
            let mut form = FormState::default();
            form.mode = Mode::Variant;
            form.variant = args.variant.parse()?;
            form.output_types = parse_output_types(&args.common.output_types)?;
            form.ontology = OntologySelection::from_codes(&args.ontology_terms)?;
            submit_and_render(&client, &form, None).await
        }
        Commands::Score(args) => {
            let mut form = FormState::default();
            form.mode = Mode::Score;
            form.variant = args.variant.parse()?;
            form.output_types = parse_output_types(&args.common.output_types)?;
            let opts = TableOpts {
                filter: args.filter,
                sort: args.sort.as_deref().map(parse_sort).transpose()?,
                page: args.page,
            };
            submit_and_render(&client, &form, Some(opts)).await
        }
        Commands::Run { preset } => {
            let form = RequestPreset::load(&preset)?.into_form()?;
            submit_and_render(&client, &form, None).await
        }
        Commands::SetKey { key } => {
            let key = match key {
                Some(k) => k,
                None => read_key_from_stdin()?,
            };
            client.submit_api_key(key.trim()).await?;
            println!("✅ API key validated and stored at {}", credentials.path().display());
            Ok(())
        }
        Commands::ClearKey => {
            credentials.clear()?;
            println!("Stored API key removed");
            Ok(())
        }
        Commands::Metadata => {
            banner::print_banner();
            let (output_types, terms) = future::try_join(
                client.fetch_output_types(),
                client.fetch_ontology_terms(None),
            )
            .await?;

            println!("Output types:");
            for ot in &output_types {
                println!("  {:<20} {}", ot.name, ot.description);
            }
            println!("\nOntology terms:");
            for term in &terms {
                println!("  {:<28} {:<16} {}", term.name, term.code, term.kind);
            }
            Ok(())
        }
        Commands::Ontology { search, offline } => {
            let terms = if offline {
                search_reference_terms(search.as_deref().unwrap_or(""))
            } else {
                match client.fetch_ontology_terms(search.as_deref()).await {
                    Ok(terms) => terms,
                    Err(e) if !e.received_response() => {
                        warn!("server unreachable, using the built-in reference list");
                        search_reference_terms(search.as_deref().unwrap_or(""))
                    }
                    Err(e) => return Err(e),
                }
            };
            if terms.is_empty() {
                println!("No matching terms");
            }
            for term in &terms {
                println!("{:<28} {:<16} {}", term.name, term.code, term.kind);
            }
            Ok(())
        }
        Commands::Theme { value } => {
            match value {
                Some(v) => {
                    let pref = v.parse()?;
                    theme_store.store(pref)?;
                    println!("Theme preference set to {}", pref);
                }
                None => println!("Theme preference: {}", theme_store.load()),
            }
            Ok(())
        }
        Commands::Health => {
            banner::print_banner();
            let health = client.check_health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            Ok(())
        }
    }
}

struct TableOpts {
    filter: Option<String>,
    sort: Option<(SortKey, SortDir)>,
    page: usize,
}

/// Submits the form through the orchestrator and renders the committed
/// result snapshot for the mode that ran.
async fn submit_and_render(
    client: &ApiClient,
    form: &FormState,
    table_opts: Option<TableOpts>,
) -> Result<()> {
    let mut orch = Orchestrator::new();
    orch.submit(client, form).await?;

    match form.mode {
        Mode::Score => {
            let mut table = ScoreTable::new(orch.results.scores.clone());
            if let Some(opts) = table_opts {
                if let Some(q) = &opts.filter {
                    table.set_filter(q);
                }
                if let Some((key, dir)) = opts.sort {
                    table.set_sort(key, dir);
                }
                table.set_page(opts.page.saturating_sub(1));
            }
            println!("{}", table.render(orch.results.variant.as_ref(), false));
        }
        Mode::Predict | Mode::Variant => {
            let view = PlotView {
                plot_urls: &orch.results.plot_urls,
                interval: orch.results.interval.as_ref(),
                variant: orch.results.variant.as_ref(),
                loading: false,
            };
            println!("{}", view.render(|p| client.plot_image_url(p)));
        }
    }
    Ok(())
}

fn parse_sort(s: &str) -> Result<(SortKey, SortDir)> {
    let (col, dir) = s.split_once(':').unwrap_or((s, "asc"));
    let key = match col.to_lowercase().as_str() {
        "gene" => SortKey::GeneName,
        "quantile" => SortKey::QuantileScore,
        other => {
            return Err(ClientError::InvalidInput(format!(
                "unknown sort column '{}' (expected gene or quantile)",
                other
            )));
        }
    };
    let dir = match dir.to_lowercase().as_str() {
        "asc" => SortDir::Asc,
        "desc" => SortDir::Desc,
        other => {
            return Err(ClientError::InvalidInput(format!(
                "unknown sort direction '{}' (expected asc or desc)",
                other
            )));
        }
    };
    Ok((key, dir))
}

fn read_key_from_stdin() -> Result<String> {
    print!("API key: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let key = line.trim().to_string();
    if key.is_empty() {
        return Err(ClientError::InvalidInput(
            "API key must not be empty".to_string(),
        ));
    }
    Ok(key)
}
