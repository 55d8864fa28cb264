mod browser;
mod config;
mod entry;
mod filter;
mod fold;
mod loader;
mod logging;
mod render;
mod ui;

use std::convert::TryFrom;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use browser::{Browser, View};
use config::Config;
use filter::Letter;
use render::Highlighted;

#[derive(Parser, Debug)]
#[command(name = "kotoba", about = "Browse a JSON word list by letter and search")]
struct Cli {
    /// Configuration file (default: ~/.config/kotoba/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Dataset location, a file path or an http(s) URL
    #[arg(long, global = true, value_name = "PATH|URL")]
    source: Option<String>,

    /// Seed for the first-load random sample
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter entries by letter and query and print the visible cards
    Query(QueryArgs),
    /// Print the random sample shown on first load
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Case-insensitive literal text matched against names and tags
    #[arg(default_value = "")]
    query: String,

    /// Only entries whose name starts with this letter (A-Z)
    #[arg(long)]
    letter: Option<char>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Sample size (default: sample_size from the configuration)
    #[arg(long)]
    count: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&logging::LoggingConfig::from_env(cli.debug))?;

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(source) = cli.source.as_deref() {
        config.source = config::parse_source(source);
    }
    if let Some(path) = &config.config_path {
        tracing::debug!(path = %path.display(), "configuration loaded");
    }

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Some(Command::Query(args)) => handle_query(args, &config, rng),
        Some(Command::Sample(args)) => handle_sample(args, &config, rng),
        None => {
            let mut app = ui::app::App::new(&config, rng);
            app.run()
        }
    }
}

fn load_browser(config: &Config, sample_size: usize, mut rng: StdRng) -> Result<Browser> {
    let entries = loader::load(&config.source, &config.fields)
        .with_context(|| format!("Failed to load {}", config.source))?;

    let mut browser = Browser::new(config.details_url.clone());
    browser.finish_load(Ok(entries), &config.source.to_string(), sample_size, &mut rng);
    Ok(browser)
}

fn handle_query(args: QueryArgs, config: &Config, rng: StdRng) -> Result<()> {
    let letter = match args.letter {
        Some(c) => match Letter::try_from(c) {
            Ok(letter) => Some(letter),
            Err(c) => bail!("--letter expects a letter from A to Z, got '{}'", c),
        },
        None => None,
    };

    let mut browser = load_browser(config, 0, rng)?;
    if let Some(letter) = letter {
        browser.toggle_letter(letter);
    }
    browser.set_query(&args.query);

    print_view(&browser.view(), args.format)
}

fn handle_sample(args: SampleArgs, config: &Config, rng: StdRng) -> Result<()> {
    let count = args.count.unwrap_or(config.sample_size);
    if count == 0 {
        bail!("sample size must be at least 1");
    }

    let browser = load_browser(config, count, rng)?;
    print_view(&browser.view(), args.format)
}

#[derive(Serialize)]
struct JsonView<'a> {
    summary: &'a str,
    count: usize,
    results: Vec<JsonCard<'a>>,
}

#[derive(Serialize)]
struct JsonCard<'a> {
    name: String,
    description: &'a str,
    tags: Vec<String>,
    details_url: &'a str,
    highlight: &'a Highlighted,
}

fn print_view(view: &View, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", view.summary);
            // name<TAB>description<TAB>tags<TAB>details link
            for card in &view.cards {
                let tags: Vec<String> = card.tags.iter().map(Highlighted::plain).collect();
                println!(
                    "{}\t{}\t{}\t{}",
                    card.name.plain(),
                    if card.description.is_empty() { " " } else { card.description.as_str() },
                    tags.join(", "),
                    card.details_url
                );
            }
        }
        OutputFormat::Html => {
            println!(
                "<p class=\"summary\">{}</p>",
                render::escape_html(&view.summary)
            );
            if view.is_empty() {
                println!(
                    "<p id=\"no-results\">{}</p>",
                    render::escape_html(render::NO_RESULTS)
                );
            }
            for card in &view.cards {
                print!("{}", card.to_html());
            }
        }
        OutputFormat::Json => {
            let output = JsonView {
                summary: &view.summary,
                count: view.cards.len(),
                results: view
                    .cards
                    .iter()
                    .map(|card| JsonCard {
                        name: card.name.plain(),
                        description: &card.description,
                        tags: card.tags.iter().map(Highlighted::plain).collect(),
                        details_url: &card.details_url,
                        highlight: &card.name,
                    })
                    .collect(),
            };
            let json = serde_json::to_string_pretty(&output).context("failed to encode results")?;
            println!("{}", json);
        }
    }
    Ok(())
}
