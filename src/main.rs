//! hnfeed - Hacker News top stories from the command line
//!
//! Prints one page of the current top stories, resolved through an in-memory
//! cache, or keeps the page refreshed on an interval with `--watch`.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hnfeed::aggregate::{TopStories, TopStoriesKey};
use hnfeed::cache::MemoryStore;
use hnfeed::cli::{Cli, OutputFormat, StartupConfig};
use hnfeed::data::{format_age, HackerNewsClient, Item, ItemId};
use hnfeed::page::{paginate, Page, PageRequest};
use hnfeed::refresh::{RefreshConfig, RefreshHandle, RefreshMessage};

/// Sets up logging to stderr so stdout only carries the rendered page
fn init_logging(verbose: bool) {
    let filter = if verbose {
        "hnfeed=debug,info"
    } else {
        "hnfeed=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Writes one story in the numbered listing format
fn render_item(out: &mut impl Write, rank: usize, item: &Item) -> io::Result<()> {
    match item.domain() {
        Some(domain) => writeln!(out, "{:>3}. {} ({})", rank, item.title, domain)?,
        None => writeln!(out, "{:>3}. {}", rank, item.title)?,
    }

    let age = item
        .posted_at()
        .map(|posted| format_age(posted, Utc::now()))
        .unwrap_or_else(|| "unknown".to_string());
    writeln!(
        out,
        "     {} points by {} {} | {} comments",
        item.score,
        item.by.as_deref().unwrap_or("unknown"),
        age,
        item.descendants
    )
}

/// Renders a page in the requested output format
fn render_page(
    out: &mut impl Write,
    page: &Page,
    request: &PageRequest,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, page)?;
            writeln!(out)
        }
        OutputFormat::Text => {
            if page.items.is_empty() {
                return writeln!(out, "No stories on page {} ({} total)", request.page, page.total_count);
            }
            let first = page.first_rank(request);
            for (offset, item) in page.items.iter().enumerate() {
                render_item(out, first + offset, item)?;
            }
            writeln!(
                out,
                "\nPage {} | {} stories total",
                request.page, page.total_count
            )
        }
    }
}

/// Handles one message from the refresh task, redrawing on fresh stories
fn render_message(
    out: &mut impl Write,
    message: RefreshMessage,
    config: &StartupConfig,
) -> io::Result<()> {
    match message {
        RefreshMessage::RefreshStarted => {
            debug!("refreshing top stories");
            Ok(())
        }
        RefreshMessage::StoriesUpdated(items) => {
            let page = paginate(items, &config.page);
            if config.output == OutputFormat::Text {
                writeln!(out, "\n--- {} ---", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
            }
            render_page(out, &page, &config.page, config.output)?;
            out.flush()
        }
        RefreshMessage::RefreshCompleted => {
            debug!("refresh complete");
            Ok(())
        }
    }
}

/// Keeps re-rendering the page until Ctrl-C
async fn watch(stories: Arc<TopStories>, config: &StartupConfig) -> io::Result<()> {
    let interval = config.watch.unwrap_or(RefreshConfig::default().interval);
    let mut handle = RefreshHandle::spawn(
        stories,
        RefreshConfig {
            interval,
            enabled: true,
        },
    );
    info!(interval_secs = interval.as_secs(), "watching top stories, press Ctrl-C to stop");

    loop {
        tokio::select! {
            message = handle.recv() => match message {
                Some(message) => render_message(&mut io::stdout().lock(), message, config)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Validate before touching the network
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    init_logging(config.verbose);

    let client = HackerNewsClient::new(&config.client)?;
    let stories = Arc::new(TopStories::new(
        Arc::new(client),
        Arc::new(MemoryStore::<TopStoriesKey, Vec<ItemId>>::new()),
        Arc::new(MemoryStore::<ItemId, Item>::new()),
        config.aggregator.clone(),
    ));

    if config.watch.is_some() {
        watch(stories, &config).await?;
        return Ok(());
    }

    let items = stories.top_items().await;
    let page = paginate(items, &config.page);
    let mut stdout = io::stdout().lock();
    render_page(&mut stdout, &page, &config.page, config.output)?;
    stdout.flush()?;

    Ok(())
}
