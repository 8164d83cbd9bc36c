//! Commit News - a dashboard of new commits across monitored repositories
//!
//! # Usage
//! ```bash
//! commit-news add --store news.json --name demo --url https://github.com/acme/demo --path ~/src/demo
//! commit-news serve --store news.json              # Start the backend
//! commit-news render --server http://127.0.0.1:3002 --output news.html
//! commit-news toggle --server http://127.0.0.1:3002 --check r0-c1-chb --uncheck r1-c0-chb
//! ```

mod client;
mod dashboard;
mod error;
mod git;
mod models;
mod routes;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use client::HttpBackend;
use dashboard::Dashboard;
use routes::AppState;
use store::RepoStore;

/// Commit News - see what changed in the repositories you follow
#[derive(Parser)]
#[command(name = "commit-news")]
#[command(about = "A dashboard of unviewed commits across repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the news backend
    Serve {
        /// JSON file holding monitored repositories and viewed state
        #[arg(short, long, value_name = "FILE")]
        store: PathBuf,

        /// Port to run the server on
        #[arg(short, long, default_value = "3002")]
        port: u16,

        /// Most commits walked per repository on each news request
        #[arg(long, default_value = "100")]
        history_limit: usize,
    },
    /// Register a repository to monitor
    Add {
        #[arg(short, long, value_name = "FILE")]
        store: PathBuf,

        /// Display name
        #[arg(long)]
        name: String,

        /// Web URL; commit links are `<URL>/commit/<sha>`
        #[arg(long)]
        url: String,

        /// Local clone to read history from
        #[arg(long, value_name = "DIR")]
        path: PathBuf,
    },
    /// Load the news and write the dashboard as an HTML page
    Render {
        /// Backend base URL
        #[arg(long, default_value = "http://127.0.0.1:3002")]
        server: String,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Load the dashboard and change checkboxes by id, e.g. r0-c1-chb
    Toggle {
        /// Backend base URL
        #[arg(long, default_value = "http://127.0.0.1:3002")]
        server: String,

        /// Checkbox to check (mark viewed)
        #[arg(long, value_name = "ID")]
        check: Vec<String>,

        /// Checkbox to uncheck (mark unviewed)
        #[arg(long, value_name = "ID")]
        uncheck: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quiet unless RUST_LOG says otherwise)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve {
            store,
            port,
            history_limit,
        } => serve(store, port, history_limit).await,
        Commands::Add {
            store,
            name,
            url,
            path,
        } => add(store, &name, &url, path),
        Commands::Render { server, output } => render(&server, output).await,
        Commands::Toggle {
            server,
            check,
            uncheck,
        } => toggle(&server, check, uncheck).await,
    }
}

async fn serve(store_path: PathBuf, port: u16, history_limit: usize) -> anyhow::Result<()> {
    let store = RepoStore::open(&store_path)
        .with_context(|| format!("Failed to open store {}", store_path.display()))?;
    let repo_count = store.get_repositories()?.len();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(AppState {
            store: Arc::new(store),
            history_limit,
        }))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Bind to the port
    let addr = format!("127.0.0.1:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    println!();
    println!("  Commit News backend");
    println!("  Store:        {} ({} repositories)", store_path.display(), repo_count);
    println!("  Server:       http://{}", addr);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

fn add(store_path: PathBuf, name: &str, url: &str, path: PathBuf) -> anyhow::Result<()> {
    let path = std::fs::canonicalize(&path)
        .with_context(|| format!("No such directory: {}", path.display()))?;
    let store = RepoStore::open(&store_path)
        .with_context(|| format!("Failed to open store {}", store_path.display()))?;

    let record = store.add_repository(name, url, &path.to_string_lossy())?;
    println!("✓ Added {} ({})", record.name, record.id);
    Ok(())
}

async fn render(server: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let backend = HttpBackend::from_url(server)?;
    let snapshot = dashboard::loader::load_snapshot(&backend)
        .await
        .with_context(|| format!("Failed to load news from {}", server))?;

    let view = dashboard::render(snapshot);
    let page = dashboard::document(&view.tbody);

    match output {
        Some(path) => {
            std::fs::write(&path, page)?;
            println!("✓ Wrote {} commits to {}", view.index.len(), path.display());
        }
        None => print!("{}", page),
    }
    Ok(())
}

async fn toggle(server: &str, check: Vec<String>, uncheck: Vec<String>) -> anyhow::Result<()> {
    let backend = Arc::new(HttpBackend::from_url(server)?);
    let mut dashboard = Dashboard::open(backend).await;

    if let Some(e) = dashboard.load_error() {
        anyhow::bail!("Failed to load news from {}: {}", server, e);
    }
    println!(
        "  Loaded {} repositories, {} commits",
        dashboard.page.summary_rows().len(),
        dashboard.index().len()
    );
    if dashboard.index().is_empty() {
        println!("  Nothing to toggle");
        return Ok(());
    }

    let changes = check
        .iter()
        .map(|id| (id, true))
        .chain(uncheck.iter().map(|id| (id, false)));

    let mut dispatched = 0;
    for (id, checked) in changes {
        if dashboard.page.set_checked(id, checked) {
            dispatched += 1;
        } else {
            match dashboard.page.is_checked(id) {
                Some(_) => println!("  {} already {}", id, if checked { "checked" } else { "unchecked" }),
                None => println!("✗ No checkbox {}", id),
            }
        }
    }

    let mut failed = 0;
    for _ in 0..dispatched {
        let Some(outcome) = dashboard.next_outcome().await else {
            break;
        };
        if outcome.is_ok() {
            println!(
                "✓ {:?} {} in {}",
                outcome.mutation, outcome.target.commit_sha, outcome.target.repo_id
            );
        } else {
            failed += 1;
            println!(
                "✗ {:?} {} in {}: {}",
                outcome.mutation,
                outcome.target.commit_sha,
                outcome.target.repo_id,
                outcome.error.as_deref().unwrap_or_default()
            );
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} updates failed", failed, dispatched);
    }
    Ok(())
}
