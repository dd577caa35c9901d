/*
curator - single binary
Serves the news/summarize/chat API, or drives the feed and chat views from the terminal.
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use common::{Config, ResponseStyle, TOPICS};

use curator::backend::{CuratorBackend, HttpBackend, LocalBackend};
use curator::server::{launch_rocket, AppState};
use curator::views::{format_message, ChatSession, FeedState, FeedView, SummaryToggle};

#[derive(Parser, Debug)]
#[command(name = "curator", about = "News by topic with local model summaries")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// List the topic catalog
    Topics,
    /// Show the articles of one topic
    Feed {
        topic: String,
        /// Summarize the card at this 1-based position (repeatable)
        #[arg(long, value_name = "N")]
        summarize: Vec<usize>,
        /// Go through a running curator API instead of calling providers directly
        #[arg(long, env = "CURATOR_SERVER", value_name = "URL")]
        server: Option<String>,
    },
    /// Interactive chat with the local model
    Chat {
        #[arg(long, default_value = "bullets")]
        style: ResponseStyle,
        #[arg(long, env = "CURATOR_SERVER", value_name = "URL")]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = load_config(args.config.as_deref()).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = AppState::from_config(config.clone())?;
            launch_rocket(state, &config.server).await
        }
        Command::Topics => {
            for topic in TOPICS.iter() {
                println!("{} {:<14} {}", topic.icon, topic.id, topic.name);
            }
            Ok(())
        }
        Command::Feed { topic, summarize, server } => {
            let backend = make_backend(config, server.as_deref())?;
            run_feed(backend.as_ref(), &topic, &summarize).await
        }
        Command::Chat { style, server } => {
            let backend = make_backend(config, server.as_deref())?;
            run_chat(backend.as_ref(), style).await
        }
    }
}

async fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = match explicit {
        Some(p) => {
            if !p.exists() {
                error!(path = ?p, "specified config file not found");
                return Err(anyhow!("Config file not found: {}", p.display()));
            }
            Some(p.to_path_buf())
        }
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let mut config = Config::load_with_defaults(
        Some(default_path.as_path()).filter(|p| p.exists()),
        override_path.as_deref(),
    )
    .await
    .map_err(|e| {
        error!(%e, "failed to load configuration");
        e
    })?;
    config.apply_env_overrides();
    info!(default = ?default_path, override = ?override_path, "configuration loaded");
    Ok(config)
}

fn make_backend(config: Config, server: Option<&str>) -> Result<Arc<dyn CuratorBackend>> {
    match server {
        Some(url) => {
            info!(server = %url, "using remote curator API");
            Ok(Arc::new(HttpBackend::new(url)?))
        }
        None => Ok(Arc::new(LocalBackend::new(AppState::from_config(config)?))),
    }
}

async fn run_feed(backend: &dyn CuratorBackend, topic: &str, summarize: &[usize]) -> Result<()> {
    let mut feed = FeedView::new();
    feed.select_topic(backend, topic).await;

    if let FeedState::Failed(message) = feed.state() {
        return Err(anyhow!("{}", message));
    }

    for &n in summarize {
        let index = n.checked_sub(1).context("card positions start at 1")?;
        match feed.toggle_summary(index, backend).await {
            Some(SummaryToggle::Failed(message)) => eprintln!("#{}: {}", n, message),
            Some(_) => {}
            None => eprintln!("#{}: no such article", n),
        }
    }

    println!("{}", feed.render());
    Ok(())
}

async fn run_chat(backend: &dyn CuratorBackend, style: ResponseStyle) -> Result<()> {
    let mut session = ChatSession::new(style);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    for message in session.messages() {
        println!("{}", format_message(message));
    }
    println!("(style: {}; /style <paragraph|bullets> to change, /quit to leave)", session.style());

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if line == "/quit" || line == "/exit" {
            break;
        }
        if let Some(rest) = line.strip_prefix("/style") {
            match rest.trim().parse::<ResponseStyle>() {
                Ok(style) => {
                    session.set_style(style);
                    println!("style set to {}", style);
                }
                Err(e) => println!("{}", e),
            }
            continue;
        }

        if let Some(reply) = session.send(backend, line).await {
            println!("{}", format_message(reply));
        }
    }
    Ok(())
}
