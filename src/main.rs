//! `specto-forum`: forum REST calls and live topic chat from the terminal.

mod repl;

use clap::{Args, Parser, Subcommand, ValueEnum};
use forum_client::net::types::{EnsureTopic, MediaType};
use forum_client::{ApiClient, ApiError, ChatError, ClientConfig, ConfigError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing credential; pass --token or set SPECTO_TOKEN")]
    MissingToken,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "specto-forum", about = "Specto forum API and topic chat CLI")]
struct Cli {
    /// REST base URL. Overrides `SPECTO_API_BASE_URL` and re-derives the websocket base.
    #[arg(long)]
    base_url: Option<String>,

    /// Websocket base URL. Overrides `SPECTO_WS_BASE_URL`.
    #[arg(long)]
    ws_base_url: Option<String>,

    #[arg(long, env = "SPECTO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the authenticated user.
    Me,
    Topics(TopicsCommand),
    /// Trending movies and series.
    TopItems,
    /// Toggle your like on a chat message.
    Like { message_id: frames::MessageId },
    /// Join a topic's live chat. Lines on stdin are sent; `/like <id>` and `/quit` are commands.
    Chat {
        topic_id: frames::TopicId,
        /// Do not ring the terminal bell on incoming messages.
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
}

#[derive(Args, Debug)]
struct TopicsCommand {
    #[command(subcommand)]
    command: TopicsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TopicsSubcommand {
    List,
    Show {
        topic_id: frames::TopicId,
    },
    /// Find or create the topic for a catalog title.
    Ensure {
        #[arg(long)]
        tmdb_id: i64,
        #[arg(long, value_enum)]
        media_type: MediaKind,
        #[arg(long)]
        title: String,
    },
    Post {
        topic_id: frames::TopicId,
        #[arg(long)]
        content: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MediaKind {
    Movie,
    Tv,
}

impl From<MediaKind> for MediaType {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => Self::Movie,
            MediaKind::Tv => Self::Tv,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let token = cli.token.clone().ok_or(CliError::MissingToken)?;
    let api = ApiClient::new(&config, &token)?;

    match cli.command {
        Command::Me => print_json(&api.current_user().await?),
        Command::Topics(topics) => run_topics(&api, topics).await,
        Command::TopItems => print_json(&api.top_items().await?),
        Command::Like { message_id } => print_json(&api.toggle_message_like(message_id).await?),
        Command::Chat { topic_id, quiet } => repl::run_chat(config, token, api, topic_id, quiet).await,
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_api_base_url(base_url)?;
    }
    if let Some(ws_base_url) = &cli.ws_base_url {
        config = config.with_ws_base_url(ws_base_url)?;
    }
    Ok(config)
}

async fn run_topics(api: &ApiClient, topics: TopicsCommand) -> Result<(), CliError> {
    match topics.command {
        TopicsSubcommand::List => print_json(&api.list_topics().await?),
        TopicsSubcommand::Show { topic_id } => print_json(&api.topic_detail(topic_id).await?),
        TopicsSubcommand::Ensure {
            tmdb_id,
            media_type,
            title,
        } => {
            let body = EnsureTopic {
                tmdb_id,
                media_type: media_type.into(),
                title,
            };
            print_json(&api.ensure_topic(&body).await?)
        }
        TopicsSubcommand::Post { topic_id, content } => print_json(&api.create_post(topic_id, &content).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;
