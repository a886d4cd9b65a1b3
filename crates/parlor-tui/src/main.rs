use anyhow::{Context, Result};
use clap::Parser;
use parlor_core::config::data_dir;
use std::fs;
use std::path::{Path, PathBuf};
use parlor_core::{
    build_endpoint, ChatController, Config, ConversationStore, FileStorage, MemoryStorage,
    Provider, Storage,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "parlor")]
#[command(version, about = "Chat with a language model from your terminal")]
struct Cli {
    /// Chat provider: proxy, openai, groq, or huggingface
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name (direct providers only)
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the chat endpoint
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Delay between revealed characters, in milliseconds
    #[arg(long)]
    typing_delay_ms: Option<u64>,

    /// Keep the conversation in memory only
    #[arg(long)]
    no_history: bool,

    /// Save the given options to the config file
    #[arg(long)]
    save: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.provider = Some(provider.clone());
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint_url = Some(endpoint.clone());
        }
        if let Some(delay) = self.typing_delay_ms {
            config.typing_delay_ms = Some(delay);
        }
    }
}

/// Open the conversation, keeping it in memory when `history_dir` is absent
/// or cannot be created
fn open_chat(history_dir: Option<&Path>) -> ChatController {
    let storage: Box<dyn Storage> = match history_dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => Box::new(FileStorage::new(dir)),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "history kept in memory only");
                Box::new(MemoryStorage::new())
            }
        },
        None => Box::new(MemoryStorage::new()),
    };
    ChatController::new(ConversationStore::load(storage))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = data_dir();
    let mut log_dirs: Vec<PathBuf> = data_dir.iter().cloned().collect();
    log_dirs.push(std::env::temp_dir().join("parlor"));
    let log_path = match logging::init(&log_dirs) {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("parlor: logging disabled: {:#}", e);
            None
        }
    };
    if let Err(e) = &data_dir {
        tracing::warn!(error = %e, "no data directory, history kept in memory only");
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default config");
        Config::new()
    });
    cli.apply(&mut config);
    if cli.save {
        config.save().context("Failed to save config")?;
    }

    let provider = config.provider()?;
    let endpoint = build_endpoint(&config)?;
    let model_label = config
        .model(provider)
        .unwrap_or_else(|| config.endpoint_url(provider));

    let history_dir = data_dir.as_deref().ok().filter(|_| !cli.no_history);
    let chat = open_chat(history_dir);

    tracing::info!(
        provider = %provider,
        endpoint = %config.endpoint_url(provider),
        history = chat.messages().len(),
        log = ?log_path,
        "starting parlor"
    );
    if provider != Provider::Proxy {
        tracing::info!(model = %model_label, "talking to {} directly", provider.display_name());
    }

    let events = EventHandler::new();
    let app = App::new(chat, endpoint, model_label, config.typing_delay(), events.sender());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, app, events).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "parlor exited with an error");
    }
    result
}

async fn run(terminal: &mut Tui, mut app: App, mut events: EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event)?,
            None => break,
        }
    }

    app.quit();
    Ok(())
}
