use std::sync::Arc;
use std::time::Duration;
use parlor_core::{ChatController, ChatEndpoint, ChatError, Reply, TypingStep};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::tui::{self, AppEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Message input
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Conversation
    pub chat: ChatController,
    pub endpoint: Arc<dyn ChatEndpoint>,
    pub model_label: String,
    pub typing_delay: Duration,

    // Chat viewport, updated during render
    pub scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16,
    pub chat_width: u16,
    pub max_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    events: mpsc::UnboundedSender<AppEvent>,
    request_task: Option<JoinHandle<()>>,
    typing_task: Option<(u64, JoinHandle<()>)>,
}

impl App {
    pub fn new(
        chat: ChatController,
        endpoint: Arc<dyn ChatEndpoint>,
        model_label: String,
        typing_delay: Duration,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            input: String::new(),
            cursor: 0,

            chat,
            endpoint,
            model_label,
            typing_delay,

            scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_width: 0,
            max_scroll: 0,

            animation_frame: 0,

            events,
            request_task: None,
            typing_task: None,
        }
    }

    /// Send the current input, unless it is blank or a reply is in flight
    pub fn submit(&mut self) {
        let Some(request) = self.chat.begin_submit(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.follow_bottom = true;

        let endpoint = Arc::clone(&self.endpoint);
        let tx = self.events.clone();
        self.request_task = Some(tokio::spawn(async move {
            let result = endpoint.send(&request.message).await;
            let _ = tx.send(AppEvent::Reply(request.id, result));
        }));
    }

    pub fn on_reply(&mut self, id: u64, result: Result<Reply, ChatError>) {
        if self.chat.finish_submit(id, result) {
            self.request_task = None;
        }
        self.follow_bottom = true;
        self.sync_typing_ticker();
    }

    pub fn on_typing_tick(&mut self, generation: u64) {
        if let Some(TypingStep::Finished(_)) = self.chat.tick(generation) {
            self.sync_typing_ticker();
        }
    }

    /// Show the rest of the reply being typed right away
    pub fn skip_typing(&mut self) {
        if self.chat.is_typing() {
            self.chat.finish_typing();
            self.sync_typing_ticker();
        }
    }

    /// Clear the conversation and stop anything still running for it
    pub fn clear_chat(&mut self) {
        self.chat.clear();
        if let Some(task) = self.request_task.take() {
            task.abort();
        }
        self.sync_typing_ticker();
        self.scroll = 0;
        self.follow_bottom = true;
        tracing::info!("conversation cleared");
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
        if let Some(task) = self.request_task.take() {
            task.abort();
        }
        if let Some((_, task)) = self.typing_task.take() {
            task.abort();
        }
    }

    /// Keep exactly one ticker running for the active typing session
    fn sync_typing_ticker(&mut self) {
        let wanted = self
            .chat
            .is_typing()
            .then(|| self.chat.typing_generation());

        let running = self.typing_task.as_ref().map(|(generation, _)| *generation);
        if running == wanted {
            return;
        }

        if let Some((_, task)) = self.typing_task.take() {
            task.abort();
        }
        if let Some(generation) = wanted {
            let task = tui::spawn_typing_ticker(self.events.clone(), generation, self.typing_delay);
            self.typing_task = Some((generation, task));
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.chat.can_submit()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
        self.follow_bottom = self.scroll >= self.max_scroll;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.follow_bottom = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll;
        self.follow_bottom = true;
    }

    /// Record the rendered chat height; pins the view to the newest line
    /// unless the user scrolled away from it
    pub fn set_content_height(&mut self, total_lines: u16) {
        self.max_scroll = total_lines.saturating_sub(self.chat_height);
        if self.follow_bottom || self.scroll > self.max_scroll {
            self.scroll = self.max_scroll;
        }
    }
}
