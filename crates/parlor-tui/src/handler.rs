use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::TypingTick(generation) => app.on_typing_tick(generation),
        AppEvent::Reply(id, result) => app.on_reply(id, result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.quit();
                return;
            }
            KeyCode::Char('l') => {
                app.clear_chat();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::PageUp => return app.scroll_half_page_up(),
        KeyCode::PageDown => return app.scroll_half_page_down(),
        _ => {}
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),

        // Start typing
        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.cursor = app.input.chars().count();
        }

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down()
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up()
        }
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        KeyCode::Char('c') => app.clear_chat(),
        KeyCode::Char('s') => app.skip_typing(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parlor_core::{
        ChatController, ChatEndpoint, ChatError, ChatMessage, ConversationStore, MemoryStorage,
        Reply,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Unreachable;

    #[async_trait]
    impl ChatEndpoint for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn send(&self, _message: &str) -> Result<Reply, ChatError> {
            Err(ChatError::remote("unreachable", 500, "down"))
        }
    }

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let chat = ChatController::new(ConversationStore::load(Box::new(MemoryStorage::new())));
        App::new(chat, Arc::new(Unreachable), "test".to_string(), Duration::from_millis(1), tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 99), 6);
    }

    #[tokio::test]
    async fn test_editing_multibyte_input() {
        let mut app = app();
        type_str(&mut app, "añb");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "ab");
        assert_eq!(app.cursor, 1);

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        type_str(&mut app, "é");
        assert_eq!(app.input, "éb");

        press(&mut app, KeyCode::End);
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn test_control_chords_do_not_type() {
        let mut app = app();
        type_str(&mut app, "ab");
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(app.input, "ab");
        assert_eq!(app.cursor, 2);

        handle_key(&mut app, KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT));
        assert_eq!(app.input, "abC");
    }

    #[tokio::test]
    async fn test_enter_submits() {
        let mut app = app();
        type_str(&mut app, "hi");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.chat.messages(), &[ChatMessage::user("hi")]);
        assert!(app.chat.is_loading());

        // Second Enter while loading does nothing
        type_str(&mut app, "again");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.chat.messages().len(), 1);
        assert_eq!(app.input, "again");
    }

    #[tokio::test]
    async fn test_ctrl_l_clears_in_any_mode() {
        let mut app = app();
        type_str(&mut app, "hi");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_key(&mut app, KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(app.chat.messages().is_empty());
        assert!(!app.chat.is_loading());
    }

    #[tokio::test]
    async fn test_normal_mode_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Editing);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
