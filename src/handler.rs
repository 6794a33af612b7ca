use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
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
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Reply(completion) => app.complete(completion),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('l') => app.clear(),
            KeyCode::Char('u') => {
                app.input.clear();
                app.input_cursor = 0;
            }
            KeyCode::Home => app.transcript.scroll_to_top(),
            KeyCode::End => app.transcript.scroll_to_bottom(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(),

        // Transcript scrolling
        KeyCode::Up => app.transcript.scroll_up(1),
        KeyCode::Down => app.transcript.scroll_down(1),
        KeyCode::PageUp => app.transcript.page_up(),
        KeyCode::PageDown => app.transcript.page_down(),

        // Input editing
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);
    let over = |area: Option<Rect>| area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if over(app.send_button_area) {
                app.submit();
            } else if over(app.clear_button_area) {
                app.clear();
            }
        }
        MouseEventKind::ScrollUp if over(app.chat_area) => app.transcript.scroll_up(3),
        MouseEventKind::ScrollDown if over(app.chat_area) => app.transcript.scroll_down(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, finish_request};
    use crate::app::{Phase, STATUS_CLEARED};
    use crate::session::testing::ScriptedBackend;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn click(x: u16, y: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[tokio::test]
    async fn typing_and_enter_sends_the_line() {
        let (mut app, mut rx) = app_with(ScriptedBackend::new(vec![Ok("Hi".into())]));

        type_text(&mut app, "Hello");
        assert_eq!(app.input, "Hello");
        assert_eq!(app.input_cursor, 5);

        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.phase, Phase::Sending);

        finish_request(&mut app, &mut rx).await;
        assert_eq!(app.transcript.len(), 2);
    }

    #[tokio::test]
    async fn cursor_editing_is_utf8_safe() {
        let (mut app, _rx) = app_with(ScriptedBackend::new(vec![]));

        type_text(&mut app, "héllo");
        handle_event(&mut app, key(KeyCode::Home)).unwrap();
        handle_event(&mut app, key(KeyCode::Right)).unwrap();
        handle_event(&mut app, key(KeyCode::Delete)).unwrap();
        assert_eq!(app.input, "hllo");

        handle_event(&mut app, key(KeyCode::End)).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "hll");
        assert_eq!(app.input_cursor, 3);

        handle_event(&mut app, ctrl('u')).unwrap();
        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);
    }

    #[tokio::test]
    async fn ctrl_l_clears_and_quit_keys_quit() {
        let (mut app, _rx) = app_with(ScriptedBackend::new(vec![]));

        handle_event(&mut app, ctrl('l')).unwrap();
        assert_eq!(app.status.text(), STATUS_CLEARED);
        assert!(!app.should_quit);

        // only the documented keys quit
        handle_event(&mut app, ctrl('q')).unwrap();
        assert!(!app.should_quit);

        handle_event(&mut app, ctrl('c')).unwrap();
        assert!(app.should_quit);

        let (mut app, _rx) = app_with(ScriptedBackend::new(vec![]));
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn clicking_buttons_sends_and_clears() {
        let (mut app, mut rx) = app_with(ScriptedBackend::new(vec![]));
        app.send_button_area = Some(Rect::new(70, 20, 8, 1));
        app.clear_button_area = Some(Rect::new(60, 0, 14, 1));

        type_text(&mut app, "Hello");
        handle_event(&mut app, click(72, 20)).unwrap();
        assert_eq!(app.phase, Phase::Sending);

        // clear button is inert mid-flight
        handle_event(&mut app, click(61, 0)).unwrap();
        assert_eq!(app.transcript.len(), 1);

        finish_request(&mut app, &mut rx).await;
        handle_event(&mut app, click(61, 0)).unwrap();
        assert!(app.transcript.is_empty());

        // clicks elsewhere do nothing
        type_text(&mut app, "again");
        handle_event(&mut app, click(0, 10)).unwrap();
        assert_eq!(app.phase, Phase::Ready);
        assert_eq!(app.input, "again");
    }

    #[tokio::test]
    async fn resize_only_triggers_a_redraw() {
        let (mut app, _rx) = app_with(ScriptedBackend::new(vec![]));
        type_text(&mut app, "draft");

        handle_event(&mut app, AppEvent::Resize).unwrap();

        assert_eq!(app.input, "draft");
        assert_eq!(app.phase, Phase::Ready);
        assert!(app.transcript.is_empty());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn reply_event_completes_the_request() {
        let (mut app, mut rx) = app_with(ScriptedBackend::new(vec![Ok("pong".into())]));

        type_text(&mut app, "ping");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event).unwrap();

        assert!(app.send_enabled);
        assert_eq!(app.transcript.messages()[1].body, "pong");
    }
}
