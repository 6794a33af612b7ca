use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Phase};
use crate::transcript::Message;

const TITLE: &str = " 🤖 Gemini AI Assistant ";
const CLEAR_BUTTON: &str = "[ Clear Chat ]";
const SEND_BUTTON: &str = "Send";
const SEND_BUTTON_WIDTH: u16 = 10;
const STATUS_HINTS: &str = " Enter send · Ctrl+L clear · Esc quit ";

/// Wrap text to fit within a given width in terminal cells, returning
/// multiple lines. Breaks at spaces; words wider than the line are split.
/// Leading indentation and runs of spaces are kept, only the spaces at a
/// break are dropped.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    let text = text.replace('\t', "    ");
    if width == 0 {
        return vec![text];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    // Each piece keeps its trailing space
    for word in text.split_inclusive(' ') {
        let word_width = word.trim_end_matches(' ').width();
        let pending = current_line.trim_end_matches(' ');
        if !pending.is_empty() && current_width + word_width > width {
            lines.push(pending.to_string());
            current_line.clear();
            current_width = 0;
        }

        for c in word.chars() {
            let char_width = c.width().unwrap_or(0);
            if current_width + char_width > width {
                if c == ' ' {
                    continue;
                }
                if current_width > 0 {
                    lines.push(std::mem::take(&mut current_line));
                    current_width = 0;
                }
            }
            current_line.push(c);
            current_width += char_width;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
                if found_close {
                    current_text.push_str("**");
                }
            }
        } else {
            current_text.push(c);
        }
    }

    // Push any remaining text
    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

/// Lay out one message block: label line, wrapped body, blank separator.
fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let style = message.role.style();
    let mut lines = vec![Line::from(Span::styled(
        format!("{} {}:", style.icon, message.sender),
        style.label,
    ))];

    for raw in message.body.lines() {
        for wrapped in wrap_text_to_width(raw, width) {
            let line = if style.markdown {
                parse_markdown_line(&wrapped)
            } else {
                Line::from(wrapped)
            };
            lines.push(line.style(style.body));
        }
    }
    if message.body.is_empty() {
        lines.push(Line::default());
    }

    lines.push(Line::default());
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, status
    let [header_area, chat_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_status(app, frame, status_area);
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let button_width = CLEAR_BUTTON.width() as u16;
    let [title_area, button_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(button_width + 1),
    ])
    .areas(area);

    let title = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.model), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    let clear_style = if app.phase == Phase::Sending {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let button = Rect { width: button_width.min(button_area.width), ..button_area };
    frame.render_widget(Paragraph::new(Span::styled(CLEAR_BUTTON, clear_style)), button);
    app.clear_button_area = Some(button);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let title = if app.transcript.is_following() {
        " Chat ".to_string()
    } else {
        " Chat (scrolled, Ctrl+End for latest) ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    let inner = block.inner(area);

    let text = if app.transcript.is_empty() {
        Text::from(Span::styled(
            "Ask Gemini anything...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let width = inner.width as usize;
        let lines: Vec<Line> = app
            .transcript
            .messages()
            .iter()
            .flat_map(|m| message_lines(m, width))
            .collect();
        Text::from(lines)
    };

    let content_height = text.height().min(u16::MAX as usize) as u16;
    let scroll = app.transcript.layout(content_height, inner.height);

    let chat = Paragraph::new(text).block(block).scroll((scroll, 0));
    frame.render_widget(chat, area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let [field_area, button_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    // Calculate visible portion of input with horizontal scrolling, in cells
    // Inner width = total width - 2 (for borders)
    let inner_width = field_area.width.saturating_sub(2) as usize;
    let chars: Vec<char> = app.input.chars().collect();
    let cursor_pos = app.input_cursor.min(chars.len());
    let cell_width = |c: &char| c.width().unwrap_or(0);

    // Drop characters from the left until the cursor cell is inside the field
    let mut scroll_offset = 0;
    let mut cursor_x: usize = chars[..cursor_pos].iter().map(cell_width).sum();
    while inner_width > 0 && cursor_x >= inner_width && scroll_offset < cursor_pos {
        cursor_x -= cell_width(&chars[scroll_offset]);
        scroll_offset += 1;
    }

    let mut visible_width = 0;
    let visible_text: String = chars[scroll_offset..]
        .iter()
        .take_while(|c| {
            visible_width += cell_width(*c);
            visible_width <= inner_width
        })
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, field_area);

    frame.set_cursor_position((field_area.x + cursor_x as u16 + 1, field_area.y + 1));

    // Send button, dimmed while a request is in flight
    let (border, label) = if app.send_enabled {
        (Style::default().fg(Color::Green), Style::default().fg(Color::Green).bold())
    } else {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::DarkGray))
    };
    let button = Paragraph::new(Span::styled(SEND_BUTTON, label))
        .centered()
        .block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(button, button_area);
    app.send_button_area = Some(button_area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let color = match app.phase {
        Phase::Ready => Color::Green,
        Phase::Sending => Color::Yellow,
        Phase::Error => Color::Red,
    };

    let status = Span::styled(format!(" {}", app.status_text()), Style::default().fg(color));
    let hints = Span::styled(STATUS_HINTS, Style::default().fg(Color::DarkGray));

    // The hints only get a column when the status text fits beside them
    if (area.width as usize) < status.width() + hints.width() {
        frame.render_widget(Paragraph::new(status), area);
        return;
    }

    let [text_area, hint_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(hints.width() as u16),
    ])
    .areas(area);
    frame.render_widget(Paragraph::new(status), text_area);
    frame.render_widget(Paragraph::new(hints), hint_area);
}
