use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block as Panel, Borders, Paragraph, Wrap},
};
use parlor_core::richtext::{self, Block, Inline};
use parlor_core::ChatRole;
use crate::app::{App, InputMode};

/// Convert inline runs to spans, bolding `**strong**` runs
fn inline_spans(text: &str, base: Style) -> Vec<Span<'static>> {
    richtext::parse_inline(text)
        .into_iter()
        .map(|run| match run {
            Inline::Plain(text) => Span::styled(text, base),
            Inline::Strong(text) => Span::styled(text, base.add_modifier(Modifier::BOLD)),
        })
        .collect()
}

/// Render an assistant reply as styled lines
pub fn reply_lines(content: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let marker_style = Style::default().fg(Color::DarkGray);

    for block in richtext::parse(content) {
        match block {
            Block::Heading(title) => {
                let style = Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                lines.push(Line::from(inline_spans(&title, style)));
            }
            Block::OrderedList(items) => {
                for (n, item) in items.iter().enumerate() {
                    let mut spans = vec![Span::styled(format!("  {}. ", n + 1), marker_style)];
                    spans.extend(inline_spans(item, Style::default()));
                    lines.push(Line::from(spans));
                }
            }
            Block::UnorderedList(items) => {
                for item in &items {
                    let mut spans = vec![Span::styled("  • ", marker_style)];
                    spans.extend(inline_spans(item, Style::default()));
                    lines.push(Line::from(spans));
                }
            }
            Block::BlankSpacer => lines.push(Line::default()),
            Block::Paragraph(text) => lines.push(Line::from(inline_spans(&text, Style::default()))),
        }
    }

    lines
}

/// Rows a borderless `paragraph` occupies when word-wrapped to `width` columns
fn wrapped_height(paragraph: &Paragraph, width: u16) -> u16 {
    u16::try_from(paragraph.line_count(width.max(1))).unwrap_or(u16::MAX)
}

fn role_line(role: ChatRole) -> Line<'static> {
    match role {
        ChatRole::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        ChatRole::Assistant => Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

fn conversation_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.chat.messages() {
        lines.push(role_line(msg.role));
        match msg.role {
            ChatRole::User => {
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => lines.extend(reply_lines(&msg.content)),
        }
        lines.push(Line::default());
    }

    // Reply being typed: shown as plain text until it is committed
    if let Some(revealed) = app.chat.typing_text() {
        lines.push(role_line(ChatRole::Assistant));
        if revealed.is_empty() {
            lines.push(Line::from("…"));
        } else {
            for line in revealed.split('\n') {
                lines.push(Line::from(line.trim_end_matches('\r').to_string()));
            }
        }
    } else if app.chat.is_loading() {
        lines.push(role_line(ChatRole::Assistant));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.is_busy() {
        "Assistant is responding…"
    } else {
        "Ask anything"
    };

    let title = Line::from(vec![
        Span::styled(" parlor ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("{} ", status),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_block = Panel::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {}: {} ", app.endpoint.name(), app.model_label));

    let chat_text = if app.chat.messages().is_empty() && !app.is_busy() {
        Text::from(Span::styled(
            "Ask anything...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(conversation_lines(app))
    };

    // Measure before the border is attached so only content rows count
    let chat = Paragraph::new(chat_text).wrap(Wrap { trim: false });
    app.set_content_height(wrapped_height(&chat, app.chat_width));
    let chat = chat.block(chat_block).scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if app.is_busy() {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let title = if app.is_busy() {
        " Waiting for reply… "
    } else {
        " Message "
    };

    let input_block = Panel::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    // Get the visible slice of the input
    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" normal mode ", label_style),
            Span::styled(" ^L ", key_style),
            Span::styled(" clear ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" write ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    if app.chat.is_typing() && app.input_mode == InputMode::Normal {
        hints.extend(vec![
            Span::styled(" s ", key_style),
            Span::styled(" skip ", label_style),
        ]);
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
