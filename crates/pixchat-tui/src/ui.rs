use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use pixchat_core::content::{self, Segment};
use pixchat_core::{Author, Message};
use crate::app::{App, InputMode, Overlay, EXAMPLE_QUERIES};

/// Turn assistant content into display lines, with images as labelled links
fn content_lines(text: &str) -> Vec<Line<'static>> {
    let image_style = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    let url_style = Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();

    for segment in content::parse(text) {
        match segment {
            Segment::Text(text) => {
                let mut parts = text.split('\n');
                if let Some(first) = parts.next() {
                    if !first.is_empty() {
                        spans.push(Span::raw(first.to_string()));
                    }
                }
                for part in parts {
                    lines.push(Line::from(std::mem::take(&mut spans)));
                    if !part.is_empty() {
                        spans.push(Span::raw(part.to_string()));
                    }
                }
            }
            Segment::Image { url, alt } => {
                spans.push(Span::styled(format!("[img: {}]", alt), image_style));
                spans.push(Span::raw(" "));
                spans.push(Span::styled(url, url_style));
            }
        }
    }

    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }

    lines
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match message.author {
        Author::User => {
            lines.push(Line::from(Span::styled(
                "QN:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            // User text is shown as typed, never parsed
            for line in message.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        Author::Assistant => {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.extend(content_lines(&message.content));

            if let Some(ms) = message.response_time_ms {
                lines.push(Line::from(Span::styled(
                    format!("⏱ {}ms", ms),
                    Style::default().fg(Color::DarkGray),
                )));
            }

            let gallery = message.gallery();
            if !gallery.is_empty() {
                lines.push(Line::from(Span::styled(
                    "Gallery:",
                    Style::default().fg(Color::Magenta),
                )));
                for (i, image) in gallery.iter().enumerate() {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("  {}. {} ", i + 1, image.gallery_label(i)),
                            Style::default().fg(Color::Magenta),
                        ),
                        Span::styled(
                            image.url.clone(),
                            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                        ),
                    ]));
                }
            }
        }
    }

    lines.push(Line::default());
    lines
}

/// Rows a set of lines takes once wrapped to `width`
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let total: usize = lines
        .iter()
        .map(|line| {
            let chars: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
            if chars == 0 { 1 } else { chars.div_ceil(width) }
        })
        .sum();
    total.min(u16::MAX as usize) as u16
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

    match app.overlay {
        Overlay::Examples => render_examples(app, frame, area),
        Overlay::Identities => render_identity_picker(app, frame, area),
        Overlay::None => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let identity = match app.identities.selected() {
        Some(identity) => format!(" as {} ", identity.name),
        None => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" POC MultiAgent ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            "Your personal assistant with image support",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(identity, Style::default().fg(Color::Green)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(format!(" {} ", app.client.base_url()));

    let messages = app.controller.messages();
    let chat_text = if messages.is_empty() && !app.is_sending() {
        app.chat_total_lines = 1;
        Text::from(Span::styled(
            "Ask the assistant anything... (Esc then e for example queries)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = messages.iter().flat_map(message_lines).collect();

        if app.controller.shows_typing_indicator() {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated dots: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        app.chat_total_lines = wrapped_height(&lines, inner_width);
        Text::from(lines)
    };

    let max_scroll = app.chat_total_lines.saturating_sub(app.chat_height);
    if app.follow_bottom || app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let sending = app.is_sending();
    let border_color = if sending {
        Color::DarkGray
    } else if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let title = if sending {
        " Waiting for the assistant... ".to_string()
    } else {
        match app.identities.selected() {
            Some(identity) => format!(" Message Assistant ({}) ", identity.name),
            None => " Message Assistant ".to_string(),
        }
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Keep the cursor visible with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.query_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_color = if sending { Color::DarkGray } else { Color::Cyan };
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(input_block);

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !sending && app.overlay == Overlay::None {
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
        InputMode::Normal => " CHAT ",
        InputMode::Editing => " TYPE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.overlay, app.input_mode) {
        (Overlay::Examples, _) | (Overlay::Identities, _) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ],
        (Overlay::None, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (Overlay::None, InputMode::Normal) => {
            let mut hints = vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" e ", key_style),
                Span::styled(" examples ", label_style),
            ];
            if !app.identities.identities().is_empty() && !app.is_sending() {
                hints.extend(vec![
                    Span::styled(" u ", key_style),
                    Span::styled(" user ", label_style),
                ]);
            }
            if app.latest_image_url().is_some() {
                hints.extend(vec![
                    Span::styled(" o ", key_style),
                    Span::styled(" open image ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

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

/// Centered popup rectangle clamped to the frame
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_examples(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 44, EXAMPLE_QUERIES.len() as u16 + 2);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Example Queries ");

    let items: Vec<ListItem> = EXAMPLE_QUERIES
        .iter()
        .map(|query| ListItem::new(format!(" {} ", query)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup, &mut app.examples_state);
}

fn render_identity_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let identities = app.identities.identities();
    let popup = popup_area(area, 40, identities.len() as u16 + 2);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Ask As (Enter to select, Esc to cancel) ");

    let selected_id = app.identities.selected_id();
    let items: Vec<ListItem> = identities
        .iter()
        .map(|identity| {
            let style = if Some(identity.id) == selected_id {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", identity.name)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup, &mut app.identity_picker_state);
}
