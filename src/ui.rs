use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;
use crate::app::{App, InputMode};
use crate::predictor::Phase;

const PLACEHOLDER: &str = "Eg. Headaches from eating too much chocolate";
const CARD_WIDTH: u16 = 72;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_predictor(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Product Category Predictor ", Style::default().fg(Color::Magenta).bold()),
        Span::styled(format!(" {} ", app.classifier.base_url()), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let pairs: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[(" Enter ", " predict "), (" Esc ", " normal "), (" Ctrl+C ", " quit ")],
        InputMode::Normal => &[
            (" p ", " predict "),
            (" i ", " edit "),
            (" c ", " clear "),
            (" q ", " quit "),
        ],
    };
    for (key, label) in pairs {
        hints.push(Span::styled(*key, key_style));
        hints.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_predictor(app: &mut App, frame: &mut Frame, area: Rect) {
    let [card_area] = Layout::horizontal([Constraint::Max(CARD_WIDTH)])
        .flex(Flex::Center)
        .areas(area);

    let card = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let inner = card.inner(card_area);
    frame.render_widget(card, card_area);

    let [label_area, input_area, button_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(inner);

    // Store areas for mouse hit-testing
    app.input_area = Some(input_area);
    app.button_area = Some(button_area);

    frame.render_widget(
        Paragraph::new("Describe the product or issue").style(Style::default().fg(Color::Magenta)),
        label_area,
    );

    render_input(app, frame, input_area);
    render_button(app, frame, button_area);

    if let Some(result) = app.view.result() {
        let line = Line::from(vec![
            Span::styled("Predicted Category: ", Style::default().fg(Color::Magenta)),
            Span::styled(result.to_string(), Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)),
        ]);
        let paragraph = Paragraph::new(line)
            .centered()
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(paragraph, result_area);
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;

    let input = app.view.input();
    let (paragraph, cursor_x) = if input.is_empty() {
        (Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray)), 0)
    } else {
        let (visible_text, cursor_x) = visible_window(input, app.cursor, inner_width);
        (Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan)), cursor_x)
    };

    frame.render_widget(paragraph.block(block), area);

    if editing {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// Slice of `input` that fits in `width` terminal columns with the cursor
/// cell still visible, plus the cursor's column inside that slice.
/// Measured in display columns, so wide characters count twice.
fn visible_window(input: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }

    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());
    let char_width = |c: char| c.width().unwrap_or(0);

    // Walk back from the cursor while the text before it leaves one free column
    let mut start = cursor;
    let mut cursor_x = 0;
    while start > 0 {
        let w = char_width(chars[start - 1]);
        if cursor_x + w >= width {
            break;
        }
        cursor_x += w;
        start -= 1;
    }

    let mut used = 0;
    let visible: String = chars[start..]
        .iter()
        .take_while(|&&c| {
            used += char_width(c);
            used <= width
        })
        .collect();

    (visible, cursor_x as u16)
}

fn render_button(app: &App, frame: &mut Frame, area: Rect) {
    let (label, style) = if app.view.phase() == Phase::Pending {
        // Animated ellipsis: ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        (
            format!("Predicting{dots:<3}"),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )
    } else {
        (
            "Predict".to_string(),
            Style::default().fg(Color::White).bg(Color::Magenta).add_modifier(Modifier::BOLD),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if app.can_submit() {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    frame.render_widget(Paragraph::new(Span::styled(label, style)).centered().block(block), area);
}
