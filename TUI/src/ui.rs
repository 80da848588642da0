use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, ServiceHealth};
use crate::config::KEY_HINTS;
use crate::model::{Audience, InteractionState};
use crate::ui_state::{form_view, CounterView, FormView, OutputPresentation};

// Copper Sapphire Morning color palette
const BG_DARK: Color = Color::Rgb(12, 12, 16);           // Deep background
const BG_PANEL: Color = Color::Rgb(18, 18, 24);          // Slightly lighter for panels

// Sapphire blues
const SAPPHIRE: Color = Color::Rgb(101, 150, 243);       // #6596F3 - Primary accent
const SAPPHIRE_DARK: Color = Color::Rgb(84, 112, 156);   // #54709C - Darker blue

// Copper/warm tones
const COPPER: Color = Color::Rgb(138, 72, 38);           // #8A4826 - Copper
const TAN: Color = Color::Rgb(216, 180, 169);            // #D8B4A9 - Tan/beige

// Accent colors
const BURGUNDY: Color = Color::Rgb(204, 92, 68);         // #CC5C44 - Warnings/errors
const OLIVE: Color = Color::Rgb(131, 179, 102);          // #83B366 - Success/green

// Text colors
const TEXT_PRIMARY: Color = Color::Rgb(240, 240, 245);   // Near white
const TEXT_SECONDARY: Color = Color::Rgb(180, 180, 190); // Light gray
const TEXT_MUTED: Color = Color::Rgb(105, 116, 133);     // #697485 - Medium gray

// Border colors (subtle)
const BORDER_DIM: Color = Color::Rgb(45, 50, 60);        // Dim border
const BORDER_ACCENT: Color = Color::Rgb(70, 85, 110);    // Accent border

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &App, now: Instant) {
    // Fill entire background
    let bg = Block::default().style(Style::default().bg(BG_DARK));
    frame.render_widget(bg, frame.area());

    let view = form_view(app, now);
    let area = frame.area();

    // Main layout with padding
    let padded = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(5),      // Input
            Constraint::Length(3),   // Audience + convert
            Constraint::Min(5),      // Output
            Constraint::Length(1),   // Feedback row
            Constraint::Length(1),   // Key hints
        ])
        .split(padded);

    draw_header(frame, app, chunks[0]);
    draw_input(frame, app, &view.counter, chunks[1]);
    draw_controls(frame, app, &view, chunks[2]);
    draw_output(frame, app, &view, chunks[3]);
    if view.flags.feedback_visible {
        draw_feedback_row(frame, chunks[4]);
    }
    draw_keyboard_hints(frame, chunks[5]);

    if view.toast_visible {
        draw_toast(frame, app, padded);
    }

    if let Some(message) = view.alert {
        draw_alert(frame, message, area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let (dot, health_text, health_color) = match &app.service_health {
        ServiceHealth::Unknown => ("○", "checking".to_string(), TEXT_MUTED),
        ServiceHealth::Healthy => ("●", "online".to_string(), OLIVE),
        ServiceHealth::Unreachable(reason) => ("●", format!("unreachable ({})", reason), BURGUNDY),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let title = Line::from(vec![
        Span::styled(" BizTone", Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)),
        Span::styled(" Converter", Style::default().fg(TAN).add_modifier(Modifier::BOLD)),
        Span::styled("  casual text → business tone", Style::default().fg(TEXT_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(title), inner);

    let status = Line::from(vec![
        Span::styled(format!("{} ", dot), Style::default().fg(health_color)),
        Span::styled(format!("{} ", app.server_url), Style::default().fg(TEXT_SECONDARY)),
        Span::styled(format!("{} ", health_text), Style::default().fg(health_color)),
    ]);
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Right), inner);
}

/// Rows the text needs once wrapped at `width` columns
fn wrapped_rows(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text.split('\n')
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

fn draw_input(frame: &mut Frame, app: &App, counter: &CounterView, area: Rect) {
    let counter_color = if counter.warning { BURGUNDY } else { TEXT_MUTED };

    let block = Block::default()
        .title(Span::styled(
            " Original text ",
            Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(
            Line::from(Span::styled(
                format!(" {} ", counter.label),
                Style::default().fg(counter_color),
            ))
            .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACCENT))
        .style(Style::default().bg(BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = if app.animation_frame % 30 < 15 { "|" } else { " " };
    let input_text = format!("{}{}", app.draft.text, cursor);

    // Keep the end of the draft in view
    let rows = wrapped_rows(&input_text, inner.width as usize);
    let scroll = rows.saturating_sub(inner.height as usize) as u16;

    let input = Paragraph::new(input_text)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(input, inner);
}

fn draw_controls(frame: &mut Frame, app: &App, view: &FormView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(18)])
        .split(area);

    // Audience selector
    let mut spans = vec![Span::styled(" To: ", Style::default().fg(TEXT_SECONDARY))];
    for audience in Audience::ALL {
        if audience == app.draft.target {
            spans.push(Span::styled(
                format!("[{}]", audience.label()),
                Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                format!(" {} ", audience.label()),
                Style::default().fg(TEXT_MUTED),
            ));
        }
        spans.push(Span::raw(" "));
    }
    let selector = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_DIM)),
    );
    frame.render_widget(selector, chunks[0]);

    // Convert button: spinner replaces the label while a request is in flight
    let label = if view.flags.loader_visible {
        let spinner = SPINNER_FRAMES[(app.animation_frame / 6) % SPINNER_FRAMES.len()];
        format!("{} Converting", spinner)
    } else {
        "Convert ⏎".to_string()
    };
    let (fg, border) = if view.flags.submit_enabled {
        (TEXT_PRIMARY, COPPER)
    } else {
        (TEXT_MUTED, BORDER_DIM)
    };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(fg).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(button, chunks[1]);
}

fn draw_output(frame: &mut Frame, app: &App, view: &FormView, area: Rect) {
    let title = match &app.state {
        InteractionState::Displayed(result) => {
            format!(" Result · {} ", result.received_at.format("%H:%M:%S"))
        }
        _ => " Result ".to_string(),
    };
    let copy_color = if view.flags.copy_enabled { OLIVE } else { BORDER_DIM };

    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(
            Line::from(Span::styled(" Ctrl+Y copy ", Style::default().fg(copy_color)))
                .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACCENT))
        .style(Style::default().bg(BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (alignment, color) = match view.flags.output {
        OutputPresentation::Placeholder => (Alignment::Center, TEXT_MUTED),
        OutputPresentation::Normal => (Alignment::Left, TEXT_PRIMARY),
        OutputPresentation::Error => (Alignment::Center, BURGUNDY),
    };

    // Centered presentations are also centered vertically
    let text_area = if alignment == Alignment::Center {
        let rows = wrapped_rows(view.output_text, inner.width as usize) as u16;
        let top = inner.height.saturating_sub(rows) / 2;
        Rect {
            y: inner.y + top,
            height: inner.height.saturating_sub(top),
            ..inner
        }
    } else {
        inner
    };

    let output = Paragraph::new(view.output_text)
        .alignment(alignment)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false });
    frame.render_widget(output, text_area);
}

fn draw_feedback_row(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Not quite right? ", Style::default().fg(TAN)),
        Span::styled(
            "Edit the text or switch audience and convert again.",
            Style::default().fg(TEXT_MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_keyboard_hints(frame: &mut Frame, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();
    for (key, desc) in KEY_HINTS {
        spans.push(Span::styled(format!(" {} ", key), Style::default().fg(SAPPHIRE_DARK)));
        spans.push(Span::styled(format!("{}  ", desc), Style::default().fg(TEXT_MUTED)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_toast(frame: &mut Frame, app: &App, area: Rect) {
    let text = format!(" ✓ {} ", app.toast.message());
    let width = (text.width() as u16 + 2).min(area.width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y + area.height.saturating_sub(4),
        width,
        height: 3.min(area.height),
    };

    frame.render_widget(Clear, toast_area);
    let toast = Paragraph::new(text)
        .style(Style::default().fg(OLIVE).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(OLIVE))
                .style(Style::default().bg(BG_PANEL)),
        );
    frame.render_widget(toast, toast_area);
}

fn draw_alert(frame: &mut Frame, message: &str, area: Rect) {
    let width = 56.min(area.width.saturating_sub(4));
    let inner_width = width.saturating_sub(4) as usize;
    let height = (wrapped_rows(message, inner_width) as u16 + 5).min(area.height);
    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    // Clear area behind popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(
            " Notice ",
            Style::default().fg(BURGUNDY).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BURGUNDY))
        .style(Style::default().bg(Color::Rgb(16, 20, 28)));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(TEXT_PRIMARY))),
        Line::from(""),
        Line::from(Span::styled("[ Enter ] OK", Style::default().fg(TAN))),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(body, inner);
}
