use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::controller::PlaybackPhase;
use crate::domain::User;
use crate::tui::app::{Screen, TuiApp, AVATAR_WIDTH};

const STRIP_HEIGHT: u16 = 7;

pub fn render(frame: &mut Frame, app: &TuiApp, colors: &ColorConfig) {
    match app.screen() {
        Screen::Carousel => render_carousel(frame, app, colors),
        Screen::Viewer => render_viewer(frame, app, colors),
    }
}

/// Number of avatars that fit across the carousel strip.
pub fn avatar_slots(area: Rect) -> usize {
    (area.width.saturating_sub(2) / AVATAR_WIDTH).max(1) as usize
}

fn render_carousel(frame: &mut Frame, app: &TuiApp, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STRIP_HEIGHT),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_strip(frame, app, colors, chunks[0]);
    render_user_detail(frame, app, colors, chunks[1]);
    render_status_bar(
        frame,
        app,
        colors,
        chunks[2],
        "h/l:Browse  Enter:Watch  R:Reload  q:Quit",
    );
}

fn render_strip(frame: &mut Frame, app: &TuiApp, colors: &ColorConfig, area: Rect) {
    let users = app.list.users();
    let title = format!(" Stories ({}) ", users.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if users.is_empty() {
        let text = if app.list.is_loading() {
            Line::from(format!("{} Loading stories...", app.spinner()))
        } else if let Some(error) = app.list.error() {
            Line::from(Span::styled(error.to_string(), Style::default().fg(colors.error)))
        } else {
            Line::from("No stories available")
        };
        let paragraph = Paragraph::new(text).alignment(Alignment::Center);
        frame.render_widget(paragraph, centered_row(inner));
        return;
    }

    let slots = avatar_slots(area);
    let end = (app.carousel_offset + slots).min(users.len());
    let visible = &users[app.carousel_offset.min(end)..end];
    let trailing_spinner = app.list.is_loading() && end == users.len();

    let mut constraints: Vec<Constraint> = visible
        .iter()
        .map(|_| Constraint::Length(AVATAR_WIDTH))
        .collect();
    constraints.push(Constraint::Min(0));
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (offset, user) in visible.iter().enumerate() {
        let index = app.carousel_offset + offset;
        let selected = index == app.list.selected_index();
        render_avatar(frame, user, app.list.is_seen(user.id), selected, colors, cells[offset]);
    }

    if trailing_spinner {
        let spinner = Paragraph::new(app.spinner().to_string()).alignment(Alignment::Center);
        frame.render_widget(spinner, centered_row(cells[visible.len()]));
    }
}

fn render_avatar(
    frame: &mut Frame,
    user: &User,
    seen: bool,
    selected: bool,
    colors: &ColorConfig,
    area: Rect,
) {
    // Unseen stories get a bold colored ring, seen ones fade out.
    let ring = if seen {
        Style::default().fg(colors.seen_ring)
    } else {
        Style::default()
            .fg(colors.unseen_ring)
            .add_modifier(Modifier::BOLD)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if seen {
            BorderType::Plain
        } else {
            BorderType::Double
        })
        .border_style(ring);

    let body = if selected {
        Style::default()
            .bg(colors.selection_bg)
            .fg(colors.selection_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let name_width = AVATAR_WIDTH.saturating_sub(2) as usize;
    let text = Text::from(vec![
        Line::from(Span::styled(
            user.initials(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(truncate(&user.name, name_width)),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(body)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_user_detail(frame: &mut Frame, app: &TuiApp, colors: &ColorConfig, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let mut lines = Vec::new();
    if let Some(user) = app.list.selected_user() {
        lines.push(Line::from(Span::styled(
            user.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        let state = if app.list.is_seen(user.id) {
            Span::styled("Seen", Style::default().fg(colors.seen_ring))
        } else {
            Span::styled("New story", Style::default().fg(colors.unseen_ring))
        };
        lines.push(Line::from(vec![Span::raw(format!("User #{}  ", user.id)), state]));
        lines.push(Line::from(Span::styled(
            user.profile_picture_url.clone(),
            Style::default().fg(colors.border),
        )));
    }

    // Pagination failures leave the loaded avatars in place, so show them here.
    if !app.list.users().is_empty() {
        if let Some(error) = app.list.error() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(colors.error),
            )));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_viewer(frame: &mut Frame, app: &TuiApp, colors: &ColorConfig) {
    let Some(viewer) = &app.viewer else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Progress segments
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Image
            Constraint::Length(1), // Like / item footer
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_segments(frame, &viewer.segments(), colors, chunks[0]);

    let mut header = vec![Span::styled(
        viewer
            .current_user()
            .map(|u| u.name.clone())
            .unwrap_or_default(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    let marker = match viewer.phase() {
        PlaybackPhase::Paused(_) => Some("[paused]"),
        PlaybackPhase::Stopped(_) => Some("[stopped]"),
        _ => None,
    };
    if let Some(marker) = marker {
        header.push(Span::raw("  "));
        header.push(Span::styled(
            marker,
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[1]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors.border));
    let body = match viewer.phase() {
        PlaybackPhase::LoadingStory => Text::from(format!("{} Loading story...", app.spinner())),
        PlaybackPhase::Error => Text::from(Span::styled(
            format!("Error: {}", viewer.error().unwrap_or_default()),
            Style::default().fg(colors.error),
        )),
        PlaybackPhase::Finished => Text::from(""),
        PlaybackPhase::Playing(index)
        | PlaybackPhase::Paused(index)
        | PlaybackPhase::Stopped(index) => match viewer.current_item() {
            Some(item) => {
                let total = viewer.story().map(|s| s.len()).unwrap_or_default();
                Text::from(vec![
                    Line::from(Span::styled(
                        "[ image ]",
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        item.image_url.clone(),
                        Style::default().fg(colors.border),
                    )),
                    Line::from(""),
                    Line::from(format!("{} / {}", index + 1, total)),
                ])
            }
            None => Text::from("No story items available."),
        },
    };
    let image = Paragraph::new(body)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(image, chunks[2]);

    if viewer.current_item().is_some() {
        let heart = if viewer.is_current_item_liked() {
            Span::styled("♥ Liked", Style::default().fg(colors.liked))
        } else {
            Span::raw("♡ Like")
        };
        frame.render_widget(Paragraph::new(Line::from(heart)), chunks[3]);
    }

    render_status_bar(
        frame,
        app,
        colors,
        chunks[4],
        "h/l:Item  k/j:User  Space:Pause  f:Like  o:Open  Esc:Close",
    );
}

fn render_segments(frame: &mut Frame, segments: &[f64], colors: &ColorConfig, area: Rect) {
    if segments.is_empty() {
        return;
    }
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            segments
                .iter()
                .map(|_| Constraint::Ratio(1, segments.len() as u32)),
        )
        .spacing(1)
        .split(area);

    for (fill, cell) in segments.iter().zip(cells.iter()) {
        let gauge = Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(colors.progress_filled)
                    .bg(colors.progress_empty),
            )
            .ratio(fill.clamp(0.0, 1.0))
            .label("");
        frame.render_widget(gauge, *cell);
    }
}

fn render_status_bar(
    frame: &mut Frame,
    app: &TuiApp,
    colors: &ColorConfig,
    area: Rect,
    hints: &str,
) {
    let status = app.status_message.as_deref().unwrap_or(hints);
    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));
    frame.render_widget(paragraph, area);
}

fn centered_row(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
