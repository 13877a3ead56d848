//! TUI rendering for Pokedex using ratatui.

mod input;
mod theme;
mod view;

pub use input::{InputPump, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};
pub use view::PokemonView;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use pokedex_engine::{App, BoundaryState, EXAMPLE_POKEMON, RequestStatus};

const FORM_HEIGHT: u16 = 4;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(FORM_HEIGHT), // Search form
            Constraint::Min(3),              // Info panel
            Constraint::Length(1),           // Status bar
        ])
        .split(frame.area());

    draw_form(frame, app, chunks[0], &palette, &glyphs);
    draw_info(frame, app, chunks[1], &palette, &glyphs);
    draw_status_bar(frame, app, chunks[2], &palette, &glyphs);
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let prefix = format!(" {} ", glyphs.prompt);
    let prefix_width = prefix.width() as u16;

    let mut examples = vec![Span::styled(" Try ", styles::key_hint(palette))];
    for (idx, name) in EXAMPLE_POKEMON.iter().enumerate() {
        if idx > 0 {
            examples.push(Span::styled(", ", styles::key_hint(palette)));
        }
        examples.push(Span::styled(
            *name,
            Style::default().fg(palette.accent),
        ));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(palette.primary)),
            Span::styled(
                app.input().text().to_string(),
                Style::default().fg(palette.text_primary),
            ),
        ]),
        Line::from(examples),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .title(Span::styled(
            " Pokedex ",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);

    let cursor_x = area
        .x
        .saturating_add(1 + prefix_width)
        .saturating_add(app.input().before_cursor().width() as u16)
        .min(area.right().saturating_sub(2));
    frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
}

fn draw_info(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let spinner = spinner_frame(app.tick_count(), app.ui_options());
    let mut view = PokemonView::new(*palette, *glyphs, spinner);
    let lines = app.render_info(&mut view);

    let border_color = match app.boundary_state() {
        BoundaryState::Failed => palette.error,
        BoundaryState::Healthy => palette.bg_border,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::horizontal(1))
        .title(Span::styled(" Info ", Style::default().fg(palette.text_secondary)));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let (status_text, status_color) = match (app.boundary_state(), app.request_status()) {
        (BoundaryState::Failed, _) => (format!("{} failed", glyphs.error), palette.error),
        (_, RequestStatus::Pending) => (
            format!(
                "{} loading {}",
                spinner_frame(app.tick_count(), app.ui_options()),
                app.submitted()
            ),
            palette.primary,
        ),
        (_, RequestStatus::Resolved) => (format!("{} resolved", glyphs.resolved), palette.success),
        (_, RequestStatus::Rejected) => (format!("{} rejected", glyphs.error), palette.warning),
        (_, RequestStatus::Idle) => ("idle".to_string(), palette.text_secondary),
    };

    let sep = format!(" {} ", glyphs.separator);
    let line = Line::from(vec![
        Span::styled(format!(" {status_text}"), Style::default().fg(status_color)),
        Span::styled(sep.clone(), styles::key_hint(palette)),
        Span::styled(format!("mount {}", app.mount_id()), styles::key_hint(palette)),
        Span::styled(sep, styles::key_hint(palette)),
        Span::styled("Enter", styles::key_highlight(palette)),
        Span::styled(" search  ", styles::key_hint(palette)),
        Span::styled("Tab", styles::key_highlight(palette)),
        Span::styled(" example  ", styles::key_hint(palette)),
        Span::styled("Ctrl+R", styles::key_highlight(palette)),
        Span::styled(" try again  ", styles::key_hint(palette)),
        Span::styled("Esc", styles::key_highlight(palette)),
        Span::styled(" quit", styles::key_hint(palette)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
