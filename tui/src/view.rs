//! Info panel views for each request state.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use pokedex_core::{RenderError, failure_report};
use pokedex_engine::{Pokemon, QueryKey, Renderer};

use crate::theme::{Glyphs, Palette, styles};

const PLACEHOLDER: &str = "XXX";
const PLACEHOLDER_ATTACKS: usize = 2;
const ATTACK_NAME_WIDTH: usize = 18;
const ATTACK_TYPE_WIDTH: usize = 10;

/// Renders the info panel as styled lines.
#[derive(Debug, Clone, Copy)]
pub struct PokemonView {
    palette: Palette,
    glyphs: Glyphs,
    spinner: &'static str,
}

impl PokemonView {
    #[must_use]
    pub fn new(palette: Palette, glyphs: Glyphs, spinner: &'static str) -> Self {
        Self {
            palette,
            glyphs,
            spinner,
        }
    }

    fn header(&self, name: &str, number: &str, name_style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(name.to_string(), name_style),
            Span::styled(
                format!("  #{number}"),
                Style::default().fg(self.palette.text_secondary),
            ),
        ])
    }

    fn attacks_heading(&self) -> Line<'static> {
        Line::from(Span::styled(
            "Special attacks",
            Style::default()
                .fg(self.palette.text_primary)
                .add_modifier(Modifier::UNDERLINED),
        ))
    }

    fn attack_row(&self, name: &str, kind: &str, damage: &str, style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {} ", self.glyphs.bullet), style),
            Span::styled(format!("{name:<ATTACK_NAME_WIDTH$}"), style),
            Span::styled(format!("{kind:<ATTACK_TYPE_WIDTH$}"), style),
            Span::styled(damage.to_string(), style),
        ])
    }
}

impl Renderer<Pokemon> for PokemonView {
    type Output = Vec<Line<'static>>;

    fn render_idle(&mut self) -> Self::Output {
        vec![Line::from(Span::styled(
            "Submit a pokemon",
            Style::default().fg(self.palette.text_secondary),
        ))]
    }

    fn render_pending(&mut self, key: &QueryKey) -> Self::Output {
        let placeholder = styles::placeholder(&self.palette);
        let mut lines = vec![
            self.header(key.as_str(), PLACEHOLDER, styles::pokemon_name(&self.palette)),
            Line::from(""),
            self.attacks_heading(),
        ];
        for _ in 0..PLACEHOLDER_ATTACKS {
            lines.push(self.attack_row("Loading attack", PLACEHOLDER, PLACEHOLDER, placeholder));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} loading...", self.spinner),
            Style::default().fg(self.palette.primary),
        )));
        lines
    }

    fn render_resolved(&mut self, data: &Pokemon) -> Self::Output {
        let attack_style = Style::default().fg(self.palette.text_primary);
        let mut lines = vec![
            self.header(&data.name, &data.number, styles::pokemon_name(&self.palette)),
            Line::from(""),
            self.attacks_heading(),
        ];

        if data.attacks.special.is_empty() {
            lines.push(Line::from(Span::styled(
                "  none",
                Style::default().fg(self.palette.text_muted),
            )));
        }
        for attack in &data.attacks.special {
            lines.push(self.attack_row(
                &attack.name,
                &attack.kind,
                &attack.damage.to_string(),
                attack_style,
            ));
        }

        if let Some(fetched_at) = &data.fetched_at {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{} fetched at {fetched_at}", self.glyphs.resolved),
                Style::default().fg(self.palette.success),
            )));
        }
        lines
    }

    fn render_rejected(&mut self, error: &RenderError) -> Self::Output {
        let report = failure_report(error);
        let mut lines = vec![Line::from(Span::styled(
            format!("{} {}", self.glyphs.error, report.headline),
            styles::error_headline(&self.palette),
        ))];
        for message in report.message {
            lines.push(Line::from(Span::styled(
                message,
                Style::default().fg(self.palette.error),
            )));
        }
        if let Some(cause) = report.cause {
            lines.push(Line::from(Span::styled(
                format!("cause: {cause}"),
                Style::default().fg(self.palette.text_muted),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Ctrl+R", styles::key_highlight(&self.palette)),
            Span::styled(" Try again", styles::key_hint(&self.palette)),
        ]));
        lines
    }
}
