use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState, Notice};

const HORIZONTAL_MARGIN: u16 = 2;
/// Words past this fraction of their stay are drawn as about to expire.
const EXPIRY_WARNING: f64 = 0.75;

/// Splits the screen into header lines, the words pane and footer lines.
fn layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1), // score
                Constraint::Length(1), // typed letters
                Constraint::Length(1), // last hit / miss
                Constraint::Min(0),    // words
                Constraint::Length(1), // settings
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area)
}

/// Inner area of the words pane; the game viewport in cells.
pub fn words_area(area: Rect) -> Rect {
    Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .inner(layout(area)[3])
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        match self.state {
            AppState::Playing => {
                let chunks = layout(area);

                Paragraph::new(Span::styled(
                    format!("score {}", self.score_label),
                    bold_style.fg(Color::Cyan),
                ))
                .alignment(Alignment::Center)
                .render(chunks[0], buf);

                Paragraph::new(Span::styled(
                    self.typed_label.clone(),
                    bold_style.fg(Color::White),
                ))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);

                if let Some(notice) = &self.notice {
                    let span = match notice {
                        Notice::Hit(text) => {
                            Span::styled(format!("+1 {text}"), Style::default().fg(Color::Green))
                        }
                        Notice::Missed(text) => Span::styled(
                            format!("missed {text}"),
                            Style::default().fg(Color::Red),
                        ),
                    };
                    Paragraph::new(span)
                        .alignment(Alignment::Center)
                        .render(chunks[2], buf);
                }

                let pane = Block::default()
                    .borders(Borders::TOP | Borders::BOTTOM)
                    .border_style(dim_style);
                let inner = pane.inner(chunks[3]);
                pane.render(chunks[3], buf);
                self.render_words(inner, buf);

                let settings = self.session.settings();
                Paragraph::new(Span::styled(
                    format!(
                        "spawn {} / min   stay {}s   missed {}",
                        settings.words_per_minute,
                        settings.stay_duration.as_secs(),
                        self.missed
                    ),
                    dim_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);

                Paragraph::new(Span::styled(
                    "(↑/↓) spawn rate / (←/→) stay / (esc) stop",
                    italic_style,
                ))
                .render(chunks[5], buf);
            }
            AppState::GameOver => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints(
                        [
                            Constraint::Percentage(40),
                            Constraint::Length(1),
                            Constraint::Length(1),
                            Constraint::Length(1),
                            Constraint::Length(1),
                            Constraint::Min(0),
                        ]
                        .as_ref(),
                    )
                    .split(area);

                Paragraph::new(Span::styled("GAME OVER", bold_style.fg(Color::Magenta)))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);

                Paragraph::new(Span::styled(
                    format!(
                        "{} words   {} wpm   {} missed",
                        self.session.score(),
                        self.final_wpm.round(),
                        self.missed
                    ),
                    bold_style,
                ))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(chunks[2], buf);

                Paragraph::new(Span::styled("(n)ew / (esc)ape", italic_style))
                    .alignment(Alignment::Center)
                    .render(chunks[4], buf);
            }
        }
    }
}

impl App {
    fn render_words(&self, pane: Rect, buf: &mut Buffer) {
        if pane.width == 0 || pane.height == 0 {
            return;
        }

        let typed = self.typed_label.as_str();
        for word in self.session.active_words() {
            let p = word.progress(self.now);
            let x = word.start.x + (word.end.x - word.start.x) * p;
            let y = word.start.y + (word.end.y - word.start.y) * p;

            let width = word.text.width() as u16;
            let max_x = pane.width.saturating_sub(width);
            let col = pane.x + (x.max(0.0) as u16).min(max_x);
            let row = pane.y + (y.max(0.0) as u16).min(pane.height - 1);

            let rest_style = if p >= EXPIRY_WARNING {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            };

            let line = if !typed.is_empty() && word.text.starts_with(typed) {
                let typed_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
                Line::from(vec![
                    Span::styled(typed, typed_style),
                    Span::styled(&word.text[typed.len()..], rest_style),
                ])
            } else {
                Line::from(Span::styled(word.text.as_str(), rest_style))
            };

            buf.set_line(col, row, &line, pane.right().saturating_sub(col));
        }
    }
}
