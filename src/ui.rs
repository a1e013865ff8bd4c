use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};
use crate::session::GameSession;
use crate::timer::Clock;

const HORIZONTAL_MARGIN: u16 = 5;
const WORD_PADDING: u16 = 4;
// below this many seconds the clock turns red
const HURRY_SECS: u64 = 10;

/// Final score shown after the countdown runs out
#[derive(Debug, Clone, Copy)]
pub struct ScoreView {
    pub score: i32,
    pub round: u64,
}

pub fn draw<C: Clock + Clone>(app: &App<C>, f: &mut Frame) {
    match app.state {
        AppState::Playing => f.render_widget(&app.session, f.area()),
        AppState::Score => f.render_widget(
            ScoreView {
                score: app.final_score,
                round: app.rounds,
            },
            f.area(),
        ),
    }
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

impl<C: Clock> Widget for &GameSession<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let clock_style = if self.remaining_time() <= HURRY_SECS {
            Style::default().patch(bold_style).fg(Color::Red)
        } else {
            Style::default().fg(Color::Magenta)
        };
        let score_style = match self.score() {
            s if s > 0 => Style::default().patch(bold_style).fg(Color::Green),
            s if s < 0 => Style::default().patch(bold_style).fg(Color::Red),
            _ => bold_style,
        };

        let content_height = 10;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(area.height.saturating_sub(content_height) / 2),
                Constraint::Length(2), // title
                Constraint::Length(2), // time left
                Constraint::Length(1), // caption
                Constraint::Length(3), // word
                Constraint::Length(2), // score
                Constraint::Min(0),
                Constraint::Length(1), // help
            ])
            .split(area);

        Paragraph::new(Span::styled("GUESS THE WORD", dim_bold_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(self.remaining_time_formatted(), clock_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        Paragraph::new(Span::styled("The word is:", italic_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let word = self.current_word();
        let word_width = word.width() as u16 + WORD_PADDING;
        Paragraph::new(Span::styled(word, bold_style.fg(Color::Cyan)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(centered(chunks[4], word_width), buf);

        Paragraph::new(Line::from(vec![
            Span::raw("Score: "),
            Span::styled(self.score().to_string(), score_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        Paragraph::new(Span::styled(
            "(s)kip / (c)orrect / (esc)ape",
            italic_style.add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
    }
}

impl Widget for ScoreView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(area.height.saturating_sub(6) / 2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Span::styled(
            format!("Round {} over! Final score:", self.round),
            italic_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Span::styled(
            self.score.to_string(),
            bold_style.fg(Color::Yellow),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            "(r)play again / (esc)ape",
            italic_style.add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }
}
