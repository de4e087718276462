use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::machine::{MachineState, ProgressState, SessionMachine, TimerState};
use crate::metrics;
use crate::settings::{EffectiveSettings, GlobalSettings};

const HORIZONTAL_MARGIN: u16 = 2;
const SIDEBAR_WIDTH: u16 = 30;

const KEY_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Read-only view over the machine snapshot and the global settings.
/// Rendering never mutates the session context.
pub struct SessionView<'a> {
    pub machine: &'a SessionMachine,
    pub settings: &'a GlobalSettings,
}

impl Widget for SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let effective = EffectiveSettings::resolve(self.settings, self.machine.context());

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
            .split(area);

        self.render_main(chunks[0], buf, &effective);
        self.render_sidebar(chunks[1], buf, &effective);
    }
}

impl SessionView<'_> {
    fn render_main(&self, area: Rect, buf: &mut Buffer, effective: &EffectiveSettings) {
        let ctx = self.machine.context();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let keyboard_lines = if effective.keyboard_visible { 5 } else { 0 };
        let hint_lines = if effective.tutor_active { 1 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(hint_lines),
                Constraint::Length(keyboard_lines),
            ])
            .split(area);

        self.render_status(chunks[0], buf);

        if let Some(text) = ctx.lesson_text.as_deref() {
            let prompt = lesson_spans(text, ctx.cursor_position);
            let alignment = if text.width() <= (area.width.saturating_sub(4)) as usize {
                Alignment::Center
            } else {
                Alignment::Left
            };
            Paragraph::new(Line::from(prompt))
                .alignment(alignment)
                .wrap(Wrap { trim: false })
                .render(chunks[1], buf);
        } else {
            Paragraph::new(Span::styled("Welcome to MecaMatic", dim_bold_style))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
        }

        if effective.tutor_active {
            self.render_tutor_hint(chunks[2], buf);
        }
        if effective.keyboard_visible {
            self.render_keyboard(chunks[3], buf);
        }
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let ctx = self.machine.context();
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let status = match self.machine.state() {
            MachineState::Default => Span::styled("Select an exercise", italic_style),
            MachineState::Exercise { progress, .. } => match progress {
                ProgressState::NotStarted => {
                    Span::styled("Press Enter to begin", italic_style.fg(Color::Yellow))
                }
                ProgressState::Ongoing => Span::styled(
                    match (ctx.category.as_deref(), ctx.lesson_number, ctx.exercise_number) {
                        (Some(category), Some(lesson), Some(exercise)) => {
                            format!("{} - Lesson {} - Exercise {}", category, lesson, exercise)
                        }
                        (Some(category), None, Some(exercise)) => {
                            format!("{} - Exercise {}", category, exercise)
                        }
                        _ => String::new(),
                    },
                    italic_style,
                ),
                ProgressState::Finished => Span::styled(
                    "Exercise completed successfully",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            },
        };

        Paragraph::new(status)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_tutor_hint(&self, area: Rect, buf: &mut Buffer) {
        let hint = match self.expected_key() {
            Some(ExpectedKey::Enter) => Some("next: Enter".to_string()),
            Some(ExpectedKey::Char(' ')) => Some("next: Space".to_string()),
            Some(ExpectedKey::Char(c)) => Some(format!("next: {}", c)),
            None => None,
        };

        if let Some(hint) = hint {
            Paragraph::new(Span::styled(
                hint,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
        }
    }

    fn render_keyboard(&self, area: Rect, buf: &mut Buffer) {
        let expected = self.expected_key();

        let mut lines = Vec::with_capacity(KEY_ROWS.len() + 1);
        for row in KEY_ROWS {
            let mut spans = Vec::with_capacity(row.len() * 2);
            for key in row.chars() {
                let highlighted =
                    matches!(expected, Some(ExpectedKey::Char(c)) if c.eq_ignore_ascii_case(&key));
                spans.push(key_cap(&key.to_string(), highlighted));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(vec![
            key_cap("space", matches!(expected, Some(ExpectedKey::Char(' ')))),
            Span::raw(" "),
            key_cap("enter", matches!(expected, Some(ExpectedKey::Enter))),
        ]));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP))
            .render(area, buf);
    }

    fn render_sidebar(&self, area: Rect, buf: &mut Buffer, effective: &EffectiveSettings) {
        let ctx = self.machine.context();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        // Counters are only meaningful while the exercise runs or after
        // it finished; otherwise the cells stay blank.
        let show_results = matches!(
            self.machine.progress_state(),
            Some(ProgressState::Ongoing) | Some(ProgressState::Finished)
        );

        let typed = ctx.typed_count();
        let gross = fmt_when(show_results, || ctx.total_gross_keystrokes.to_string());
        let net = fmt_when(show_results, || ctx.total_net_keystrokes.to_string());
        let errors = fmt_when(show_results, || ctx.errors.to_string());
        let error_pct = fmt_when(show_results, || {
            metrics::error_percentage(ctx.errors, typed)
                .map(|p| format!("{:.1}", p))
                .unwrap_or_default()
        });
        let wpm = fmt_when(show_results, || {
            metrics::net_wpm(typed, ctx.elapsed_seconds, ctx.errors)
                .map(|w| w.to_string())
                .unwrap_or_default()
        });

        let timer_suffix = match self.machine.timer_state() {
            Some(TimerState::Stopped) => " (stopped)",
            _ => "",
        };

        let lines = vec![
            Line::from(Span::styled("Target values", bold_style)),
            Line::from(format!(
                "  max errors   {:.1} %",
                effective.errors_coefficient
            )),
            Line::from(format!("  min speed    {:.0} wpm", effective.minimum_wpm)),
            Line::from(""),
            Line::from(Span::styled("Results", bold_style)),
            Line::from(format!("  gross keys   {}", gross)),
            Line::from(format!("  net keys     {}", net)),
            Line::from(format!("  errors       {}", errors)),
            Line::from(format!("  errors %     {}", error_pct)),
            Line::from(format!("  speed (wpm)  {}", wpm)),
            Line::from(""),
            Line::from(format!(
                "  time  {:02}:{:02}{}",
                ctx.elapsed_seconds / 60,
                ctx.elapsed_seconds % 60,
                timer_suffix
            )),
        ];

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::LEFT))
            .render(area, buf);
    }

    fn expected_key(&self) -> Option<ExpectedKey> {
        let ctx = self.machine.context();
        match self.machine.progress_state()? {
            ProgressState::NotStarted => Some(ExpectedKey::Enter),
            ProgressState::Ongoing => ctx.char_at(ctx.cursor_position).map(ExpectedKey::Char),
            ProgressState::Finished => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExpectedKey {
    Enter,
    Char(char),
}

fn key_cap(label: &str, highlighted: bool) -> Span<'static> {
    let style = if highlighted {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("[{}]", label), style)
}

fn fmt_when(show: bool, f: impl FnOnce() -> String) -> String {
    if show {
        f()
    } else {
        String::new()
    }
}

/// Styled spans for the lesson text: typed characters, the character
/// under the cursor, and the pending tail.
fn lesson_spans(text: &str, cursor: i32) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let cursor_style = Style::default()
        .patch(bold_style)
        .fg(Color::Black)
        .bg(Color::LightRed);

    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let i = i as i32;
            if i < cursor {
                Span::styled(c.to_string(), green_bold_style)
            } else if i == cursor {
                Span::styled(c.to_string(), cursor_style)
            } else {
                Span::styled(c.to_string(), dim_bold_style)
            }
        })
        .collect()
}
