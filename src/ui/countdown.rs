use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::countdown::CountdownClock;
use crate::ui::{bold, centered, contains, dim, render_button, render_help, Regions};

const ALARM_HEADLINE: &str = "TIME'S UP";

pub fn render(clock: &CountdownClock, f: &mut Frame, regions: &Regions) {
    let block = Block::bordered()
        .title(" Step 4: Alarm Set ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(regions.body);
    f.render_widget(block, regions.body);

    let remaining = clock.remaining();
    let digits = bold().fg(Color::Cyan);
    let unit = Style::default().fg(Color::LightCyan);

    let lines = vec![
        Line::from(Span::styled("Alarm set for", dim())),
        Line::from(Span::styled(clock.target().to_string(), bold().fg(Color::Green))),
        Line::default(),
        Line::from(Span::styled("Time left", dim())),
        Line::from(vec![
            Span::styled(format!("{:02}", remaining.hours), digits),
            Span::styled(" : ", dim()),
            Span::styled(format!("{:02}", remaining.minutes), digits),
            Span::styled(" : ", dim()),
            Span::styled(format!("{:02}", remaining.seconds), digits),
        ]),
        Line::from(Span::styled("hrs    min    sec", unit)),
        Line::default(),
        Line::from(Span::styled(
            "If this is the best time you could pick for an alarm, I'm a bit worried about you.",
            dim().add_modifier(Modifier::ITALIC),
        )),
    ];

    let top = inner.y + inner.height.saturating_sub(lines.len() as u16) / 2;
    let content = Rect::new(inner.x, top, inner.width, inner.bottom() - top);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        content,
    );

    render_button(
        f,
        regions.status,
        "[Enter] Start over, try again".to_string(),
        true,
        Color::Red,
    );
    render_help(f, regions.help, "Enter/r start over · Esc quit");

    if clock.is_triggered() {
        render_alarm_popup(clock, f, regions.body);
    }
}

/// Clickable lines of the alarm popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    EnableSound,
    Dismiss,
}

fn popup_lines(clock: &CountdownClock) -> Vec<(Line<'static>, Option<PopupAction>)> {
    let mut lines = vec![
        (
            Line::from(Span::styled(
                ALARM_HEADLINE,
                bold().fg(Color::Red).add_modifier(Modifier::SLOW_BLINK),
            )),
            None,
        ),
        (
            Line::from(Span::styled("Did you study for the quiz yet?", bold())),
            None,
        ),
        (Line::default(), None),
    ];
    if clock.is_sound_blocked() {
        lines.push((
            Line::from(Span::styled(
                "[e] no sound? enable it",
                bold().fg(Color::Black).bg(Color::Yellow),
            )),
            Some(PopupAction::EnableSound),
        ));
    }
    lines.push((
        Line::from(Span::styled(
            "[d] somebody make it stop",
            bold().fg(Color::White).bg(Color::Red),
        )),
        Some(PopupAction::Dismiss),
    ));
    lines
}

fn popup_rect(lines: &[(Line<'static>, Option<PopupAction>)], body: Rect) -> Rect {
    let width = lines
        .iter()
        .map(|(l, _)| l.spans.iter().map(|s| s.content.as_ref().width()).sum::<usize>())
        .max()
        .unwrap_or(0) as u16
        + 6;
    centered(body, width, lines.len() as u16 + 2)
}

/// What a click at `col`/`row` means while the alarm popup is up
pub fn popup_action_at(clock: &CountdownClock, body: Rect, col: u16, row: u16) -> Option<PopupAction> {
    if !clock.is_triggered() {
        return None;
    }
    let lines = popup_lines(clock);
    let inner = Block::bordered().inner(popup_rect(&lines, body));
    if !contains(inner, col, row) {
        return None;
    }
    lines
        .get(usize::from(row - inner.y))
        .and_then(|(_, action)| *action)
}

fn render_alarm_popup(clock: &CountdownClock, f: &mut Frame, body: Rect) {
    let lines = popup_lines(clock);
    let popup = popup_rect(&lines, body);

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines.into_iter().map(|(l, _)| l).collect::<Vec<_>>())
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .title(format!(" {} ", clock.target()))
                    .border_style(bold().fg(Color::Red)),
            ),
        popup,
    );
}
