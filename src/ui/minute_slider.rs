use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::shuffle::ShuffledSequencePicker;
use crate::ui::{bold, contains, dim, render_button, render_help, Regions};

pub fn track_rect(body: Rect) -> Rect {
    let inner = Block::bordered().inner(body);
    let row = (inner.y + inner.height / 2 + 1).min(inner.bottom().saturating_sub(1));
    Rect::new(
        inner.x + 2.min(inner.width),
        row,
        inner.width.saturating_sub(4),
        inner.height.min(1),
    )
}

/// Slider index under a click on the track
pub fn index_at(track: Rect, len: usize, col: u16, row: u16) -> Option<usize> {
    if len == 0 || !contains(track, col, row) {
        return None;
    }
    let span = f64::from(track.width.saturating_sub(1).max(1));
    let frac = f64::from(col - track.x) / span;
    Some(((frac * (len - 1) as f64).round() as usize).min(len - 1))
}

fn knob_offset(track: Rect, index: usize, len: usize) -> u16 {
    if len <= 1 {
        return 0;
    }
    let frac = index as f64 / (len - 1) as f64;
    (frac * f64::from(track.width.saturating_sub(1))).round() as u16
}

pub fn render(slider: &ShuffledSequencePicker, f: &mut Frame, regions: &Regions) {
    let accent = if slider.is_locked() {
        Color::Green
    } else {
        Color::Cyan
    };
    let block = Block::bordered()
        .title(" Step 2: Guess(??) the Minute ")
        .border_style(Style::default().fg(accent));
    let inner = block.inner(regions.body);
    f.render_widget(block, regions.body);

    let track = track_rect(regions.body);
    if track.height == 0 || track.y < inner.y + 2 {
        return;
    }

    let display = Paragraph::new(Line::from(Span::styled(
        format!("{:02}", slider.current()),
        bold().fg(accent),
    )))
    .alignment(Alignment::Center);
    f.render_widget(display, Rect::new(inner.x, track.y - 2, inner.width, 1));

    let knob = usize::from(knob_offset(track, slider.index(), slider.len()));
    let width = usize::from(track.width);
    let line = Line::from(vec![
        Span::styled("━".repeat(knob), Style::default().fg(accent)),
        Span::styled("●", bold().fg(Color::White)),
        Span::styled("─".repeat(width.saturating_sub(knob + 1)), dim()),
    ]);
    f.render_widget(Paragraph::new(line), track);

    if let Some(minute) = slider.confirmed() {
        let locked = Paragraph::new(Span::styled(format!("Minute Locked: {minute}"), bold().fg(Color::Green)))
            .alignment(Alignment::Center);
        if track.bottom() < inner.bottom() {
            f.render_widget(locked, Rect::new(inner.x, track.y + 1, inner.width, 1));
        }
    }

    let button = match slider.confirmed() {
        Some(minute) => format!("Minute Confirmed: {minute}"),
        None => format!("[Enter] Confirm Minute {:02}", slider.current()),
    };
    render_button(f, regions.status, button, !slider.is_locked(), Color::Cyan);
    render_help(
        f,
        regions.help,
        "←/→ slide · PgUp/PgDn jump · click the track · Enter confirm · Esc quit",
    );
}
