use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Paragraph},
    Frame,
};
use std::time::Instant;

use crate::hour_picker::HourPicker;
use crate::layout::{LayoutArea, Position};
use crate::ui::{bold, contains, render_button, render_help, Regions};

pub const BUTTON_WIDTH: u16 = 4;

/// Inside the border, below the shuffle countdown bar
pub fn field(body: Rect) -> Rect {
    let inner = Block::bordered().inner(body);
    Rect {
        y: inner.y.saturating_add(1).min(inner.bottom()),
        height: inner.height.saturating_sub(1),
        ..inner
    }
}

fn normalized(v: f64, min: f64, max: f64) -> f64 {
    if max > min {
        ((v - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Maps a layout position onto terminal cells. The layout's placement
/// bounds stretch across the whole field.
pub fn button_rect(body: Rect, pos: &Position, area: &LayoutArea) -> Rect {
    let field = field(body);
    let bounds = area.bounds();
    let width = BUTTON_WIDTH.min(field.width);

    let fx = normalized(pos.x, bounds.min_x, bounds.max_x);
    let fy = normalized(pos.y, bounds.min_y, bounds.max_y);
    let col = field.x + (fx * f64::from(field.width - width)).round() as u16;
    let row = field.y + (fy * f64::from(field.height.saturating_sub(1))).round() as u16;

    Rect::new(col, row, width, field.height.min(1))
}

/// Buttons drawn later sit on top, so they win the hit test
pub fn hour_at(picker: &HourPicker, body: Rect, col: u16, row: u16) -> Option<u8> {
    let area = picker.generator().area();
    picker
        .positions()
        .iter()
        .rev()
        .find(|p| contains(button_rect(body, p, area), col, row))
        .map(|p| p.label)
}

pub fn render(picker: &HourPicker, f: &mut Frame, regions: &Regions, now: Instant) {
    let accent = if picker.is_locked() {
        Color::Green
    } else {
        Color::Magenta
    };
    let block = Block::bordered()
        .title(" Step 1: Hunt(!!) the Hour ")
        .border_style(Style::default().fg(accent));
    let inner = block.inner(regions.body);
    f.render_widget(block, regions.body);

    if picker.is_shuffling() && inner.height > 0 {
        let left = 1.0 - picker.shuffle_progress(now);
        let cells = (f64::from(inner.width) * left).round() as usize;
        let bar = Paragraph::new(Span::styled("━".repeat(cells), Style::default().fg(accent)));
        f.render_widget(bar, Rect { height: 1, ..inner });
    }

    let area = picker.generator().area();
    for pos in picker.positions() {
        let rect = button_rect(regions.body, pos, area);
        let style = if picker.confirmed() == Some(pos.label) {
            bold().fg(Color::Black).bg(Color::Green)
        } else if picker.selected() == Some(pos.label) {
            bold().fg(Color::White).bg(Color::Magenta)
        } else if picker.is_locked() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            bold()
        };
        let label = Paragraph::new(Span::styled(format!("[{:>2}]", pos.label), style));
        f.render_widget(label, rect);
    }

    let button = match (picker.confirmed(), picker.selected()) {
        (Some(hour), _) => format!("Hour Confirmed: {hour}"),
        (None, Some(hour)) => format!("[Enter] Confirm Hour {hour}"),
        (None, None) => "Catch an hour first".to_string(),
    };
    render_button(
        f,
        regions.status,
        button,
        picker.selected().is_some() && !picker.is_locked(),
        Color::Magenta,
    );
    render_help(
        f,
        regions.help,
        "click a number or Tab/arrows to cycle · Enter confirm · Ctrl-R start over · Esc quit",
    );
}
