pub mod coin;
pub mod countdown;
pub mod hour_picker;
pub mod minute_slider;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::Instant;

use crate::app::{App, Stage};
use crate::flow::{FlowController, FlowStep};

const HORIZONTAL_MARGIN: u16 = 2;

/// Screen areas shared by rendering and mouse hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub title: Rect,
    pub body: Rect,
    /// The step's main button
    pub status: Rect,
    pub help: Rect,
}

pub fn regions(area: Rect) -> Regions {
    let [title, body, status, help] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .horizontal_margin(HORIZONTAL_MARGIN)
    .areas(area);

    Regions {
        title,
        body,
        status,
        help,
    }
}

pub fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.right() && row >= rect.y && row < rect.bottom()
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// Primary action line, rendered like a button
pub(crate) fn render_button(f: &mut Frame, area: Rect, text: String, enabled: bool, color: Color) {
    let style = if enabled {
        bold().fg(Color::Black).bg(color)
    } else {
        dim()
    };
    let button = Paragraph::new(Span::styled(format!(" {text} "), style)).alignment(Alignment::Center);
    f.render_widget(button, area);
}

pub(crate) fn render_help(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(Span::styled(
        text.to_string(),
        dim().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(help, area);
}

fn step_number(step: FlowStep) -> u8 {
    match step {
        FlowStep::Hour => 1,
        FlowStep::Minute => 2,
        FlowStep::AmPm => 3,
        FlowStep::Done => 4,
    }
}

fn render_title(flow: &FlowController, f: &mut Frame, area: Rect) {
    let value = |v: Option<String>| v.unwrap_or_else(|| "--".to_string());
    let title = Line::from(vec![
        Span::styled("alarmhunt", bold().fg(Color::Magenta)),
        Span::styled(
            format!("  step {}/4  ", step_number(flow.step())),
            dim(),
        ),
        Span::raw(format!(
            "hour {}  minute {}  {}",
            value(flow.hour().map(|h| h.to_string())),
            value(flow.minute().map(|m| format!("{m:02}"))),
            value(flow.meridiem().map(|m| m.to_string())),
        )),
    ]);
    f.render_widget(Paragraph::new(title).alignment(Alignment::Center), area);
}

pub fn draw(app: &mut App, f: &mut Frame) {
    let area = f.area();
    app.set_viewport(area);
    let regions = regions(area);

    render_title(app.flow(), f, regions.title);
    match app.stage() {
        Stage::Hour(picker) => hour_picker::render(picker, f, &regions, Instant::now()),
        Stage::Minute(slider) => minute_slider::render(slider, f, &regions),
        Stage::AmPm(coin) => coin::render(coin, app.flow(), f, &regions),
        Stage::Done(clock) => countdown::render(clock, f, &regions),
    }
}
