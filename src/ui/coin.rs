use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};

use crate::alarm::Meridiem;
use crate::coin::{CoinFlipChooser, CoinState};
use crate::flow::FlowController;
use crate::ui::{bold, dim, render_button, render_help, Regions};

fn meridiem_color(m: Meridiem) -> Color {
    match m {
        Meridiem::Am => Color::Yellow,
        Meridiem::Pm => Color::Blue,
    }
}

/// Each half turn flips which face points at the viewer
fn coin_face(coin: &CoinFlipChooser) -> Span<'static> {
    let face = coin.showing();
    Span::styled(
        format!("( {} {} )", face.icon(), face),
        bold().fg(meridiem_color(face)),
    )
}

pub fn render(coin: &CoinFlipChooser, flow: &FlowController, f: &mut Frame, regions: &Regions) {
    let block = Block::bordered()
        .title(" Step 3: Surprise! AM or PM? ")
        .border_style(Style::default().fg(Color::Rgb(205, 127, 50)));
    let inner = block.inner(regions.body);
    f.render_widget(block, regions.body);

    let time = format!(
        "{:02}:{:02}",
        flow.hour().unwrap_or(0),
        flow.minute().unwrap_or(0)
    );
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Time: "),
            Span::styled(time, bold()),
            Span::raw(" ... but AM or PM?"),
        ]),
        Line::default(),
    ];

    match (coin.state(), coin.result()) {
        (CoinState::Flipping, _) => {
            lines.push(Line::from(coin_face(coin)));
            lines.push(Line::from(Span::styled("spinning...", dim())));
        }
        (CoinState::Settled, Some(result)) => {
            lines.push(Line::from(Span::styled("The coin has spoken", dim())));
            lines.push(Line::from(Span::styled(
                format!("{} {}", result.icon(), result),
                bold().fg(meridiem_color(result)),
            )));
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "Leave it to fate: toss the coin",
                dim(),
            )));
        }
    }

    let top = inner.y + inner.height.saturating_sub(lines.len() as u16) / 2;
    let content = Rect::new(inner.x, top, inner.width, inner.bottom() - top);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        content,
    );

    let (button, enabled) = match (coin.state(), coin.result()) {
        (CoinState::Flipping, _) => ("Spinning...".to_string(), false),
        (CoinState::Settled, Some(result)) => (
            format!("[Enter] Fine, {result}  ·  [Space] toss again"),
            true,
        ),
        _ => ("[Space] Toss the coin".to_string(), true),
    };
    render_button(f, regions.status, button, enabled, Color::Green);
    render_help(
        f,
        regions.help,
        "Space/t or click toss · Enter accept · Ctrl-R start over · Esc quit",
    );
}
