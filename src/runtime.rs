use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

/// What the app loop reacts to
#[derive(Clone, Debug)]
pub enum AlarmEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait AlarmEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AlarmEvent, RecvTimeoutError>;
}

/// Keeps the events the app cares about. Key releases and bare mouse
/// motion would only wake the loop for nothing.
pub fn translate(event: CtEvent) -> Option<AlarmEvent> {
    match event {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(AlarmEvent::Key(key)),
        CtEvent::Mouse(mouse) if !matches!(mouse.kind, MouseEventKind::Moved) => {
            Some(AlarmEvent::Mouse(mouse))
        }
        CtEvent::Resize(_, _) => Some(AlarmEvent::Resize),
        _ => None,
    }
}

/// Events delivered over an mpsc channel. The crossterm reader thread and
/// tests both feed one of these.
pub struct ChannelEventSource {
    rx: Receiver<AlarmEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AlarmEvent>) -> Self {
        Self { rx }
    }

    /// A source plus the sender that feeds it
    pub fn pair() -> (Sender<AlarmEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    /// Spawns the thread that reads the real terminal
    pub fn crossterm() -> Self {
        let (tx, source) = Self::pair();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(evt) => evt,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if let Some(evt) = translate(evt) {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        source
    }
}

impl AlarmEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AlarmEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the application one event at a time, yielding `Tick` when the
/// source stays quiet for a whole tick
pub struct Runner<E: AlarmEventSource> {
    event_source: E,
    tick: Duration,
}

impl<E: AlarmEventSource> Runner<E> {
    pub fn new(event_source: E, tick: Duration) -> Self {
        Self { event_source, tick }
    }

    pub fn step(&self) -> AlarmEvent {
        match self.event_source.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                AlarmEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers, MouseButton};

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn quiet_source_yields_ticks() {
        let (_tx, source) = ChannelEventSource::pair();
        let runner = Runner::new(source, Duration::from_millis(1));
        assert!(matches!(runner.step(), AlarmEvent::Tick));
    }

    #[test]
    fn queued_events_come_out_in_order() {
        let (tx, source) = ChannelEventSource::pair();
        tx.send(AlarmEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
            .unwrap();
        tx.send(AlarmEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left))))
            .unwrap();
        tx.send(AlarmEvent::Resize).unwrap();
        let runner = Runner::new(source, Duration::from_millis(10));

        assert!(matches!(runner.step(), AlarmEvent::Key(k) if k.code == KeyCode::Enter));
        assert!(matches!(runner.step(), AlarmEvent::Mouse(m) if (m.column, m.row) == (3, 4)));
        assert!(matches!(runner.step(), AlarmEvent::Resize));
        assert!(matches!(runner.step(), AlarmEvent::Tick));
    }

    #[test]
    fn closed_source_degrades_to_ticks() {
        let (tx, source) = ChannelEventSource::pair();
        drop(tx);
        let runner = Runner::new(source, Duration::from_millis(1));
        assert!(matches!(runner.step(), AlarmEvent::Tick));
    }

    #[test]
    fn translate_drops_noise() {
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(translate(CtEvent::Key(release)).is_none());
        assert!(translate(CtEvent::Mouse(mouse(MouseEventKind::Moved))).is_none());
        assert!(translate(CtEvent::FocusGained).is_none());

        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(matches!(translate(CtEvent::Key(press)), Some(AlarmEvent::Key(_))));
        assert!(matches!(
            translate(CtEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left)))),
            Some(AlarmEvent::Mouse(_))
        ));
        assert!(matches!(translate(CtEvent::Resize(80, 24)), Some(AlarmEvent::Resize)));
    }
}
