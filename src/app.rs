use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::layout::Rect;

use crate::audio::AudioPlayer;
use crate::coin::CoinFlipChooser;
use crate::config::Config;
use crate::countdown::CountdownClock;
use crate::flow::{FlowController, FlowStep};
use crate::hour_picker::HourPicker;
use crate::layout::RandomLayoutGenerator;
use crate::schedule::Moment;
use crate::shuffle::ShuffledSequencePicker;
use crate::ui::{self, countdown::PopupAction};

pub type PlayerFactory = Box<dyn Fn() -> Box<dyn AudioPlayer>>;

/// The widget for the active step. Replacing it drops the old widget
/// together with its timers.
#[derive(Debug)]
pub enum Stage {
    Hour(HourPicker),
    Minute(ShuffledSequencePicker),
    AmPm(CoinFlipChooser),
    Done(CountdownClock),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    None,
    Confirm,
    StartOver,
}

pub struct App {
    flow: FlowController,
    stage: Stage,
    config: Config,
    rng: StdRng,
    player_factory: PlayerFactory,
    viewport: Rect,
    should_quit: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("flow", &self.flow)
            .field("stage", &self.stage)
            .field("config", &self.config)
            .field("viewport", &self.viewport)
            .field("should_quit", &self.should_quit)
            .finish()
    }
}

impl App {
    pub fn new(config: Config, at: Moment) -> Self {
        let player_config = config.clone();
        Self::with_parts(
            config,
            StdRng::from_entropy(),
            Box::new(move || player_config.build_player()),
            at,
        )
    }

    pub fn with_parts(config: Config, rng: StdRng, player_factory: PlayerFactory, at: Moment) -> Self {
        let mut rng = rng;
        let stage = Stage::Hour(HourPicker::new(
            RandomLayoutGenerator::default(),
            config.shuffle_interval(),
            &mut rng,
            at.instant,
        ));
        Self {
            flow: FlowController::new(),
            stage,
            config,
            rng,
            player_factory,
            viewport: Rect::new(0, 0, 80, 24),
            should_quit: false,
        }
    }

    pub fn flow(&self) -> &FlowController {
        &self.flow
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Builds the widget for the flow's current step
    fn mount(&mut self, at: Moment) {
        debug_assert!(
            self.flow.step() != FlowStep::Done || self.flow.alarm_time().is_some(),
            "flow reached Done without an alarm time"
        );

        self.stage = match (self.flow.step(), self.flow.alarm_time()) {
            (FlowStep::Done, Some(alarm)) => {
                Stage::Done(CountdownClock::new(alarm, (self.player_factory)(), at))
            }
            (FlowStep::Minute, _) => Stage::Minute(ShuffledSequencePicker::minutes(&mut self.rng)),
            (FlowStep::AmPm, _) => Stage::AmPm(CoinFlipChooser::new()),
            _ => Stage::Hour(HourPicker::new(
                RandomLayoutGenerator::default(),
                self.config.shuffle_interval(),
                &mut self.rng,
                at.instant,
            )),
        };
        tracing::debug!(step = %self.flow.step(), generation = self.flow.generation(), "stage mounted");
    }

    pub fn on_tick(&mut self, at: Moment) {
        match &mut self.stage {
            Stage::Hour(picker) => {
                picker.on_tick(&mut self.rng, at.instant);
            }
            Stage::Minute(_) => {}
            Stage::AmPm(coin) => {
                coin.on_tick(at.instant);
            }
            Stage::Done(clock) => {
                clock.on_tick(at);
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, at: Moment) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('r') if ctrl => {
                self.start_over(at);
                return;
            }
            _ => {}
        }

        let action = match &mut self.stage {
            Stage::Hour(picker) => match key.code {
                KeyCode::Tab | KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                    picker.select_next();
                    Action::None
                }
                KeyCode::BackTab | KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                    picker.select_prev();
                    Action::None
                }
                KeyCode::Enter => Action::Confirm,
                _ => Action::None,
            },
            Stage::Minute(slider) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    slider.step(-1);
                    Action::None
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    slider.step(1);
                    Action::None
                }
                KeyCode::PageDown => {
                    slider.step(-10);
                    Action::None
                }
                KeyCode::PageUp => {
                    slider.step(10);
                    Action::None
                }
                KeyCode::Home => {
                    slider.set_index(0);
                    Action::None
                }
                KeyCode::End => {
                    slider.set_index(slider.len().saturating_sub(1));
                    Action::None
                }
                KeyCode::Enter => Action::Confirm,
                _ => Action::None,
            },
            Stage::AmPm(coin) => match key.code {
                KeyCode::Char(' ') | KeyCode::Char('t') => {
                    coin.toss(&mut self.rng, at.instant);
                    Action::None
                }
                KeyCode::Enter => Action::Confirm,
                _ => Action::None,
            },
            Stage::Done(clock) => match key.code {
                KeyCode::Char('e') => {
                    clock.enable_sound();
                    Action::None
                }
                KeyCode::Enter | KeyCode::Char('d') | KeyCode::Char('r') => Action::StartOver,
                _ => Action::None,
            },
        };

        self.apply(action, at);
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent, at: Moment) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }

        let regions = ui::regions(self.viewport);
        let (col, row) = (mouse.column, mouse.row);
        if ui::contains(regions.status, col, row) {
            let action = match self.stage {
                Stage::Done(_) => Action::StartOver,
                _ => Action::Confirm,
            };
            return self.apply(action, at);
        }

        let action = match &mut self.stage {
            Stage::Hour(picker) => {
                if let Some(hour) = ui::hour_picker::hour_at(picker, regions.body, col, row) {
                    picker.select(hour);
                }
                Action::None
            }
            Stage::Minute(slider) => {
                let track = ui::minute_slider::track_rect(regions.body);
                if let Some(index) = ui::minute_slider::index_at(track, slider.len(), col, row) {
                    slider.set_index(index);
                }
                Action::None
            }
            Stage::AmPm(coin) => {
                if ui::contains(regions.body, col, row) {
                    coin.toss(&mut self.rng, at.instant);
                }
                Action::None
            }
            Stage::Done(clock) => match ui::countdown::popup_action_at(clock, regions.body, col, row) {
                Some(PopupAction::EnableSound) => {
                    clock.enable_sound();
                    Action::None
                }
                Some(PopupAction::Dismiss) => Action::StartOver,
                None => Action::None,
            },
        };

        self.apply(action, at);
    }

    fn apply(&mut self, action: Action, at: Moment) {
        match action {
            Action::None => {}
            Action::Confirm => self.confirm(at),
            Action::StartOver => self.start_over(at),
        }
    }

    fn confirm(&mut self, at: Moment) {
        if matches!(self.stage, Stage::Done(_)) {
            return self.start_over(at);
        }

        let flow = &mut self.flow;
        let result = match &mut self.stage {
            Stage::Hour(picker) => picker.confirm().map(|hour| flow.confirm_hour(hour)),
            Stage::Minute(slider) => slider.confirm().map(|minute| flow.confirm_minute(minute)),
            Stage::AmPm(coin) => coin.confirm().map(|meridiem| flow.confirm_meridiem(meridiem)),
            Stage::Done(_) => None,
        };

        match result {
            Some(Ok(step)) => {
                tracing::info!(%step, "advanced");
                self.mount(at);
            }
            Some(Err(e)) => tracing::warn!(error = %e, "confirm rejected"),
            None => {}
        }
    }

    /// Dismisses a ringing alarm and returns to the hour hunt
    pub fn start_over(&mut self, at: Moment) {
        if let Stage::Done(clock) = &mut self.stage {
            clock.dismiss();
        }
        self.flow.reset();
        self.mount(at);
    }
}
