use thiserror::Error;

use crate::alarm::{AlarmTime, AlarmTimeError, Meridiem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum FlowStep {
    #[default]
    Hour,
    Minute,
    AmPm,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("cannot confirm the {event} during the {step} step")]
    UnexpectedStep { event: FlowStep, step: FlowStep },
    #[error(transparent)]
    InvalidTime(#[from] AlarmTimeError),
}

/// Threads confirmed values through hour → minute → am/pm → done.
#[derive(Debug, Default)]
pub struct FlowController {
    step: FlowStep,
    hour: Option<u8>,
    minute: Option<u8>,
    meridiem: Option<Meridiem>,
    alarm: Option<AlarmTime>,
    generation: u64,
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn hour(&self) -> Option<u8> {
        self.hour
    }

    pub fn minute(&self) -> Option<u8> {
        self.minute
    }

    pub fn meridiem(&self) -> Option<Meridiem> {
        self.meridiem
    }

    /// Set once all three values are confirmed
    pub fn alarm_time(&self) -> Option<AlarmTime> {
        self.alarm
    }

    /// Bumped on every reset so widgets are rebuilt from scratch
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn expect_step(&self, event: FlowStep) -> Result<(), FlowError> {
        if self.step == event {
            Ok(())
        } else {
            Err(FlowError::UnexpectedStep {
                event,
                step: self.step,
            })
        }
    }

    pub fn confirm_hour(&mut self, hour: u8) -> Result<FlowStep, FlowError> {
        self.expect_step(FlowStep::Hour)?;
        if !(1..=12).contains(&hour) {
            return Err(AlarmTimeError::Hour(hour).into());
        }
        self.hour = Some(hour);
        self.step = FlowStep::Minute;
        Ok(self.step)
    }

    pub fn confirm_minute(&mut self, minute: u8) -> Result<FlowStep, FlowError> {
        self.expect_step(FlowStep::Minute)?;
        if minute > 59 {
            return Err(AlarmTimeError::Minute(minute).into());
        }
        self.minute = Some(minute);
        self.step = FlowStep::AmPm;
        Ok(self.step)
    }

    pub fn confirm_meridiem(&mut self, meridiem: Meridiem) -> Result<FlowStep, FlowError> {
        self.expect_step(FlowStep::AmPm)?;
        let (Some(hour), Some(minute)) = (self.hour, self.minute) else {
            return Err(FlowError::UnexpectedStep {
                event: FlowStep::AmPm,
                step: self.step,
            });
        };
        self.alarm = Some(AlarmTime::new(hour, minute, meridiem)?);
        self.meridiem = Some(meridiem);
        self.step = FlowStep::Done;
        Ok(self.step)
    }

    /// Back to the hour step with every confirmed value cleared
    pub fn reset(&mut self) {
        self.step = FlowStep::Hour;
        self.hour = None;
        self.minute = None;
        self.meridiem = None;
        self.alarm = None;
        self.generation += 1;
        tracing::info!(generation = self.generation, "flow reset");
    }
}
