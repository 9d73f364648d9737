use chrono::NaiveTime;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Meridiem {
    #[strum(serialize = "AM")]
    Am,
    #[strum(serialize = "PM")]
    Pm,
}

impl Meridiem {
    /// Heads is AM, tails is PM
    pub fn coin_angle(self) -> u32 {
        match self {
            Meridiem::Am => 0,
            Meridiem::Pm => 180,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Meridiem::Am => "☀",
            Meridiem::Pm => "☾",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlarmTimeError {
    #[error("hour {0} is outside 1..=12")]
    Hour(u8),
    #[error("minute {0} is outside 0..=59")]
    Minute(u8),
}

/// A daily alarm on the 12-hour clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
    time_of_day: NaiveTime,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Result<Self, AlarmTimeError> {
        if !(1..=12).contains(&hour) {
            return Err(AlarmTimeError::Hour(hour));
        }
        let time_of_day = NaiveTime::from_hms_opt(to_24h(hour, meridiem).into(), minute.into(), 0)
            .ok_or(AlarmTimeError::Minute(minute))?;

        Ok(Self {
            hour,
            minute,
            meridiem,
            time_of_day,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    pub fn hour_24(&self) -> u8 {
        to_24h(self.hour, self.meridiem)
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02} {}", self.hour, self.minute, self.meridiem)
    }
}

fn to_24h(hour: u8, meridiem: Meridiem) -> u8 {
    match (meridiem, hour) {
        (Meridiem::Am, 12) => 0,
        (Meridiem::Am, h) => h,
        (Meridiem::Pm, 12) => 12,
        (Meridiem::Pm, h) => h + 12,
    }
}
