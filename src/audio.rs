use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::schedule::Interval;

/// Result of asking the host to start playback. A blocked start is an
/// expected outcome the user can recover from, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Started,
    Blocked,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to stop player process: {0}")]
    Stop(#[source] io::Error),
    #[error("failed to check player process: {0}")]
    Poll(#[source] io::Error),
}

/// A loop-enabled track: started on trigger, stopped and rewound on dismiss.
pub trait AudioPlayer: fmt::Debug {
    fn play(&mut self) -> Result<PlaybackOutcome, AudioError>;
    fn pause(&mut self) -> Result<(), AudioError>;
    /// Next `play` starts from the top
    fn rewind(&mut self);
    fn is_playing(&self) -> bool;
    /// True once the host rejected a playback that had already started
    fn is_blocked(&self) -> bool {
        false
    }
    /// Keeps the loop going; called on every runtime tick
    fn tick(&mut self, _now: Instant) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Plays a sound file through an external player, respawning it to loop.
#[derive(Debug)]
pub struct CommandPlayer {
    program: String,
    sound: PathBuf,
    child: Option<Child>,
    playing: bool,
    blocked: bool,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, sound: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            sound: sound.into(),
            child: None,
            playing: false,
            blocked: false,
        }
    }

    fn reject(&mut self, reason: &str) {
        self.child = None;
        self.playing = false;
        self.blocked = true;
        tracing::warn!(program = %self.program, reason, "alarm sound blocked");
    }

    fn spawn(&self) -> io::Result<Child> {
        Command::new(&self.program)
            .arg(&self.sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
    }

    fn stop_child(&mut self) -> Result<(), AudioError> {
        if let Some(mut child) = self.child.take() {
            match child.kill() {
                Ok(()) => {}
                // already exited
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
                Err(e) => return Err(AudioError::Stop(e)),
            }
            child.wait().map_err(AudioError::Stop)?;
        }
        Ok(())
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&mut self) -> Result<PlaybackOutcome, AudioError> {
        if self.playing {
            return Ok(PlaybackOutcome::Started);
        }

        match self.spawn() {
            Ok(child) => {
                self.child = Some(child);
                self.playing = true;
                self.blocked = false;
                tracing::info!(program = %self.program, sound = %self.sound.display(), "alarm sound started");
                Ok(PlaybackOutcome::Started)
            }
            Err(e) => {
                self.reject(&e.to_string());
                Ok(PlaybackOutcome::Blocked)
            }
        }
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.playing = false;
        self.blocked = false;
        self.stop_child()
    }

    fn rewind(&mut self) {
        // a respawned player always starts from the top
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Only a clean exit loops the track. A player that fails (no sound
    /// server, unreadable file) counts as the host rejecting playback.
    fn tick(&mut self, _now: Instant) -> Result<(), AudioError> {
        if !self.playing {
            return Ok(());
        }

        let status = match self.child.as_mut() {
            Some(child) => child.try_wait().map_err(AudioError::Poll)?,
            None => None,
        };

        match status {
            None if self.child.is_some() => {}
            Some(status) if !status.success() => self.reject(&status.to_string()),
            _ => match self.spawn() {
                Ok(child) => self.child = Some(child),
                Err(e) => self.reject(&e.to_string()),
            },
        }
        Ok(())
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        if let Err(e) = self.stop_child() {
            tracing::warn!(error = %e, "player process left behind");
        }
    }
}

pub const BELL_PERIOD: Duration = Duration::from_secs(1);

/// Rings the terminal bell once per period while playing.
pub struct BellPlayer<W: Write> {
    out: W,
    ring: Interval,
    rings: u64,
}

impl<W: Write> fmt::Debug for BellPlayer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BellPlayer")
            .field("playing", &self.ring.is_active())
            .field("rings", &self.rings)
            .finish()
    }
}

impl BellPlayer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> BellPlayer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            ring: Interval::cancelled(BELL_PERIOD),
            rings: 0,
        }
    }

    pub fn rings(&self) -> u64 {
        self.rings
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn ring_once(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        self.rings += 1;
        Ok(())
    }
}

impl<W: Write> AudioPlayer for BellPlayer<W> {
    fn play(&mut self) -> Result<PlaybackOutcome, AudioError> {
        if self.ring.is_active() {
            return Ok(PlaybackOutcome::Started);
        }
        match self.ring_once() {
            Ok(()) => {
                self.ring.restart(Instant::now());
                Ok(PlaybackOutcome::Started)
            }
            Err(e) => {
                tracing::warn!(error = %e, "terminal bell blocked");
                Ok(PlaybackOutcome::Blocked)
            }
        }
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.ring.cancel();
        Ok(())
    }

    fn rewind(&mut self) {
        self.rings = 0;
    }

    fn is_playing(&self) -> bool {
        self.ring.is_active()
    }

    fn tick(&mut self, now: Instant) -> Result<(), AudioError> {
        if self.ring.poll(now) > 0 {
            if let Err(e) = self.ring_once() {
                tracing::warn!(error = %e, "terminal bell failed");
                self.ring.cancel();
            }
        }
        Ok(())
    }
}

/// For `--no-sound`: pretends to play.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    playing: bool,
}

impl AudioPlayer for SilentPlayer {
    fn play(&mut self) -> Result<PlaybackOutcome, AudioError> {
        self.playing = true;
        Ok(PlaybackOutcome::Started)
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.playing = false;
        Ok(())
    }

    fn rewind(&mut self) {}

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_player_binary_is_blocked_not_fatal() {
        let mut player = CommandPlayer::new("alarmhunt-no-such-player-binary", "alarm.mp3");

        assert_matches!(player.play(), Ok(PlaybackOutcome::Blocked));
        assert!(!player.is_playing());
        assert!(player.pause().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn command_player_loops_and_stops() {
        // `true` ignores its argument and exits immediately, forcing a respawn
        let mut player = CommandPlayer::new("true", "ignored.wav");

        assert_matches!(player.play(), Ok(PlaybackOutcome::Started));
        assert!(player.is_playing());

        std::thread::sleep(Duration::from_millis(50));
        player.tick(Instant::now()).unwrap();
        assert!(player.is_playing());

        player.pause().unwrap();
        player.rewind();
        assert!(!player.is_playing());
        assert!(player.child.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn failing_player_is_blocked_without_respawning() {
        // `false` starts fine and exits non-zero, like paplay with no sound server
        let mut player = CommandPlayer::new("false", "missing.wav");

        assert_matches!(player.play(), Ok(PlaybackOutcome::Started));
        assert!(!player.is_blocked());

        for _ in 0..50 {
            std::thread::sleep(Duration::from_millis(20));
            player.tick(Instant::now()).unwrap();
            if player.is_blocked() {
                break;
            }
        }

        assert!(player.is_blocked());
        assert!(!player.is_playing());
        assert!(player.child.is_none());

        player.tick(Instant::now()).unwrap();
        assert!(player.child.is_none(), "a rejected player must not respawn");

        assert_matches!(player.play(), Ok(PlaybackOutcome::Started));
        assert!(!player.is_blocked());
    }

    #[test]
    fn bell_rings_on_play_and_each_period() {
        let mut bell = BellPlayer::new(Vec::new());

        assert_matches!(bell.play(), Ok(PlaybackOutcome::Started));
        assert_eq!(bell.rings(), 1);
        assert_eq!(bell.output().as_slice(), b"\x07");

        bell.tick(Instant::now() + BELL_PERIOD).unwrap();
        assert_eq!(bell.rings(), 2);

        bell.pause().unwrap();
        bell.tick(Instant::now() + BELL_PERIOD * 10).unwrap();
        assert_eq!(bell.rings(), 2);
        assert!(!bell.is_playing());

        bell.rewind();
        assert_eq!(bell.rings(), 0);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unwritable_bell_is_blocked() {
        let mut bell = BellPlayer::new(BrokenPipe);
        assert_matches!(bell.play(), Ok(PlaybackOutcome::Blocked));
        assert!(!bell.is_playing());
    }

    #[test]
    fn silent_player_tracks_state() {
        let mut player = SilentPlayer::default();
        assert_matches!(player.play(), Ok(PlaybackOutcome::Started));
        assert!(player.is_playing());
        player.pause().unwrap();
        assert!(!player.is_playing());
    }
}
