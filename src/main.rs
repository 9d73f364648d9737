use alarmhunt::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, SoundBackend},
    runtime::{AlarmEvent, AlarmEventSource, ChannelEventSource, Runner},
    schedule::Moment,
    ui, TICK_RATE_MS,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// an alarm clock that makes you earn it
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Set an alarm the hard way: hunt a shuffling hour, guess a scrambled minute, and let a coin decide AM or PM."
)]
pub struct Cli {
    /// milliseconds between hour button shuffles
    #[clap(long = "shuffle-ms")]
    shuffle_ms: Option<u64>,

    /// how the alarm makes noise
    #[clap(long, value_enum)]
    sound_backend: Option<SoundBackend>,

    /// external program used to play the alarm sound
    #[clap(long)]
    player: Option<String>,

    /// sound file handed to the player
    #[clap(long)]
    sound: Option<PathBuf>,

    /// never make a sound
    #[clap(long, conflicts_with_all = ["bell", "sound_backend"])]
    no_sound: bool,

    /// ring the terminal bell instead of running a player
    #[clap(long, conflicts_with = "sound_backend")]
    bell: bool,

    /// write logs here instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// read settings from this file instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// persist the resolved settings before starting
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags win over the stored config
    fn resolve(&self, mut config: Config) -> Config {
        if let Some(ms) = self.shuffle_ms {
            config.shuffle_interval_ms = ms;
        }
        if let Some(player) = &self.player {
            config.player = player.clone();
        }
        if let Some(sound) = &self.sound {
            config.sound_path = Some(sound.clone());
        }
        if let Some(backend) = self.sound_backend {
            config.sound = backend;
        }
        if self.bell {
            config.sound = SoundBackend::Bell;
        }
        if self.no_sound {
            config.sound = SoundBackend::Silent;
        }
        config
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

/// Logs go to a file since the terminal belongs to the TUI.
/// Returns the file in use, or why logging is off.
fn init_logging(path: Option<PathBuf>) -> Result<PathBuf, Box<dyn Error>> {
    let path = path
        .or_else(AppDirs::log_path)
        .ok_or("no state directory for the log file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;
    Ok(path)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // Still on the plain terminal, so the warning stays readable
    if let Err(e) = init_logging(cli.log_file.clone()) {
        eprintln!("alarmhunt: running without a log file: {e}");
    }

    let store = cli.config_store();
    let config = cli.resolve(store.load());
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "config saved");
    }
    tracing::info!(?config, "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, Moment::now());
    let runner = Runner::new(
        ChannelEventSource::crossterm(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    tracing::info!("bye");
    result
}

fn start_tui<B: Backend, E: AlarmEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit() {
        let event = runner.step();
        let now = Moment::now();
        match event {
            AlarmEvent::Key(key) => app.on_key(key, now),
            AlarmEvent::Mouse(mouse) => app.on_mouse(mouse, now),
            AlarmEvent::Resize | AlarmEvent::Tick => {}
        }
        // Timers are polled on every wakeup so a burst of input cannot starve them
        app.on_tick(now);

        if !app.should_quit() {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}
