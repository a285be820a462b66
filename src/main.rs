mod ui;

use clap::Parser;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keyshooter::{
    app_dirs::AppDirs,
    catalog::{WordCatalog, DEFAULT_LIST},
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{terminal_input, Clock, Input, Runner, Step},
    session::{GameEvent, GameSession, SessionSettings},
    word::Viewport,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 50;

// adjustable ranges of the spawn rate and stay duration
const MIN_WPM: u32 = 10;
const MAX_WPM: u32 = 60;
const WPM_STEP: u32 = 5;
const MIN_STAY_SECS: u64 = 5;
const MAX_STAY_SECS: u64 = 30;
const STAY_STEP: Duration = Duration::from_secs(1);

/// shoot down floating words by typing them before they drift away
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Words float across the terminal; type one to shoot it down before it expires."
)]
pub struct Cli {
    /// newline-separated word list to draw from (defaults to the bundled list)
    #[clap(short = 'f', long)]
    words_file: Option<PathBuf>,

    /// words spawned per minute (10-60)
    #[clap(
        short = 'w',
        long,
        value_parser = clap::value_parser!(u32).range(MIN_WPM as i64..=MAX_WPM as i64)
    )]
    wpm: Option<u32>,

    /// seconds each word stays on screen (5-30)
    #[clap(
        short = 's',
        long,
        value_parser = clap::value_parser!(u64).range(MIN_STAY_SECS..=MAX_STAY_SECS)
    )]
    stay: Option<u64>,

    /// seed the word picker for a reproducible game
    #[clap(long)]
    seed: Option<u64>,

    /// spawn every 60/wpm seconds exactly instead of rounding down to whole seconds
    #[clap(long)]
    exact_interval: bool,
}

impl Cli {
    /// Command-line values override the stored config.
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(wpm) = self.wpm {
            cfg.words_per_minute = wpm;
        }
        if let Some(stay) = self.stay {
            cfg.stay_duration_secs = stay;
        }
        if self.words_file.is_some() {
            cfg.words_file = self.words_file.clone();
        }
        if self.exact_interval {
            cfg.exact_spawn_interval = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, strum_macros::Display)]
pub enum AppState {
    Playing,
    GameOver,
}

/// Last removal, shown under the typed letters.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Hit(String),
    Missed(String),
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub session: GameSession,
    pub state: AppState,
    pub score_label: u32,
    pub typed_label: String,
    pub notice: Option<Notice>,
    pub missed: u32,
    pub final_wpm: f64,
    pub now: Instant,
    seed: Option<u64>,
}

impl App {
    pub fn new(
        catalog: WordCatalog,
        settings: SessionSettings,
        viewport: Viewport,
        seed: Option<u64>,
        now: Instant,
    ) -> Self {
        Self {
            session: new_session(catalog, settings, viewport, seed, now),
            state: AppState::Playing,
            score_label: 0,
            typed_label: String::new(),
            notice: None,
            missed: 0,
            final_wpm: 0.0,
            now,
            seed,
        }
    }

    /// Starts a fresh game with the current settings. A seeded game moves to
    /// the next seed so the new round draws different words.
    pub fn reset(&mut self, now: Instant) {
        *self = App::new(
            self.session.catalog().clone(),
            *self.session.settings(),
            self.session.viewport(),
            self.seed.map(|s| s.wrapping_add(1)),
            now,
        );
    }

    /// Handles one runner step. Keys the shell owns are consumed here; the
    /// rest go to the session through the runner.
    fn on_step<C: Clock>(&mut self, runner: &Runner<C>, step: Step) -> Flow {
        self.now = step.at;
        let step = match step.input {
            Input::Key(key) => match self.shell_key(key, step.at) {
                Some(Flow::Quit) => return Flow::Quit,
                Some(Flow::Continue) => Step {
                    input: Input::Idle,
                    at: step.at,
                },
                None => step,
            },
            Input::Resize | Input::Idle => step,
        };
        let events = runner.play(&mut self.session, &step);
        self.apply(events);
        Flow::Continue
    }

    /// `None` when the key should be typed into the game.
    fn shell_key(&mut self, key: KeyEvent, now: Instant) -> Option<Flow> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Flow::Quit);
        }

        let wpm = self.session.settings().words_per_minute;
        let stay = self.session.settings().stay_duration;
        match self.state {
            AppState::Playing => match key.code {
                KeyCode::Esc => self.stop(now),
                KeyCode::Up => self
                    .session
                    .set_words_per_minute((wpm + WPM_STEP).min(MAX_WPM)),
                KeyCode::Down => self
                    .session
                    .set_words_per_minute(wpm.saturating_sub(WPM_STEP).max(MIN_WPM)),
                KeyCode::Right => self.session.set_stay_duration(clamp_stay(stay + STAY_STEP)),
                KeyCode::Left => self
                    .session
                    .set_stay_duration(clamp_stay(stay.saturating_sub(STAY_STEP))),
                _ => return None,
            },
            AppState::GameOver => match key.code {
                KeyCode::Char('n') => self.reset(now),
                KeyCode::Esc | KeyCode::Char('q') => return Some(Flow::Quit),
                _ => {}
            },
        }

        Some(Flow::Continue)
    }

    pub fn stop(&mut self, now: Instant) {
        self.final_wpm = self.session.stop(now);
        self.state = AppState::GameOver;
    }

    pub fn resize(&mut self, area: Rect) {
        let pane = ui::words_area(area);
        self.session
            .set_viewport(Viewport::new(pane.width as f64, pane.height as f64));
    }

    fn apply(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::WordSpawned(word) => {
                    log::trace!("word on screen: {} {}", word.id, word.text);
                }
                GameEvent::WordRemoved { word, was_correct } => {
                    if was_correct {
                        self.notice = Some(Notice::Hit(word.text));
                    } else {
                        self.missed += 1;
                        self.notice = Some(Notice::Missed(word.text));
                    }
                }
                GameEvent::ScoreChanged(score) => self.score_label = score,
                GameEvent::BufferChanged(typed) => self.typed_label = typed,
            }
        }
    }
}

fn clamp_stay(stay: Duration) -> Duration {
    stay.clamp(
        Duration::from_secs(MIN_STAY_SECS),
        Duration::from_secs(MAX_STAY_SECS),
    )
}

/// Session settings from the stored config, held to the adjustable ranges.
fn session_settings(cfg: &Config) -> SessionSettings {
    let mut settings = SessionSettings::from(cfg);
    settings.words_per_minute = settings.words_per_minute.clamp(MIN_WPM, MAX_WPM);
    settings.stay_duration = clamp_stay(settings.stay_duration);
    settings
}

fn new_session(
    catalog: WordCatalog,
    settings: SessionSettings,
    viewport: Viewport,
    seed: Option<u64>,
    now: Instant,
) -> GameSession {
    match seed {
        Some(seed) => GameSession::seeded(catalog, settings, viewport, now, seed),
        None => GameSession::new(catalog, settings, viewport, now),
    }
}

fn load_catalog(cfg: &Config) -> Result<WordCatalog, Box<dyn Error>> {
    let catalog = match &cfg.words_file {
        Some(path) => WordCatalog::from_file(path)?,
        None => WordCatalog::bundled(DEFAULT_LIST)?,
    };
    Ok(catalog)
}

/// Creates the log file's directory and opens it for appending.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Logs go to a file so they do not scribble over the alternate screen.
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    let file = match open_log_file(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("logging disabled, cannot open {}: {e}", path.display());
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if !stdin().is_tty() {
        use clap::{error::ErrorKind, CommandFactory};
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut cfg = store.load();
    cli.apply_to(&mut cfg);

    // fail before touching the terminal if there is nothing to type
    let catalog = load_catalog(&cfg)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(
        catalog,
        session_settings(&cfg),
        Viewport::new(0.0, 0.0),
        cli.seed,
        Instant::now(),
    );
    app.resize(Rect::new(0, 0, size.width, size.height));

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    cfg.update_from(app.session.settings());
    if let Err(e) = store.save(&cfg) {
        log::warn!("could not save config to {}: {e}", store.path().display());
    }

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(terminal_input(), Duration::from_millis(TICK_RATE_MS));

    loop {
        terminal.draw(|f| ui(app, f))?;

        let step = runner.step();
        if step.input == Input::Resize {
            let size = terminal.size()?;
            app.resize(Rect::new(0, 0, size.width, size.height));
        }
        if app.on_step(&runner, step) == Flow::Quit {
            break;
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app(words: &[&str]) -> (App, Instant) {
        let t0 = Instant::now();
        let catalog = WordCatalog::new(words.iter().copied()).unwrap();
        let app = App::new(
            catalog,
            SessionSettings::default(),
            Viewport::new(60.0, 15.0),
            Some(1),
            t0,
        );
        (app, t0)
    }

    fn step(app: &mut App, input: Input, at: Instant) -> Flow {
        let (_tx, rx) = std::sync::mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(TICK_RATE_MS));
        app.on_step(&runner, Step { input, at })
    }

    fn tick(app: &mut App, now: Instant) {
        step(app, Input::Idle, now);
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) -> Flow {
        step(app, Input::Key(KeyEvent::new(code, KeyModifiers::NONE)), now)
    }

    fn screen(app: &mut App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(app, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["keyshooter"]);

        assert_eq!(cli.words_file, None);
        assert_eq!(cli.wpm, None);
        assert_eq!(cli.stay, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.exact_interval);
    }

    #[test]
    fn test_cli_values() {
        let cli = Cli::parse_from([
            "keyshooter",
            "-f",
            "words.txt",
            "-w",
            "30",
            "-s",
            "12",
            "--seed",
            "9",
            "--exact-interval",
        ]);

        assert_eq!(cli.words_file, Some(PathBuf::from("words.txt")));
        assert_eq!(cli.wpm, Some(30));
        assert_eq!(cli.stay, Some(12));
        assert_eq!(cli.seed, Some(9));
        assert!(cli.exact_interval);
    }

    #[test]
    fn test_cli_rejects_out_of_range() {
        assert!(Cli::try_parse_from(["keyshooter", "--wpm", "5"]).is_err());
        assert!(Cli::try_parse_from(["keyshooter", "--wpm", "61"]).is_err());
        assert!(Cli::try_parse_from(["keyshooter", "--stay", "4"]).is_err());
        assert!(Cli::try_parse_from(["keyshooter", "--stay", "31"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["keyshooter", "-w", "40", "--exact-interval"]);
        let mut cfg = Config {
            stay_duration_secs: 20,
            ..Default::default()
        };
        cli.apply_to(&mut cfg);

        assert_eq!(cfg.words_per_minute, 40);
        assert_eq!(cfg.stay_duration_secs, 20);
        assert!(cfg.exact_spawn_interval);
    }

    #[test]
    fn test_load_catalog_bundled_by_default() {
        let catalog = load_catalog(&Config::default()).unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            words_file: Some(dir.path().join("missing.txt")),
            ..Default::default()
        };
        assert!(load_catalog(&cfg).is_err());
    }

    #[test]
    fn test_open_log_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("keyshooter.log");
        assert!(open_log_file(&path).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_reports_unusable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();
        assert!(open_log_file(&blocker.join("keyshooter.log")).is_err());
    }

    #[test]
    fn test_app_state_display() {
        assert_eq!(AppState::Playing.to_string(), "Playing");
        assert_eq!(AppState::GameOver.to_string(), "GameOver");
    }

    #[test]
    fn test_typing_updates_labels() {
        let (mut app, t0) = test_app(&["dog"]);
        let t = t0 + Duration::from_secs(3);
        tick(&mut app, t);
        assert_eq!(app.session.active_count(), 1);

        press(&mut app, KeyCode::Char('d'), t);
        press(&mut app, KeyCode::Char('o'), t);
        assert_eq!(app.typed_label, "DO");

        press(&mut app, KeyCode::Char('g'), t);
        assert_eq!(app.score_label, 1);
        assert_eq!(app.typed_label, "");
        assert_eq!(app.notice, Some(Notice::Hit("DOG".into())));
    }

    #[test]
    fn test_expiry_counts_as_missed() {
        let (mut app, t0) = test_app(&["dog"]);
        tick(&mut app, t0 + Duration::from_secs(3));
        tick(&mut app, t0 + Duration::from_secs(13));

        assert_eq!(app.missed, 1);
        assert_eq!(app.notice, Some(Notice::Missed("DOG".into())));
        assert_eq!(app.score_label, 0);
    }

    #[test]
    fn test_arrow_keys_adjust_settings() {
        let (mut app, t0) = test_app(&["dog"]);

        press(&mut app, KeyCode::Up, t0);
        assert_eq!(app.session.settings().words_per_minute, 25);
        press(&mut app, KeyCode::Down, t0);
        press(&mut app, KeyCode::Down, t0);
        press(&mut app, KeyCode::Down, t0);
        assert_eq!(app.session.settings().words_per_minute, 10);

        press(&mut app, KeyCode::Right, t0);
        assert_eq!(app.session.settings().stay_duration, Duration::from_secs(11));
        for _ in 0..20 {
            press(&mut app, KeyCode::Left, t0);
        }
        assert_eq!(app.session.settings().stay_duration, Duration::from_secs(5));
    }

    #[test]
    fn test_escape_stops_then_quits() {
        let (mut app, t0) = test_app(&["dog"]);
        tick(&mut app, t0 + Duration::from_secs(3));
        press(&mut app, KeyCode::Char('d'), t0 + Duration::from_secs(4));
        press(&mut app, KeyCode::Char('o'), t0 + Duration::from_secs(4));
        press(&mut app, KeyCode::Char('g'), t0 + Duration::from_secs(4));

        let end = t0 + Duration::from_secs(63);
        assert_eq!(press(&mut app, KeyCode::Esc, end), Flow::Continue);
        assert_eq!(app.state, AppState::GameOver);
        assert!((app.final_wpm - 1.0).abs() < 1e-9);
        assert_eq!(app.session.active_count(), 0);

        assert_eq!(press(&mut app, KeyCode::Esc, end), Flow::Quit);
    }

    #[test]
    fn test_new_game_after_game_over() {
        let (mut app, t0) = test_app(&["dog"]);
        press(&mut app, KeyCode::Up, t0);
        app.stop(t0 + Duration::from_secs(10));

        let t1 = t0 + Duration::from_secs(20);
        press(&mut app, KeyCode::Char('n'), t1);

        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.score_label, 0);
        assert_eq!(app.session.started_at(), t1);
        assert_eq!(app.session.settings().words_per_minute, 25);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let (mut app, t0) = test_app(&["dog"]);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(step(&mut app, Input::Key(ctrl_c), t0), Flow::Quit);
    }

    #[test]
    fn test_new_game_moves_to_next_seed() {
        let (mut app, t0) = test_app(&["dog", "fish", "cat"]);
        assert_eq!(app.seed, Some(1));
        app.stop(t0);
        press(&mut app, KeyCode::Char('n'), t0);
        assert_eq!(app.seed, Some(2));
        app.stop(t0);
        press(&mut app, KeyCode::Char('n'), t0);
        assert_eq!(app.seed, Some(3));
    }

    #[test]
    fn test_unseeded_game_stays_unseeded() {
        let (mut app, t0) = test_app(&["dog"]);
        app.seed = None;
        app.reset(t0);
        assert_eq!(app.seed, None);
    }

    #[test]
    fn test_config_settings_held_to_adjustable_ranges() {
        let cfg = Config {
            words_per_minute: 1000,
            stay_duration_secs: 1,
            ..Default::default()
        };
        let settings = session_settings(&cfg);
        assert_eq!(settings.words_per_minute, MAX_WPM);
        assert_eq!(settings.stay_duration, Duration::from_secs(MIN_STAY_SECS));

        let cfg = Config {
            words_per_minute: 0,
            stay_duration_secs: 600,
            ..Default::default()
        };
        let settings = session_settings(&cfg);
        assert_eq!(settings.words_per_minute, MIN_WPM);
        assert_eq!(settings.stay_duration, Duration::from_secs(MAX_STAY_SECS));
    }

    #[test]
    fn test_arrow_keys_stop_at_range_ends() {
        let (mut app, t0) = test_app(&["dog"]);
        for _ in 0..20 {
            press(&mut app, KeyCode::Up, t0);
            press(&mut app, KeyCode::Right, t0);
        }
        assert_eq!(app.session.settings().words_per_minute, MAX_WPM);
        assert_eq!(
            app.session.settings().stay_duration,
            Duration::from_secs(MAX_STAY_SECS)
        );
    }

    #[test]
    fn test_shell_keys_are_not_typed() {
        let (mut app, t0) = test_app(&["dog"]);
        press(&mut app, KeyCode::Char('d'), t0);
        press(&mut app, KeyCode::Up, t0);
        assert_eq!(app.session.buffer().snapshot(), "D");
        assert_eq!(app.typed_label, "D");
    }

    #[test]
    fn test_resize_sets_viewport() {
        let (mut app, _) = test_app(&["dog"]);
        app.resize(Rect::new(0, 0, 80, 24));
        let vp = app.session.viewport();
        // 2 cell margins, 5 header/footer lines, 2 pane borders
        assert_eq!(vp.width, 76.0);
        assert_eq!(vp.height, 17.0);
    }

    #[test]
    fn test_ui_playing_state() {
        let (mut app, t0) = test_app(&["dog"]);
        app.resize(Rect::new(0, 0, 80, 24));
        tick(&mut app, t0 + Duration::from_secs(3));
        press(&mut app, KeyCode::Char('d'), t0 + Duration::from_secs(3));

        let content = screen(&mut app);
        assert!(content.contains("score 0"));
        assert!(content.contains("DOG"));
        assert!(content.contains("spawn 20 / min"));
    }

    #[test]
    fn test_ui_game_over_state() {
        let (mut app, t0) = test_app(&["dog"]);
        app.stop(t0 + Duration::from_secs(30));

        let content = screen(&mut app);
        assert!(content.contains("GAME OVER"));
        assert!(content.contains("0 words"));
    }

    #[test]
    fn test_ui_tiny_terminal_does_not_panic() {
        let (mut app, t0) = test_app(&["dog"]);
        tick(&mut app, t0 + Duration::from_secs(3));
        let backend = TestBackend::new(4, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();
    }
}
