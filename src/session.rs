use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use crate::arena::WordArena;
use crate::buffer::TypingBuffer;
use crate::catalog::WordCatalog;
use crate::key::Key;
use crate::word::{ActiveWord, Viewport};

pub const DEFAULT_WORDS_PER_MINUTE: u32 = 20;
pub const DEFAULT_STAY: Duration = Duration::from_secs(10);

/// Upper bound on the stay and warm-up durations so they can always be added
/// to an `Instant`.
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Offset subtracted from the play time when computing WPM. Fixed heuristic
/// for the delay before the first word is typeable; it does not track the
/// actual first-spawn delay.
pub const DEFAULT_WPM_WARMUP: Duration = Duration::from_secs(3);

/// Knobs read on every spawn decision. Changes apply to the next spawned
/// word only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub words_per_minute: u32,
    pub stay_duration: Duration,
    pub wpm_warmup: Duration,
    /// Use `60 / wpm` as a real division instead of truncating to whole
    /// seconds.
    pub exact_spawn_interval: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            stay_duration: DEFAULT_STAY,
            wpm_warmup: DEFAULT_WPM_WARMUP,
            exact_spawn_interval: false,
        }
    }
}

impl SessionSettings {
    /// Replaces values a session cannot run with. Any positive rate and
    /// stay are kept as given; a zero stay falls back to the default.
    pub fn normalized(mut self) -> Self {
        self.words_per_minute = self.words_per_minute.max(1);
        if self.stay_duration.is_zero() {
            self.stay_duration = DEFAULT_STAY;
        }
        self.stay_duration = self.stay_duration.min(MAX_SESSION_DURATION);
        self.wpm_warmup = self.wpm_warmup.min(MAX_SESSION_DURATION);
        self
    }

    pub fn spawn_interval(&self) -> Duration {
        let wpm = self.words_per_minute.max(1);
        if self.exact_spawn_interval {
            Duration::from_secs_f64(60.0 / wpm as f64)
        } else {
            Duration::from_secs(u64::from(60 / wpm))
        }
    }
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WordSpawned(ActiveWord),
    WordRemoved { word: ActiveWord, was_correct: bool },
    ScoreChanged(u32),
    BufferChanged(String),
}

/// Top-level coordinator: drives the arena from ticks and key presses and
/// keeps the score.
#[derive(Debug)]
pub struct GameSession<R: Rng = StdRng> {
    catalog: WordCatalog,
    arena: WordArena<R>,
    buffer: TypingBuffer,
    settings: SessionSettings,
    viewport: Viewport,
    score: u32,
    started_at: Instant,
    last_spawn_at: Instant,
    stopped_at: Option<Instant>,
}

impl GameSession<StdRng> {
    pub fn new(
        catalog: WordCatalog,
        settings: SessionSettings,
        viewport: Viewport,
        now: Instant,
    ) -> Self {
        Self::with_rng(catalog, settings, viewport, now, StdRng::from_entropy())
    }

    pub fn seeded(
        catalog: WordCatalog,
        settings: SessionSettings,
        viewport: Viewport,
        now: Instant,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            catalog,
            settings,
            viewport,
            now,
            StdRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng(
        catalog: WordCatalog,
        settings: SessionSettings,
        viewport: Viewport,
        now: Instant,
        rng: R,
    ) -> Self {
        let settings = settings.normalized();
        log::info!(
            "session started: {} words, {} wpm target, {:?} stay",
            catalog.len(),
            settings.words_per_minute,
            settings.stay_duration
        );
        Self {
            catalog,
            arena: WordArena::with_rng(rng),
            buffer: TypingBuffer::new(),
            settings,
            viewport,
            score: 0,
            started_at: now,
            last_spawn_at: now,
            stopped_at: None,
        }
    }

    /// Expires due words, then spawns one if the spawn interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        if self.is_stopped() {
            return Vec::new();
        }

        let mut events: Vec<GameEvent> = self
            .arena
            .expire_due(now)
            .into_iter()
            .map(|word| GameEvent::WordRemoved {
                word,
                was_correct: false,
            })
            .collect();

        let since_spawn = now.saturating_duration_since(self.last_spawn_at);
        if since_spawn >= self.settings.spawn_interval() {
            let word = self
                .arena
                .spawn(
                    &self.catalog,
                    self.viewport,
                    self.settings.stay_duration,
                    now,
                )
                .clone();
            self.last_spawn_at = now;
            events.push(GameEvent::WordSpawned(word));
        }

        events
    }

    pub fn on_key(&mut self, key: Key) -> Vec<GameEvent> {
        if self.is_stopped() {
            return Vec::new();
        }

        match key {
            Key::Letter(c) => self.buffer.append(c),
            Key::Backspace => self.buffer.backspace(),
            Key::Other => {}
        }

        let typed = self.buffer.snapshot();
        match self.arena.match_text(&typed) {
            Some(word) => {
                self.score += 1;
                self.buffer.clear();
                log::debug!("score {} after {:?}", self.score, word.text);
                vec![
                    GameEvent::WordRemoved {
                        word,
                        was_correct: true,
                    },
                    GameEvent::ScoreChanged(self.score),
                    GameEvent::BufferChanged(String::new()),
                ]
            }
            None => vec![GameEvent::BufferChanged(typed)],
        }
    }

    /// Words per minute since start, less the warm-up offset. Zero until the
    /// warm-up has passed. Frozen at the stop time once stopped.
    pub fn compute_wpm(&self, now: Instant) -> f64 {
        let end = self.stopped_at.unwrap_or(now);
        let Some(counted_from) = self.started_at.checked_add(self.settings.wpm_warmup) else {
            return 0.0;
        };
        let elapsed = end.saturating_duration_since(counted_from);
        if elapsed.is_zero() {
            return 0.0;
        }
        self.score as f64 / (elapsed.as_secs_f64() / 60.0)
    }

    /// Ends the session: drops all active words, freezes the clock and
    /// returns the final WPM.
    pub fn stop(&mut self, now: Instant) -> f64 {
        if self.stopped_at.is_none() {
            self.arena.clear();
            self.buffer.clear();
            self.stopped_at = Some(now);
            log::info!(
                "session stopped: score {}, {:.1} wpm",
                self.score,
                self.compute_wpm(now)
            );
        }
        self.compute_wpm(now)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn buffer(&self) -> &TypingBuffer {
        &self.buffer
    }

    pub fn active_words(&self) -> impl Iterator<Item = &ActiveWord> {
        self.arena.iter()
    }

    pub fn active_count(&self) -> usize {
        self.arena.len()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn set_words_per_minute(&mut self, wpm: u32) {
        self.settings.words_per_minute = wpm;
        self.settings = self.settings.normalized();
    }

    pub fn set_stay_duration(&mut self, stay: Duration) {
        self.settings.stay_duration = stay;
        self.settings = self.settings.normalized();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Affects where future words spawn; active words keep their paths.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }
}
