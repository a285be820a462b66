use std::fmt;
use std::time::{Duration, Instant};

/// Unique token for a spawned word; disambiguates words with identical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordId(pub u64);

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Area words may float in, in the presentation layer's own units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

/// A word currently on screen, eligible for matching or expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveWord {
    pub id: WordId,
    pub text: String,
    pub spawned_at: Instant,
    pub expires_at: Instant,
    pub start: Point,
    pub end: Point,
}

impl ActiveWord {
    pub fn new(
        id: WordId,
        text: &str,
        spawned_at: Instant,
        stay: Duration,
        start: Point,
        end: Point,
    ) -> Self {
        Self {
            id,
            text: text.to_uppercase(),
            spawned_at,
            expires_at: spawned_at + stay,
            start,
            end,
        }
    }

    pub fn stay_duration(&self) -> Duration {
        self.expires_at.duration_since(self.spawned_at)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }

    /// Fraction of the stay duration elapsed at `now`, clamped to [0, 1].
    pub fn progress(&self, now: Instant) -> f64 {
        let total = self.stay_duration().as_secs_f64();
        if total <= 0.0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.spawned_at).as_secs_f64();
        (elapsed / total).clamp(0.0, 1.0)
    }
}
