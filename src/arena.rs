use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use crate::catalog::WordCatalog;
use crate::word::{ActiveWord, Point, Viewport, WordId};

/// Words start and end inside the top 2/5 of the viewport.
const VERTICAL_BAND: f64 = 2.0 / 5.0;
/// End-x is drawn from the left 4/5 of the viewport.
const HORIZONTAL_REACH: f64 = 4.0 / 5.0;
/// End-x below this fraction of the width is doubled.
const SHORT_PATH_CUTOFF: f64 = 0.2;

/// Owns the active words. Removal moves a word out, so a word can be
/// matched or expired at most once.
#[derive(Debug)]
pub struct WordArena<R: Rng = StdRng> {
    words: Vec<ActiveWord>,
    next_id: u64,
    rng: R,
}

impl WordArena<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for WordArena<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> WordArena<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            words: Vec::new(),
            next_id: 0,
            rng,
        }
    }

    /// Picks a random catalog word, plans its path and adds it to the
    /// active set.
    pub fn spawn(
        &mut self,
        catalog: &WordCatalog,
        viewport: Viewport,
        stay: Duration,
        now: Instant,
    ) -> &ActiveWord {
        let text = catalog.choose(&mut self.rng).to_string();
        let (start, end) = self.plan_path(viewport);

        let id = WordId(self.next_id);
        self.next_id += 1;

        let word = ActiveWord::new(id, &text, now, stay, start, end);
        log::debug!(
            "spawned {} {:?} ({:.1},{:.1}) -> ({:.1},{:.1}) for {:?}",
            word.id,
            word.text,
            start.x,
            start.y,
            end.x,
            end.y,
            stay
        );
        self.words.push(word);
        &self.words[self.words.len() - 1]
    }

    fn plan_path(&mut self, viewport: Viewport) -> (Point, Point) {
        let Viewport { width, height } = viewport;

        let start = Point::new(0.0, self.rng.gen::<f64>() * height * VERTICAL_BAND);

        let mut end_x = self.rng.gen::<f64>() * width * HORIZONTAL_REACH;
        let end_y = self.rng.gen::<f64>() * height * VERTICAL_BAND;
        if end_x < width * SHORT_PATH_CUTOFF {
            end_x *= 2.0;
        }

        (start, Point::new(end_x, end_y))
    }

    /// Removes and returns every word whose time-to-live has elapsed,
    /// oldest first.
    pub fn expire_due(&mut self, now: Instant) -> Vec<ActiveWord> {
        if !self.words.iter().any(|w| w.is_expired(now)) {
            return Vec::new();
        }

        let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.words)
            .into_iter()
            .partition(|w| w.is_expired(now));
        self.words = live;

        for w in &expired {
            log::debug!("expired {} {:?}", w.id, w.text);
        }
        expired
    }

    /// Removes the oldest active word equal to `text` (case-insensitive).
    pub fn match_text(&mut self, text: &str) -> Option<ActiveWord> {
        if text.is_empty() {
            return None;
        }
        let wanted = text.to_uppercase();
        let idx = self.words.iter().position(|w| w.text == wanted)?;
        let word = self.words.remove(idx);
        log::debug!("matched {} {:?}", word.id, word.text);
        Some(word)
    }

    /// Removes every active word, oldest first.
    pub fn clear(&mut self) -> Vec<ActiveWord> {
        std::mem::take(&mut self.words)
    }

    /// Active words in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveWord> {
        self.words.iter()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
