use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use rand::Rng;

use crate::key::Key;
use crate::session::{GameEvent, GameSession};

/// What woke the loop up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within one tick.
    Idle,
}

/// One wake-up of the loop, stamped with the clock reading taken after it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub input: Input,
    pub at: Instant,
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<F: Fn() -> Instant> Clock for F {
    fn now(&self) -> Instant {
        self()
    }
}

/// Spawns a reader thread forwarding terminal keys and resizes. The thread
/// ends when the terminal errors or the receiver is dropped.
pub fn terminal_input() -> Receiver<Input> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || loop {
        let input = match event::read() {
            Ok(CtEvent::Key(key)) => Input::Key(key),
            Ok(CtEvent::Resize(_, _)) => Input::Resize,
            Ok(_) => continue,
            Err(e) => {
                log::error!("terminal input failed: {e}");
                break;
            }
        };
        if tx.send(input).is_err() {
            break;
        }
    });

    rx
}

/// The only consumer of game input. Keys and idle ticks come off one channel
/// in arrival order and are applied to the session one at a time, so a key
/// match and an expiry can never race for the same word.
pub struct Runner<C: Clock = SystemClock> {
    inputs: Receiver<Input>,
    tick_rate: Duration,
    clock: C,
}

impl Runner<SystemClock> {
    pub fn new(inputs: Receiver<Input>, tick_rate: Duration) -> Self {
        Self::with_clock(inputs, tick_rate, SystemClock)
    }
}

impl<C: Clock> Runner<C> {
    pub fn with_clock(inputs: Receiver<Input>, tick_rate: Duration, clock: C) -> Self {
        Self {
            inputs,
            tick_rate,
            clock,
        }
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Waits up to one tick for input. With every sender gone it keeps
    /// pacing at the tick rate, so the game clock still advances.
    pub fn step(&self) -> Step {
        let input = match self.inputs.recv_timeout(self.tick_rate) {
            Ok(input) => input,
            Err(RecvTimeoutError::Timeout) => Input::Idle,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(self.tick_rate);
                Input::Idle
            }
        };
        Step {
            input,
            at: self.clock.now(),
        }
    }

    /// Applies one step: a key is typed first, then the session clock moves
    /// to the step time. Ticking after every key keeps a fast typist from
    /// starving expiry.
    pub fn play<R: Rng>(&self, session: &mut GameSession<R>, step: &Step) -> Vec<GameEvent> {
        let mut events = match step.input {
            Input::Key(key) => session.on_key(Key::from(key)),
            Input::Resize | Input::Idle => Vec::new(),
        };
        events.extend(session.tick(step.at));
        events
    }
}
