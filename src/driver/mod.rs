//! Polling loop that feeds key levels to an output
//!
//! The driver polls the keyboard, maps each level to a volume for the sink
//! and works out which notes are held. The loop runs inside a
//! [`SilenceGuard`], so every output is zeroed however the loop ends.

mod sink;

pub use sink::{MemorySink, OutputSink, SilenceGuard};

use crate::error::Result;
use crate::keyboard::{Keyboard, Levels};
use crate::mapping::{pressed_notes, KeyAssignment, MappingPipeline, PressDetector};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Result of one driver tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub index: u64,
    pub levels: Levels,
    pub volumes: Vec<f64>,
    /// Notes of every pressed key
    pub notes: Vec<u8>,
}

/// How long and how fast to run the loop
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause between passes
    pub interval: Duration,
    /// Stop after this many ticks (None = until stopped)
    pub max_ticks: Option<u64>,
    /// Set to end the loop after the current tick
    pub stop: Arc<AtomicBool>,
}

impl RunOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }
}

/// Drives outputs from the keyboard
pub struct Driver {
    keyboard: Keyboard,
    volume: MappingPipeline,
    press: PressDetector,
    keys: Vec<KeyAssignment>,
    last: Option<Levels>,
    ticks: u64,
}

impl Driver {
    pub fn new(keyboard: Keyboard, volume: MappingPipeline) -> Self {
        Self {
            keyboard,
            volume,
            press: PressDetector::default(),
            keys: Vec::new(),
            last: None,
            ticks: 0,
        }
    }

    /// Set the press detector used for note selection
    pub fn with_press(mut self, press: PressDetector) -> Self {
        self.press = press;
        self
    }

    /// Set the notes each key sounds
    pub fn with_keys(mut self, keys: Vec<KeyAssignment>) -> Self {
        self.keys = keys;
        self
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn into_keyboard(self) -> Keyboard {
        self.keyboard
    }

    /// Poll once and push the resulting volumes to the sink
    pub fn tick<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<Tick> {
        let levels = self.keyboard.poll_all()?;
        let volumes = self.volume.apply_all(&levels);
        for (channel, &volume) in volumes.iter().enumerate() {
            sink.set_level(channel, volume);
        }
        let notes = pressed_notes(&levels, &self.keys, &self.press);

        if self.last.as_ref() != Some(&levels) {
            debug!(tick = self.ticks, ?levels, ?notes, "levels changed");
            self.last = Some(levels.clone());
        }

        let tick = Tick {
            index: self.ticks,
            levels,
            volumes,
            notes,
        };
        self.ticks += 1;
        Ok(tick)
    }

    /// Poll until stopped, the tick limit is reached, or a sensor fails.
    ///
    /// The sink is silenced on every way out. Returns the number of ticks
    /// completed.
    pub fn run<S, F>(&mut self, sink: &mut S, options: &RunOptions, mut on_tick: F) -> Result<u64>
    where
        S: OutputSink + ?Sized,
        F: FnMut(&Tick),
    {
        let mut guard = SilenceGuard::new(sink);
        let mut completed = 0;
        info!(interval = ?options.interval, max_ticks = ?options.max_ticks, "polling started");

        while !options.stop.load(Ordering::SeqCst) {
            if options.max_ticks.is_some_and(|max| completed >= max) {
                break;
            }

            let tick = self.tick(&mut *guard)?;
            on_tick(&tick);
            completed += 1;

            if !options.interval.is_zero() {
                std::thread::sleep(options.interval);
            }
        }

        info!(ticks = completed, "polling stopped");
        Ok(completed)
    }
}
