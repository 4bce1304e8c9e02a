//! Output sinks and the silence guard

use std::ops::{Deref, DerefMut};
use tracing::info;

/// Where per-channel volumes end up (mixer voices, a meter, ...)
pub trait OutputSink {
    /// Number of channels the sink drives
    fn channels(&self) -> usize;

    /// Set one channel's volume
    fn set_level(&mut self, channel: usize, level: f64);

    /// Drive every channel to zero
    fn silence(&mut self) {
        for channel in 0..self.channels() {
            self.set_level(channel, 0.0);
        }
    }
}

/// Holds a sink for the duration of a polling loop and silences it when
/// dropped, whether the loop finished, returned an error or panicked.
pub struct SilenceGuard<'a, S: OutputSink + ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: OutputSink + ?Sized> SilenceGuard<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }
}

impl<S: OutputSink + ?Sized> Deref for SilenceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.sink
    }
}

impl<S: OutputSink + ?Sized> DerefMut for SilenceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.sink
    }
}

impl<S: OutputSink + ?Sized> Drop for SilenceGuard<'_, S> {
    fn drop(&mut self) {
        self.sink.silence();
        info!(channels = self.sink.channels(), "outputs silenced");
    }
}

/// Sink that keeps the latest volume of each channel in memory
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySink {
    levels: Vec<f64>,
    writes: u64,
}

impl MemorySink {
    pub fn new(channels: usize) -> Self {
        Self {
            levels: vec![0.0; channels],
            writes: 0,
        }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Total `set_level` calls
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn is_silent(&self) -> bool {
        self.levels.iter().all(|&level| level == 0.0)
    }
}

impl OutputSink for MemorySink {
    fn channels(&self) -> usize {
        self.levels.len()
    }

    fn set_level(&mut self, channel: usize, level: f64) {
        if let Some(slot) = self.levels.get_mut(channel) {
            *slot = level;
            self.writes += 1;
        }
    }
}
