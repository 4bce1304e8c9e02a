//! Scripted sensor
//!
//! Replays a queue of readings. Used to drive the keyboard deterministically
//! in tests and replays; more steps can be queued through a [`ScriptHandle`]
//! after the sensor has been handed to a keyboard.

use super::SensorChannel;
use crate::error::SensorFault;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One scripted poll
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    NotReady,
    Ready(f64),
    /// The readiness check fails
    Fault(String),
}

type Queue = Arc<Mutex<VecDeque<ScriptStep>>>;

fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<ScriptStep>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sensor that replays queued steps; reports not-ready once exhausted
pub struct ScriptedSensor {
    queue: Queue,
}

impl ScriptedSensor {
    /// Create an empty script
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a script from a list of steps
    pub fn from_steps(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(steps.into_iter().collect())),
        }
    }

    /// Create a script where every step is a ready reading
    pub fn from_distances(distances: impl IntoIterator<Item = f64>) -> Self {
        Self::from_steps(distances.into_iter().map(ScriptStep::Ready))
    }

    /// A handle for queueing further steps
    pub fn handle(&self) -> ScriptHandle {
        ScriptHandle {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Number of steps not yet consumed
    pub fn remaining(&self) -> usize {
        lock(&self.queue).len()
    }
}

impl Default for ScriptedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorChannel for ScriptedSensor {
    fn is_ready(&mut self) -> Result<bool, SensorFault> {
        let mut queue = lock(&self.queue);
        match queue.front() {
            None => Ok(false),
            // Left queued for raw_distance
            Some(ScriptStep::Ready(_)) => Ok(true),
            Some(ScriptStep::NotReady) => {
                queue.pop_front();
                Ok(false)
            }
            Some(ScriptStep::Fault(_)) => match queue.pop_front() {
                Some(ScriptStep::Fault(reason)) => Err(SensorFault(reason)),
                _ => Ok(false),
            },
        }
    }

    fn raw_distance(&mut self) -> Result<f64, SensorFault> {
        match lock(&self.queue).pop_front() {
            Some(ScriptStep::Ready(distance)) => Ok(distance),
            Some(ScriptStep::Fault(reason)) => Err(SensorFault(reason)),
            Some(ScriptStep::NotReady) | None => {
                Err(SensorFault::new("distance read with no measurement pending"))
            }
        }
    }
}

/// Shared handle onto a [`ScriptedSensor`]'s queue
#[derive(Clone)]
pub struct ScriptHandle {
    queue: Queue,
}

impl ScriptHandle {
    pub fn push(&self, step: ScriptStep) {
        lock(&self.queue).push_back(step);
    }

    pub fn push_ready(&self, distance: f64) {
        self.push(ScriptStep::Ready(distance));
    }

    pub fn push_not_ready(&self) {
        self.push(ScriptStep::NotReady);
    }

    pub fn push_fault(&self, reason: impl Into<String>) {
        self.push(ScriptStep::Fault(reason.into()));
    }
}
