//! Note assignment per key

use super::PressDetector;
use serde::{Deserialize, Serialize};

/// Notes sounded by one key.
///
/// In YAML a single note is a bare number (`60`) and a chord is a list
/// (`[60, 64, 67]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyAssignment {
    Single(u8),
    Chord(Vec<u8>),
}

impl KeyAssignment {
    /// The notes of this key, in order
    pub fn notes(&self) -> &[u8] {
        match self {
            KeyAssignment::Single(note) => std::slice::from_ref(note),
            KeyAssignment::Chord(notes) => notes,
        }
    }
}

/// Notes for every pressed key, each note once, in first-seen order.
///
/// Keys without an assignment are ignored.
pub fn pressed_notes(
    levels: &[f64],
    assignments: &[KeyAssignment],
    detector: &PressDetector,
) -> Vec<u8> {
    let mut notes = Vec::new();
    for (&level, assignment) in levels.iter().zip(assignments) {
        if !detector.is_pressed(level) {
            continue;
        }
        for &note in assignment.notes() {
            if !notes.contains(&note) {
                notes.push(note);
            }
        }
    }
    notes
}
