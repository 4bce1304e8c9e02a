//! Glitch filter
//!
//! Time-of-flight sensors now and then report a spurious near-zero
//! distance. A reading that collapses below a fraction of the reference
//! level is treated as one of those drop-outs and replaced by the last
//! accepted level. A drop-out lasts one sample: a reading that follows a
//! rejection is always accepted, so a real move to a low level shows up one
//! pass late instead of never.

use serde::{Deserialize, Serialize};

/// What a candidate level is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlitchReference {
    /// The channel's last accepted level
    #[default]
    Cached,
    /// The channel's slot in the pass being built. Every slot starts at
    /// zero, so with one reading per channel per pass nothing is rejected.
    PassSlot,
}

/// Outcome of filtering one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Drop-out detector
#[derive(Debug, Clone, Copy)]
pub struct GlitchFilter {
    ratio: f64,
    reference: GlitchReference,
}

impl GlitchFilter {
    /// Create a filter rejecting candidates below `ratio * reference`
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            reference: GlitchReference::Cached,
        }
    }

    pub fn with_reference(mut self, reference: GlitchReference) -> Self {
        self.reference = reference;
        self
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn reference(&self) -> GlitchReference {
        self.reference
    }

    /// Judge a candidate against the given reference level
    pub fn judge(&self, candidate: f64, reference: f64) -> Verdict {
        if candidate < self.ratio * reference {
            Verdict::Reject
        } else {
            Verdict::Accept
        }
    }

    /// Pick the reference according to the configured policy and judge
    pub fn check(&self, candidate: f64, cached: f64, pass_slot: f64) -> Verdict {
        let reference = match self.reference {
            GlitchReference::Cached => cached,
            GlitchReference::PassSlot => pass_slot,
        };
        self.judge(candidate, reference)
    }

    /// Like [`check`](Self::check), but never rejects two fresh readings in
    /// a row on the same channel
    pub fn screen(
        &self,
        candidate: f64,
        cached: f64,
        pass_slot: f64,
        previous: Verdict,
    ) -> Verdict {
        match previous {
            Verdict::Reject => Verdict::Accept,
            Verdict::Accept => self.check(candidate, cached, pass_slot),
        }
    }
}

impl Default for GlitchFilter {
    fn default() -> Self {
        Self::new(0.1)
    }
}
