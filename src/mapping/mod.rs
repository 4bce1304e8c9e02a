//! Mapping key levels to playback parameters
//!
//! Levels from the keyboard are turned into voice volumes, press triggers
//! and the set of notes to sound.

mod mapper;
mod notes;
mod press;
mod volume;

pub use mapper::{Mapper, MappingPipeline};
pub use notes::{pressed_notes, KeyAssignment};
pub use press::PressDetector;
pub use volume::DepthVolumeMapper;
