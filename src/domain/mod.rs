pub mod generation;
pub mod import;
pub mod language;
pub mod playback;
pub mod report;
pub mod translation;
