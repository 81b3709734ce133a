pub mod health;
pub mod import;
pub mod playback;
pub mod report;
pub mod translation;
