pub mod dispatch;
pub mod error;
pub mod hashing;
pub mod jobs;
pub mod model;
pub mod payload;
pub mod scheduler;
pub mod service;
pub mod speech;

pub use dispatch::{QueuedDispatcher, Task, TaskDispatcher, TokioDispatcher};
pub use error::TranslationServiceError;
pub use jobs::{InMemoryJobStateStore, JobState, JobStateStore, JobStatus};
pub use model::*;
pub use payload::build_localized_payload;
pub use scheduler::TranslationScheduler;
pub use service::{SynthesisPolicy, TranslationService, TranslationServiceApi};
pub use speech::SpeechSynthesizer;
