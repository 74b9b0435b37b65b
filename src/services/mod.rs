// Service exports
pub mod job;
pub mod notifier;
pub mod profiles;
pub mod store;

pub use job::{JobError, MatchingJob};
pub use notifier::{LogNotifier, MatchNotifier, NotifyError};
pub use profiles::{JsonExportSource, ProfileSource, ProfileSourceError};
pub use store::{InMemoryMatchStore, MatchStore, StoreError};
