pub mod domain;
pub mod library;
pub mod normalize;
pub mod ports;
pub mod preferences;
pub mod prompt;
pub mod provider;
pub mod service;

pub use domain::{AuthSession, Flashcard, FlashcardRecord, QARecord, SummaryRecord, User, UserCredentials};
pub use ports::{
    CompletionError, CompletionService, DatabaseService, GenerationError, PortError, PortResult,
};
pub use preferences::{FlashcardPreferences, SummaryPreferences};
pub use provider::{AiSettings, ApiCredential, ProviderDescriptor, ProviderKind};
pub use service::{Operation, StudyService};
