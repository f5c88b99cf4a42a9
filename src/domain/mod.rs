//! Domain layer - Core business logic and entities

pub mod error;
pub mod registry;
pub mod translation;

pub use error::DomainError;
pub use registry::{ModelDescriptor, ModelGroup, ModelRegistry};
pub use translation::{
    render_instruction, FallbackAttempt, InvocationStrategy, TranslationOutcome,
    TranslationService, DEFAULT_SYSTEM_PROMPT,
};
