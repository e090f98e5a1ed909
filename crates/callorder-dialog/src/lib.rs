//! Dialog session engine for the phone ordering line.
//!
//! Drives one call at a time through a strict stage machine:
//! ORDERING_ID -> SELECTING_OPTION -> CONFIRMING_ITEM -> ASK_ADD_MORE ->
//! CONFIRMING_ORDER -> COMPLETED. Sessions live in a per-call serialized
//! [`SessionStore`]; every turn yields exactly one [`ResponseDirective`].

pub mod acquisition;
pub mod assembler;
pub mod confirmation;
pub mod directive;
pub mod engine;
pub mod error;
pub mod prompts;
pub mod resolver;
pub mod session;
pub mod stage;

pub use acquisition::TurnSignals;
pub use confirmation::{parse_confirmation, Confirmation};
pub use directive::{InputMode, ResponseDirective, SpeechTimeout};
pub use engine::DialogEngine;
pub use error::DialogError;
pub use resolver::CatalogResolver;
pub use session::{CallSession, PendingItem, SessionStore};
pub use stage::Stage;
