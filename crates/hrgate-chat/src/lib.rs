//! Conversation engine: message history mutations, keyword intent routing,
//! the chat orchestrator and the PDF job poller.

pub mod history;
pub mod intent;
pub mod orchestrator;
pub mod poller;

pub use history::{append, delete, edit, DeleteOutcome, EditOutcome};
pub use intent::{classify, Intent};
pub use orchestrator::{ChatBackend, ChatOrchestrator, EditReply, TurnReply};
pub use poller::{JobStatusSource, JobTracker, ReportedState, StatusReport};
