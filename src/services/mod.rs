// Service exports
pub mod messenger;
pub mod slack;
pub mod store;
pub mod templates;

pub use messenger::{InMemoryMessenger, Messenger, MessengerError};
pub use slack::{check_response, SlackClient, SlackOptions};
pub use store::{FileRecordStore, MemoryRecordStore, RecordStore, StoreError};
pub use templates::{render_match, TemplateError, Templates, DEFAULT_TEMPLATES};
