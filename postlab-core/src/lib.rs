// Module declarations
pub mod core;

// Public API re-exports
pub use crate::core::post::{NewPost, Post};
pub use crate::core::storage::{Config, DEFAULT_ENDPOINT, SQLITE_FILE_NAME};
pub use crate::core::database::{PostStore, SCHEMA_VERSION};
pub use crate::core::request::{
    AttoTransport, HttpTransport, PostsClient, FETCH_LIMIT, JSON_CONTENT_TYPE,
};
pub use crate::core::app::{Outcome, PostsApp, TextDisplay, WorkflowKind};
