//! notes-client: runtime pieces of the notes client.
//!
//! Builds on `notes-core` with the tokio- and reqwest-backed parts:
//! - `HttpNotesApi`, the REST transport
//! - `Debouncer` and `AlertEmitter`, the timed behaviors
//! - `Config`, loaded from the environment
//! - `NotesApp`, the facade a UI shell drives

pub mod alerts;
pub mod app;
pub mod config;
pub mod debounce;
pub mod http;
pub mod timer;

pub use alerts::AlertEmitter;
pub use app::NotesApp;
pub use config::{Config, ConfigError};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use http::HttpNotesApi;
pub use timer::ScheduledTask;
