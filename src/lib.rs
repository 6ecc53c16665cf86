// ABOUTME: Public library API for the SiYuan client
// ABOUTME: Re-exports the client, payload models and error types

pub mod api;
pub mod auth;
pub mod cli;
pub mod error;
pub mod model;

pub use api::{ApiClient, DEFAULT_BASE_URL, DEFAULT_PUSH_TIMEOUT_MS};
pub use error::{Error, Result};
pub use model::{
    BlockKramdown, BootProgress, DataType, Envelope, ExportedMarkdown, NotebookConf,
    NotebookConfig, NotebookInfo, OperationInfo, RenderedTemplate,
};
