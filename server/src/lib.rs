//! HTTP service that turns a speech into memory-palace images: a text model splits
//! the speech into chunks with image prompts, then an image model draws each one.

pub mod analyzer;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod images;
pub mod metrics;
pub mod sample;
pub mod state;
pub mod validation;

pub use app::build_router;
pub use state::AppState;
