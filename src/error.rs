//! Error types

use thiserror::Error;

/// Errors surfaced by emberfall
///
/// Only construction, configuration and host setup can fail. Once a
/// `FlameAnimation` exists, none of its operations return errors.
#[derive(Error, Debug)]
pub enum FlameError {
    #[error("surface cannot provide a 2D paint context")]
    NoContext,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
    #[error("at least one color scheme is required")]
    EmptyPalette,
    #[error("display error: {0}")]
    Display(String),
    #[error("remote control error: {0}")]
    Control(String),
}

pub type Result<T> = std::result::Result<T, FlameError>;
