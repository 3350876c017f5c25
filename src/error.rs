//! Crate error type

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not inside a Hyprland session ({0} is not set)")]
    NoInstance(&'static str),
    #[error("hyprland socket i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected reply from hyprland: {0}")]
    Json(#[from] serde_json::Error),
    #[error("hyprland rejected `{command}`: {reply}")]
    Rejected { command: String, reply: String },
}
