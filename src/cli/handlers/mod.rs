//! Command handlers for CLI operations
//!
//! This module contains handlers for different CLI commands,
//! separating command execution logic from parsing and validation.

pub mod channels;
pub mod check;
pub mod send;

pub use channels::ChannelsCommandHandler;
pub use check::CheckCommandHandler;
pub use send::SendCommandHandler;

use std::io::Write;

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(|e| AppError::Internal {
        source: e.into(),
    })?;
    writeln!(out).map_err(|e| AppError::Internal { source: e.into() })
}
