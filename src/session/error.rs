//! Session errors.

use std::io;
use thiserror::Error;

/// Errors that end (or prevent) an interactive session.
///
/// Command failures are not session errors: they are [`crate::shell::ShellError`]s,
/// reported at the prompt.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a dtsh session is already open")]
    SessionAlreadyOpen,

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("history: {0:#}")]
    History(anyhow::Error),

    #[error("failed to open devicetree: {0:#}")]
    Devicetree(anyhow::Error),

    #[error("failed to install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_chain_in_message() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("No such file or directory"));
        let err = err.context("Failed to read board.json").unwrap_err();
        assert_eq!(
            SessionError::Devicetree(err).to_string(),
            "failed to open devicetree: Failed to read board.json: No such file or directory"
        );
    }
}
