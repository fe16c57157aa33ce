//! Invocation of external programs (the e-book converter and viewer).
//!
//! The library builds argument vectors itself and hands them to a [`Converter`].
//! [`ProcessConverter`] runs them as child processes; tests substitute a
//! recording implementation.

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Runs an argument vector to completion.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Runs `command` (program followed by its arguments) and waits for it to exit.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the program reported success
    /// * `Err(Error)` - The program could not be started
    async fn run(&self, command: &[String]) -> Result<bool>;
}

/// Runs commands as blocking child processes, inheriting stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessConverter;

#[async_trait]
impl Converter for ProcessConverter {
    async fn run(&self, command: &[String]) -> Result<bool> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Config("Command template is empty".to_string()))?;

        debug!("Running {:?}", command);
        let status = Command::new(program).args(args).status().await?;
        debug!("{} exited with {}", program, status);

        Ok(status.success())
    }
}
