//! # Platform-specific utilities
//!
//! Questo modulo centralizza la gestione cross-platform dei tool esterni:
//! nome dell'eseguibile per piattaforma e verifica della disponibilità nel PATH.

use std::sync::OnceLock;
use tracing::debug;

/// Platform-specific command manager
pub struct PlatformCommands {
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let which_command = if cfg!(windows) { "where" } else { "which" };
        Self { which_command }
    }

    /// Get the platform-specific executable name (`.exe` suffix on Windows)
    pub fn get_command(&self, base_name: &str) -> String {
        if cfg!(windows) && !base_name.to_ascii_lowercase().ends_with(".exe") {
            format!("{}.exe", base_name)
        } else {
            base_name.to_string()
        }
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &str {
        self.which_command
    }

    /// Check if a command is available on the system PATH
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);

        let result = tokio::process::Command::new(self.which_command)
            .arg(&command_name)
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("Could not run {} for {}: {}", self.which_command, command_name, e);
                false
            }
        }
    }
}
