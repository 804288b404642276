//! Hook commands run on dock changes

use dock_watch::DockSink;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Environment variable carrying the new state to hook commands
pub const DOCKED_ENV: &str = "DOCKSWITCH_DOCKED";

/// External command configured by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Sink that launches the configured command for each transition
///
/// Commands run detached; the worker never waits for them.
#[derive(Debug, Default)]
pub struct HookSink {
    on_docked: Option<HookCommand>,
    on_undocked: Option<HookCommand>,
}

impl HookSink {
    pub fn new(on_docked: Option<HookCommand>, on_undocked: Option<HookCommand>) -> Self {
        Self {
            on_docked,
            on_undocked,
        }
    }

    fn hook_for(&self, docked: bool) -> Option<&HookCommand> {
        if docked {
            self.on_docked.as_ref()
        } else {
            self.on_undocked.as_ref()
        }
    }
}

impl DockSink for HookSink {
    fn on_dock_change(&mut self, docked: bool) {
        let Some(hook) = self.hook_for(docked) else {
            debug!("No hook configured for docked={}", docked);
            return;
        };

        let mut child = match Command::new(&hook.program)
            .args(&hook.args)
            .env(DOCKED_ENV, if docked { "1" } else { "0" })
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to run hook {}: {}", hook.program, e);
                return;
            }
        };

        let program = hook.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => info!("Hook {} finished", program),
                Ok(status) => warn!("Hook {} exited with {}", program, status),
                Err(e) => warn!("Failed to wait for hook {}: {}", program, e),
            }
        });
    }
}
