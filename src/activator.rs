//! firewalld activation via `firewall-cmd --complete-reload`.

use tracing::{error, info};

use crate::cmd_abstraction::{args_to_strings, CommandExecutor};

/// Ask firewalld to pick up the freshly written configuration.
///
/// Activation failure is reported but never unwinds the already-swapped
/// artifacts; the configuration stays written and the operator can
/// re-trigger the reload. Returns whether the reload succeeded.
pub fn reload_firewalld(executor: &dyn CommandExecutor) -> bool {
    info!("Reloading firewalld...");
    match executor.execute("firewall-cmd", &args_to_strings(&["--complete-reload"])) {
        Ok(output) if output.success => {
            info!("firewalld reload complete");
            true
        }
        Ok(output) => {
            error!(
                "firewall-cmd reload failed with exit code {:?}: {}",
                output.code,
                output.stderr.trim()
            );
            false
        }
        Err(e) => {
            error!("Failed to invoke firewall-cmd: {:#}", e);
            false
        }
    }
}
