//! CLI command implementations.

pub mod refresh;
pub mod reset;
pub mod set_profile;
pub mod show_subnets;
pub mod status;

use anyhow::Result;

/// Check for root privileges (effective UID 0).
///
/// Mutating commands write under /etc/firewalld and /var/lib and invoke
/// firewall-cmd, all of which need root.
pub(crate) fn check_root() -> Result<()> {
    // SAFETY: geteuid() reads the effective user ID, has no preconditions,
    // and cannot fail.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        anyhow::bail!("Operation aborted: please run as root");
    }
    Ok(())
}
