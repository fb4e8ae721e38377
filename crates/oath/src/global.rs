//! Host Default Installer
//!
//! Process-wide default scheduler slot. `install` occupies the slot only if
//! it is empty; `uninstall` clears it only if it still holds the instance
//! `install` put there, so a host-provided scheduler is never clobbered.
//! Nothing in the core depends on this slot.

use std::sync::Mutex;

use crate::scheduler::Scheduler;

struct Slot {
    current: Option<Scheduler>,
    /// The instance `install` created, if it is the one installed.
    owned: Option<Scheduler>,
}

static SLOT: Mutex<Slot> = Mutex::new(Slot {
    current: None,
    owned: None,
});

/// Install a library scheduler as the host default, only if none exists.
/// Returns whether this call performed the installation.
pub fn install() -> bool {
    let mut slot = SLOT.lock().unwrap();
    if slot.current.is_some() {
        return false;
    }
    tracing::debug!("installing library scheduler as host default");
    let scheduler = Scheduler::new();
    slot.owned = Some(scheduler.clone());
    slot.current = Some(scheduler);
    true
}

/// Clear the default scheduler, only if it is the one `install` put there.
/// Returns whether anything was removed.
pub fn uninstall() -> bool {
    let mut slot = SLOT.lock().unwrap();
    let ours = match (&slot.current, &slot.owned) {
        (Some(current), Some(owned)) => current.same_instance(owned),
        _ => false,
    };
    if ours {
        tracing::debug!("uninstalling library scheduler");
        slot.current = None;
        slot.owned = None;
    }
    ours
}

/// Occupy the slot with a host-provided scheduler. Returns false if the
/// slot is already taken.
pub fn set_default_scheduler(scheduler: Scheduler) -> bool {
    let mut slot = SLOT.lock().unwrap();
    if slot.current.is_some() {
        return false;
    }
    slot.current = Some(scheduler);
    true
}

/// The currently installed default scheduler, if any.
pub fn default_scheduler() -> Option<Scheduler> {
    SLOT.lock().unwrap().current.clone()
}
