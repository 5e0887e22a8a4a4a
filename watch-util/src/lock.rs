use named_lock::{NamedLock, NamedLockGuard};

/// Holds a system-wide named lock so only one watcher runs per service.
/// The name is not scoped by directory: one holder per machine.
pub fn init_process_lock(service_name: &str) -> Result<(NamedLock, NamedLockGuard), String> {
    let lock_name = format!("{}_lock", service_name);
    let lock = NamedLock::create(&lock_name).map_err(|e| {
        let msg = format!("Failed to create application lock {}: {}", lock_name, e);
        error!("{}", msg);
        msg
    })?;

    let guard = lock.try_lock().map_err(|e| {
        let msg = format!("Another instance of {} is already running: {}", service_name, e);
        error!("{}", msg);
        msg
    })?;

    Ok((lock, guard))
}
