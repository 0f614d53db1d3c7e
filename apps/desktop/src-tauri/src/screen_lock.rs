//! Display keep-awake handle with a strict scope: acquired at most once when
//! the main view mounts (and only if the setting asks for it and the
//! platform can do it), released unconditionally when the view unmounts.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use lingua_observability::trace;

pub trait DisplayInhibitor: Send + Sync {
    fn inhibit(&self) -> Result<()>;
    fn release(&self) -> Result<()>;
}

/// OS-backed inhibitor. Windows only; other platforms report unsupported
/// and the manager skips acquisition for them up front.
pub struct NativeInhibitor;

#[cfg(windows)]
impl DisplayInhibitor for NativeInhibitor {
    fn inhibit(&self) -> Result<()> {
        use windows_sys::Win32::System::Power::{
            SetThreadExecutionState, ES_CONTINUOUS, ES_DISPLAY_REQUIRED,
        };
        // Thread-affine: both calls must come from the same thread, which
        // the window-event loop guarantees.
        let prev = unsafe { SetThreadExecutionState(ES_CONTINUOUS | ES_DISPLAY_REQUIRED) };
        if prev == 0 {
            return Err(anyhow::anyhow!("SetThreadExecutionState failed"));
        }
        Ok(())
    }

    fn release(&self) -> Result<()> {
        use windows_sys::Win32::System::Power::{SetThreadExecutionState, ES_CONTINUOUS};
        let prev = unsafe { SetThreadExecutionState(ES_CONTINUOUS) };
        if prev == 0 {
            return Err(anyhow::anyhow!("SetThreadExecutionState failed"));
        }
        Ok(())
    }
}

#[cfg(not(windows))]
impl DisplayInhibitor for NativeInhibitor {
    fn inhibit(&self) -> Result<()> {
        Err(anyhow::anyhow!("screen-lock inhibition unsupported here"))
    }

    fn release(&self) -> Result<()> {
        Ok(())
    }
}

pub struct ScreenLockManager {
    inhibitor: Arc<dyn DisplayInhibitor>,
    supported: bool,
    held: Mutex<bool>,
}

impl ScreenLockManager {
    pub fn new(supported: bool) -> Self {
        Self::with_inhibitor(Arc::new(NativeInhibitor), supported)
    }

    pub fn with_inhibitor(inhibitor: Arc<dyn DisplayInhibitor>, supported: bool) -> Self {
        Self {
            inhibitor,
            supported,
            held: Mutex::new(false),
        }
    }

    /// Acquire on mount. Repeat calls while held are no-ops, so a mount can
    /// never stack a second handle.
    pub fn acquire_best_effort(&self, data_dir: &Path, wanted: bool) {
        if !wanted || !self.supported {
            return;
        }
        let mut held = self.held.lock().unwrap();
        if *held {
            return;
        }
        match self.inhibitor.inhibit() {
            Ok(()) => {
                *held = true;
                trace::event(data_dir, None, "ScreenLock", "SCREENLOCK.acquire", "ok", None);
            }
            Err(e) => {
                let span = lingua_observability::Span::start(
                    data_dir,
                    None,
                    "ScreenLock",
                    "SCREENLOCK.acquire",
                    None,
                );
                span.err_anyhow("platform", "E_SCREENLOCK_ACQUIRE", &e, None);
            }
        }
    }

    /// Release on unmount, no matter how the unmount happened. Releasing
    /// without a held handle is a no-op.
    pub fn release_best_effort(&self, data_dir: &Path) {
        let mut held = self.held.lock().unwrap();
        if !*held {
            return;
        }
        *held = false;
        match self.inhibitor.release() {
            Ok(()) => {
                trace::event(data_dir, None, "ScreenLock", "SCREENLOCK.release", "ok", None);
            }
            Err(e) => {
                let span = lingua_observability::Span::start(
                    data_dir,
                    None,
                    "ScreenLock",
                    "SCREENLOCK.release",
                    None,
                );
                span.err_anyhow("platform", "E_SCREENLOCK_RELEASE", &e, None);
            }
        }
    }

    #[cfg(test)]
    fn is_held(&self) -> bool {
        *self.held.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingInhibitor {
        inhibits: AtomicUsize,
        releases: AtomicUsize,
    }

    impl DisplayInhibitor for CountingInhibitor {
        fn inhibit(&self) -> Result<()> {
            self.inhibits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn release(&self) -> Result<()> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn one_acquire_per_mount_even_when_called_twice() {
        let td = tempfile::tempdir().expect("tempdir");
        let fake = Arc::new(CountingInhibitor::default());
        let mgr = ScreenLockManager::with_inhibitor(fake.clone(), true);
        mgr.acquire_best_effort(td.path(), true);
        mgr.acquire_best_effort(td.path(), true);
        assert_eq!(fake.inhibits.load(Ordering::SeqCst), 1);
        assert!(mgr.is_held());
    }

    #[test]
    fn unmount_always_pairs_the_release() {
        let td = tempfile::tempdir().expect("tempdir");
        let fake = Arc::new(CountingInhibitor::default());
        let mgr = ScreenLockManager::with_inhibitor(fake.clone(), true);

        // Rapid mount/unmount cycles leak nothing.
        for _ in 0..3 {
            mgr.acquire_best_effort(td.path(), true);
            mgr.release_best_effort(td.path());
        }
        assert_eq!(fake.inhibits.load(Ordering::SeqCst), 3);
        assert_eq!(fake.releases.load(Ordering::SeqCst), 3);
        assert!(!mgr.is_held());

        // Releasing with nothing held stays quiet.
        mgr.release_best_effort(td.path());
        assert_eq!(fake.releases.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn disabled_setting_or_platform_never_touches_the_inhibitor() {
        let td = tempfile::tempdir().expect("tempdir");
        let fake = Arc::new(CountingInhibitor::default());

        let mgr = ScreenLockManager::with_inhibitor(fake.clone(), true);
        mgr.acquire_best_effort(td.path(), false);
        assert_eq!(fake.inhibits.load(Ordering::SeqCst), 0);

        let mgr = ScreenLockManager::with_inhibitor(fake.clone(), false);
        mgr.acquire_best_effort(td.path(), true);
        assert_eq!(fake.inhibits.load(Ordering::SeqCst), 0);
    }
}
