use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

pub const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Somewhere the spinner text is shown
pub trait DisplaySlot: Send + Sync {
    fn set(&self, text: &str);

    fn clear(&self) {
        self.set("");
    }
}

impl DisplaySlot for Mutex<String> {
    fn set(&self, text: &str) {
        match self.lock() {
            Ok(mut guard) => {
                guard.clear();
                guard.push_str(text);
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                guard.clear();
                guard.push_str(text);
            }
        }
    }
}

/// Spinner line on stderr, redrawn in place
#[derive(Debug, Default)]
pub struct StderrSlot {
    width: Mutex<usize>,
}

impl DisplaySlot for StderrSlot {
    fn set(&self, text: &str) {
        let mut width = self.width.lock().unwrap_or_else(|p| p.into_inner());
        let pad = width.saturating_sub(text.chars().count());
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{text}{}", " ".repeat(pad));
        if text.is_empty() {
            let _ = write!(stderr, "\r");
        }
        let _ = stderr.flush();
        *width = text.chars().count();
    }
}

/// Cycles a textual spinner on its own thread while a job runs.
///
/// Each `start` gets a fresh running flag, so a driver thread left over from
/// a previous job never sees a later job's flag.
pub struct AnimationDriver {
    slot: Arc<dyn DisplaySlot>,
    interval: Duration,
    running: Mutex<Arc<AtomicBool>>,
}

impl AnimationDriver {
    pub fn new(slot: Arc<dyn DisplaySlot>, interval: Duration) -> Self {
        Self {
            slot,
            interval,
            running: Mutex::new(Arc::new(AtomicBool::new(false))),
        }
    }

    fn current(&self) -> Arc<AtomicBool> {
        let guard = self.running.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&guard)
    }

    pub fn is_running(&self) -> bool {
        self.current().load(Ordering::SeqCst)
    }

    /// Spawn the spinner thread. Returns `Ok(false)` without spawning if a
    /// spinner is already running.
    pub fn start(&self) -> std::io::Result<bool> {
        let mut guard = self.running.lock().unwrap_or_else(|p| p.into_inner());
        if guard.load(Ordering::SeqCst) {
            warn!("animation already running, ignoring start");
            return Ok(false);
        }

        let running = Arc::new(AtomicBool::new(true));
        let slot = Arc::clone(&self.slot);
        let interval = self.interval;
        let flag = Arc::clone(&running);

        thread::Builder::new()
            .name("spinner".into())
            .spawn(move || spin(slot.as_ref(), &flag, interval))?;

        *guard = running;
        debug!("animation started");
        Ok(true)
    }

    /// Ask the spinner to stop. Does not block; the slot is cleared by the
    /// spinner thread within one interval.
    pub fn stop(&self) {
        self.current().store(false, Ordering::SeqCst);
        debug!("animation stop requested");
    }
}

fn spin(slot: &dyn DisplaySlot, running: &AtomicBool, interval: Duration) {
    'outer: while running.load(Ordering::SeqCst) {
        for frame in SPINNER_FRAMES {
            if !running.load(Ordering::SeqCst) {
                break 'outer;
            }
            slot.set(&format!("Processing {frame}"));
            thread::sleep(interval);
        }
    }
    slot.clear();
}
