use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Clock used to timestamp trials and to hold the motor settling delay
pub trait Timer: Clone {
    /// Wall-clock time, monotonic for the lifetime of the timer
    fn now(&self) -> DateTime<Utc>;
    fn elapsed(&self, since: DateTime<Utc>) -> Duration {
        (self.now() - since).to_std().unwrap_or(Duration::ZERO)
    }
    /// Blocks the calling thread
    fn sleep(&self, d: Duration);
}

/// Wall clock anchored once at construction and advanced by a monotonic
/// `Instant`, so system clock adjustments mid-session cannot reorder
/// timestamps.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    anchor: DateTime<Utc>,
    start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.start.elapsed())
            .unwrap_or(chrono::Duration::zero());
        self.anchor + elapsed
    }

    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            anchor: Utc::now(),
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // Resume with the remainder when a signal interrupts the sleep
        loop {
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) };
            if rc != EINTR {
                break;
            }
            req = rem;
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic timer: time only moves when `sleep` or `advance` is called.
///
/// Clones share the same clock, so a test can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone)]
pub struct SimulatedTimer {
    now: Rc<Cell<DateTime<Utc>>>,
    sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl SimulatedTimer {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
            sleeps: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn advance(&self, d: Duration) {
        let step = chrono::Duration::from_std(d).unwrap_or(chrono::Duration::zero());
        self.now.set(self.now.get() + step);
    }

    /// Every duration passed to `sleep`, in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.borrow().iter().sum()
    }
}

impl Default for SimulatedTimer {
    fn default() -> Self {
        Self::starting_at(DateTime::<Utc>::default())
    }
}

impl Timer for SimulatedTimer {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn sleep(&self, d: Duration) {
        self.sleeps.borrow_mut().push(d);
        self.advance(d);
    }
}
