use std::time::Duration;

use log::{debug, warn};
use stepjudge_core::MotorCommand;
use stepjudge_link::MotorLink;
use stepjudge_timing::Timer;

/// Sends motor commands and holds the caller for the settling delay.
///
/// `dispatch` does not return until the delay has elapsed, whether the write
/// succeeded, failed or the link is offline. Inputs arriving meanwhile wait
/// in the event queue, which keeps the participant from flooding the
/// controller with commands.
pub struct CommandDispatcher<L: MotorLink, T: Timer> {
    link: L,
    timer: T,
    settle_delay: Duration,
}

impl<L: MotorLink, T: Timer> CommandDispatcher<L, T> {
    pub fn new(link: L, timer: T, settle_delay: Duration) -> Self {
        Self {
            link,
            timer,
            settle_delay,
        }
    }

    /// Returns whether the command reached the link
    pub fn dispatch(&mut self, command: MotorCommand) -> bool {
        let delivered = match self.link.send(command) {
            Ok(()) => {
                debug!("Sent {command} ({})", command.code() as char);
                true
            }
            Err(e) => {
                warn!("Dropping {command}: {e}");
                false
            }
        };
        self.timer.sleep(self.settle_delay);
        delivered
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use stepjudge_link::{OfflineLink, WriterLink};
    use stepjudge_timing::SimulatedTimer;

    struct Unplugged;

    impl Write for Unplugged {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::NotConnected, "cable pulled"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_writes_then_settles() {
        let timer = SimulatedTimer::default();
        let mut dispatcher =
            CommandDispatcher::new(WriterLink::new(Vec::new()), timer.clone(), Duration::from_secs(1));

        assert!(dispatcher.dispatch(MotorCommand::StepClockwise));
        assert!(dispatcher.dispatch(MotorCommand::Stop));

        assert_eq!(dispatcher.link().get_ref().as_slice(), b"a\nb\n");
        assert_eq!(timer.sleeps(), vec![Duration::from_secs(1); 2]);
    }

    #[test]
    fn test_write_failure_still_settles() {
        let timer = SimulatedTimer::default();
        let mut dispatcher =
            CommandDispatcher::new(WriterLink::new(Unplugged), timer.clone(), Duration::from_secs(1));

        assert!(!dispatcher.dispatch(MotorCommand::RotateClockwise));
        assert_eq!(timer.total_slept(), Duration::from_secs(1));
        assert_eq!(dispatcher.link().bytes_sent(), 0);
    }

    #[test]
    fn test_offline_link_still_settles() {
        let timer = SimulatedTimer::default();
        let mut dispatcher =
            CommandDispatcher::new(OfflineLink, timer.clone(), Duration::from_millis(300));

        assert!(dispatcher.dispatch(MotorCommand::SwingCounterClockwise));
        assert_eq!(timer.sleeps(), vec![Duration::from_millis(300)]);
        assert_eq!(dispatcher.link().bytes_sent(), 0);
    }
}
