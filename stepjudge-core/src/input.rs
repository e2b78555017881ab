use crate::{Direction, MotorCommand};

/// Discrete participant/operator inputs fed to the trial controller.
///
/// `Rate` carries the raw number so out-of-range values can reach the
/// controller and be rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Choose(Direction),
    Rate(u8),
    Move(MotorCommand),
}
