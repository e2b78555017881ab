use serde::{Deserialize, Serialize};

/// Single-character commands understood by the motor controller firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorCommand {
    RotateClockwise,
    RotateCounterClockwise,
    StepClockwise,
    StepCounterClockwise,
    SwingClockwise,
    SwingCounterClockwise,
    Stop,
}

impl MotorCommand {
    pub const ALL: [MotorCommand; 7] = [
        MotorCommand::RotateClockwise,
        MotorCommand::RotateCounterClockwise,
        MotorCommand::StepClockwise,
        MotorCommand::StepCounterClockwise,
        MotorCommand::SwingClockwise,
        MotorCommand::SwingCounterClockwise,
        MotorCommand::Stop,
    ];

    /// Byte sent on the wire
    pub fn code(&self) -> u8 {
        match self {
            MotorCommand::RotateClockwise => b'q',
            MotorCommand::RotateCounterClockwise => b'w',
            MotorCommand::StepClockwise => b'a',
            MotorCommand::StepCounterClockwise => b's',
            MotorCommand::SwingClockwise => b'y',
            MotorCommand::SwingCounterClockwise => b'x',
            MotorCommand::Stop => b'b',
        }
    }

    /// Command followed by the newline terminator the firmware reads up to
    pub fn frame(&self) -> [u8; 2] {
        [self.code(), b'\n']
    }

    /// Everything except `Stop` sets the motor in motion and marks a trial start
    pub fn starts_movement(&self) -> bool {
        !matches!(self, MotorCommand::Stop)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MotorCommand::RotateClockwise => "rotate-cw",
            MotorCommand::RotateCounterClockwise => "rotate-ccw",
            MotorCommand::StepClockwise => "step-cw",
            MotorCommand::StepCounterClockwise => "step-ccw",
            MotorCommand::SwingClockwise => "swing-cw",
            MotorCommand::SwingCounterClockwise => "swing-ccw",
            MotorCommand::Stop => "stop",
        }
    }
}

impl std::fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<u8> = MotorCommand::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), MotorCommand::ALL.len());
    }

    #[test]
    fn test_frame_is_newline_terminated() {
        assert_eq!(&MotorCommand::Stop.frame(), b"b\n");
        assert_eq!(&MotorCommand::RotateClockwise.frame(), b"q\n");
    }

    #[test]
    fn test_only_stop_does_not_start_movement() {
        let starters: Vec<_> = MotorCommand::ALL
            .into_iter()
            .filter(|c| !c.starts_movement())
            .collect();
        assert_eq!(starters, vec![MotorCommand::Stop]);
    }
}
