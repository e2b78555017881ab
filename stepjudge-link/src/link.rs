use crate::{LinkError, LinkSettings};
use log::{info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Write;
use stepjudge_core::MotorCommand;

/// Outbound channel to the motor controller
pub trait MotorLink {
    fn send(&mut self, command: MotorCommand) -> Result<(), LinkError>;

    /// False when running without hardware
    fn is_connected(&self) -> bool;

    /// Bytes actually written to the device since the link was opened
    fn bytes_sent(&self) -> usize;
}

impl<L: MotorLink + ?Sized> MotorLink for Box<L> {
    fn send(&mut self, command: MotorCommand) -> Result<(), LinkError> {
        (**self).send(command)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn bytes_sent(&self) -> usize {
        (**self).bytes_sent()
    }
}

/// Writes command frames to any byte sink
#[derive(Debug)]
pub struct WriterLink<W: Write> {
    writer: W,
    bytes_sent: usize,
}

impl<W: Write> WriterLink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_sent: 0,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> MotorLink for WriterLink<W> {
    fn send(&mut self, command: MotorCommand) -> Result<(), LinkError> {
        let frame = command.frame();
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        self.bytes_sent += frame.len();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }
}

pub type SerialMotorLink = WriterLink<Box<dyn SerialPort>>;

impl WriterLink<Box<dyn SerialPort>> {
    /// Opens the port 8N1 without flow control and waits out the board reset
    pub fn open(settings: &LinkSettings) -> Result<Self, LinkError> {
        let port = serialport::new(&settings.port, settings.baud_rate)
            .timeout(settings.timeout)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|source| LinkError::Open {
                port: settings.port.clone(),
                source,
            })?;

        info!(
            "Serial port {} opened at {} baud",
            settings.port, settings.baud_rate
        );
        std::thread::sleep(settings.reset_delay);

        Ok(WriterLink::new(port))
    }
}

/// Stand-in used when the serial port is unavailable; every send is a no-op
#[derive(Debug, Default)]
pub struct OfflineLink;

impl MotorLink for OfflineLink {
    fn send(&mut self, command: MotorCommand) -> Result<(), LinkError> {
        warn!("Serial connection is not open, dropping {command}");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn bytes_sent(&self) -> usize {
        0
    }
}

/// Opens the configured port, falling back to [`OfflineLink`] on failure.
/// The failure is logged here once; the caller never sees it.
pub fn open_or_offline(settings: &LinkSettings) -> Box<dyn MotorLink> {
    match SerialMotorLink::open(settings) {
        Ok(link) => Box::new(link),
        Err(e) => {
            warn!("{e}; continuing without hardware");
            Box::new(OfflineLink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_link_frames_commands() {
        let mut link = WriterLink::new(Vec::new());
        link.send(MotorCommand::RotateClockwise).unwrap();
        link.send(MotorCommand::Stop).unwrap();

        assert_eq!(link.get_ref().as_slice(), b"q\nb\n");
        assert_eq!(link.bytes_sent(), 4);
        assert!(link.is_connected());
    }

    #[test]
    fn test_write_failure_surfaces_as_link_error() {
        let mut link = WriterLink::new(BrokenPipe);
        let err = link.send(MotorCommand::SwingClockwise).unwrap_err();

        assert!(matches!(err, LinkError::Write(_)));
        assert_eq!(link.bytes_sent(), 0);
    }

    #[test]
    fn test_offline_link_transmits_nothing() {
        let mut link = OfflineLink;
        for cmd in MotorCommand::ALL {
            assert!(link.send(cmd).is_ok());
        }
        assert!(!link.is_connected());
        assert_eq!(link.bytes_sent(), 0);
    }

    #[test]
    fn test_missing_port_falls_back_to_offline() {
        let settings = LinkSettings::new("/dev/stepjudge-does-not-exist");
        let mut link = open_or_offline(&settings);

        assert!(!link.is_connected());
        assert!(link.send(MotorCommand::Stop).is_ok());
        assert_eq!(link.bytes_sent(), 0);
    }

    #[test]
    fn test_open_error_names_port() {
        let settings = LinkSettings::new("/dev/stepjudge-does-not-exist");
        let err = SerialMotorLink::open(&settings).err().unwrap();
        assert!(err.to_string().contains("/dev/stepjudge-does-not-exist"));
    }
}
