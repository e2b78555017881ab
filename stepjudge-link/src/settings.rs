use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Open and write timeout
    pub timeout: Duration,
    /// Opening the port resets most Arduino-style boards; wait this long
    /// for the firmware before sending anything
    pub reset_delay: Duration,
}

impl LinkSettings {
    pub const DEFAULT_BAUD: u32 = 9600;

    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn default_port() -> &'static str {
        if cfg!(windows) { "COM10" } else { "/dev/ttyACM0" }
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            port: Self::default_port().to_string(),
            baud_rate: Self::DEFAULT_BAUD,
            timeout: Duration::from_secs(2),
            reset_delay: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = LinkSettings::default();
        assert_eq!(s.baud_rate, 9600);
        assert_eq!(s.timeout, Duration::from_secs(2));
        assert_eq!(s.reset_delay, Duration::from_secs(2));
        assert!(!s.port.is_empty());
    }

    #[test]
    fn test_new_overrides_port_only() {
        let s = LinkSettings::new("/dev/ttyUSB3");
        assert_eq!(s.port, "/dev/ttyUSB3");
        assert_eq!(s.baud_rate, LinkSettings::DEFAULT_BAUD);
    }
}
