//! Serial link to the stepper controller.
//!
//! Commands are fire-and-forget: one ASCII byte plus `\n`, nothing is read
//! back. When the port cannot be opened the program keeps running on an
//! [`OfflineLink`].

pub mod error;
pub mod link;
pub mod settings;

pub use error::LinkError;
pub use link::{open_or_offline, MotorLink, OfflineLink, SerialMotorLink, WriterLink};
pub use settings::LinkSettings;
