pub mod command;
pub mod input;
pub mod screen;
pub mod trial;

pub use command::MotorCommand;
pub use input::Input;
pub use screen::Screen;
pub use trial::{Confidence, ConfidenceOutOfRange, Direction, TrialRecord};
