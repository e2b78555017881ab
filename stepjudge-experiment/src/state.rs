use std::path::PathBuf;

use log::{error, info};
use stepjudge_core::{Confidence, Direction, Input, MotorCommand, Screen, TrialRecord};
use stepjudge_link::MotorLink;
use stepjudge_timing::Timer;

use crate::config::ControllerConfig;
use crate::dispatch::CommandDispatcher;
use crate::recorder::TrialRecorder;

/// What a single input did to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// Motor command forwarded (or dropped by an offline link) and settled
    CommandSent(MotorCommand),
    /// Choice stored, motor stopped, rating screen shown
    DirectionChosen(Direction),
    /// Trial complete and stored at the given path
    TrialPersisted(PathBuf),
    /// Trial complete but the write failed; the record is gone
    PersistFailed,
    /// Rating outside 1-7; nothing changed
    RatingRejected(u8),
    /// Input not valid on the current screen
    Ignored,
}

/// Two-screen trial flow: move the motor, guess the direction, rate
/// confidence, persist, repeat.
pub struct TrialController<L, T, R>
where
    L: MotorLink,
    T: Timer,
    R: TrialRecorder,
{
    screen: Screen,
    current: TrialRecord,
    dispatcher: CommandDispatcher<L, T>,
    recorder: R,
    completed_trials: usize,
}

impl<L, T, R> TrialController<L, T, R>
where
    L: MotorLink,
    T: Timer,
    R: TrialRecorder,
{
    pub fn new(config: ControllerConfig, link: L, timer: T, recorder: R) -> Self {
        Self {
            screen: Screen::default(),
            current: TrialRecord::default(),
            dispatcher: CommandDispatcher::new(link, timer, config.settle_delay),
            recorder,
            completed_trials: 0,
        }
    }

    pub fn handle_input(&mut self, input: Input) -> InputOutcome {
        match (self.screen, input) {
            (screen, Input::Move(command)) if screen.accepts_movement() => {
                self.handle_movement(command)
            }
            (screen, Input::Choose(direction)) if screen.accepts_choice() => {
                self.choose_direction(direction)
            }
            (screen, Input::Rate(value)) if screen.accepts_rating() => self.rate(value),
            _ => InputOutcome::Ignored,
        }
    }

    /// Only the most recent movement's start time is kept for the trial
    fn handle_movement(&mut self, command: MotorCommand) -> InputOutcome {
        if command.starts_movement() {
            self.current.start_time = Some(self.dispatcher.timer().now());
        }
        self.dispatcher.dispatch(command);
        InputOutcome::CommandSent(command)
    }

    fn choose_direction(&mut self, direction: Direction) -> InputOutcome {
        self.current.guessed_direction = Some(direction);
        self.current.end_time = Some(self.dispatcher.timer().now());
        self.dispatcher.dispatch(MotorCommand::Stop);
        self.screen = self.screen.next();
        InputOutcome::DirectionChosen(direction)
    }

    fn rate(&mut self, value: u8) -> InputOutcome {
        let Some(confidence) = Confidence::new(value) else {
            return InputOutcome::RatingRejected(value);
        };

        self.current.confidence = Some(confidence);
        let record = std::mem::take(&mut self.current);
        self.screen = self.screen.next();
        self.completed_trials += 1;

        match self.recorder.append(record) {
            Ok(path) => {
                info!(
                    "Trial {} saved to {}",
                    self.completed_trials,
                    path.display()
                );
                InputOutcome::TrialPersisted(path)
            }
            Err(e) => {
                error!("Trial {} lost: {e}", self.completed_trials);
                InputOutcome::PersistFailed
            }
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Trial being built; fresh after every rating
    pub fn current_record(&self) -> &TrialRecord {
        &self.current
    }

    pub fn completed_trials(&self) -> usize {
        self.completed_trials
    }

    pub fn link(&self) -> &L {
        self.dispatcher.link()
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn is_hardware_connected(&self) -> bool {
        self.dispatcher.link().is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use std::time::Duration;
    use stepjudge_link::{OfflineLink, WriterLink};
    use stepjudge_timing::SimulatedTimer;

    #[derive(Default)]
    struct MemoryRecorder {
        records: Vec<TrialRecord>,
    }

    impl TrialRecorder for MemoryRecorder {
        fn append(&mut self, record: TrialRecord) -> Result<PathBuf, PersistenceError> {
            self.records.push(record);
            Ok(PathBuf::from(format!("memory/{}", self.records.len())))
        }
    }

    type Controller = TrialController<WriterLink<Vec<u8>>, SimulatedTimer, MemoryRecorder>;

    fn controller() -> (Controller, SimulatedTimer) {
        let timer = SimulatedTimer::default();
        let controller = TrialController::new(
            ControllerConfig::default(),
            WriterLink::new(Vec::new()),
            timer.clone(),
            MemoryRecorder::default(),
        );
        (controller, timer)
    }

    #[test]
    fn test_starts_on_direction_choice_with_empty_record() {
        let (c, _) = controller();
        assert_eq!(c.screen(), Screen::DirectionChoice);
        assert_eq!(c.current_record(), &TrialRecord::default());
        assert_eq!(c.completed_trials(), 0);
        assert!(c.is_hardware_connected());
    }

    #[test]
    fn test_stop_does_not_touch_start_time() {
        let (mut c, _) = controller();
        let outcome = c.handle_input(Input::Move(MotorCommand::Stop));

        assert_eq!(outcome, InputOutcome::CommandSent(MotorCommand::Stop));
        assert_eq!(c.current_record().start_time, None);
        assert_eq!(c.link().get_ref().as_slice(), b"b\n");
    }

    #[test]
    fn test_choice_stops_motor_and_switches_screen() {
        let (mut c, timer) = controller();
        c.handle_input(Input::Move(MotorCommand::RotateCounterClockwise));
        let before_choice = timer.now();

        let outcome = c.handle_input(Input::Choose(Direction::Right));

        assert_eq!(outcome, InputOutcome::DirectionChosen(Direction::Right));
        assert_eq!(c.screen(), Screen::ConfidenceRating);
        assert_eq!(c.current_record().end_time, Some(before_choice));
        assert_eq!(c.link().get_ref().as_slice(), b"w\nb\n");
        assert_eq!(timer.sleeps(), vec![Duration::from_secs(1); 2]);
    }

    #[test]
    fn test_rating_on_direction_screen_is_ignored() {
        let (mut c, _) = controller();
        assert_eq!(c.handle_input(Input::Rate(4)), InputOutcome::Ignored);
        assert_eq!(c.screen(), Screen::DirectionChoice);
        assert!(c.recorder().records.is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_ratings() {
        let (mut c, _) = controller();
        c.handle_input(Input::Choose(Direction::Left));

        assert_eq!(c.handle_input(Input::Rate(0)), InputOutcome::RatingRejected(0));
        assert_eq!(c.handle_input(Input::Rate(8)), InputOutcome::RatingRejected(8));
        assert_eq!(c.screen(), Screen::ConfidenceRating);
        assert!(c.recorder().records.is_empty());

        assert!(matches!(
            c.handle_input(Input::Rate(7)),
            InputOutcome::TrialPersisted(_)
        ));
    }

    #[test]
    fn test_rating_screen_ignores_movement_and_choice() {
        let (mut c, timer) = controller();
        c.handle_input(Input::Choose(Direction::Left));
        let sent = c.link().bytes_sent();
        let slept = timer.total_slept();

        assert_eq!(
            c.handle_input(Input::Move(MotorCommand::RotateClockwise)),
            InputOutcome::Ignored
        );
        assert_eq!(
            c.handle_input(Input::Choose(Direction::Right)),
            InputOutcome::Ignored
        );

        assert_eq!(c.link().bytes_sent(), sent);
        assert_eq!(timer.total_slept(), slept);
        assert_eq!(c.current_record().guessed_direction, Some(Direction::Left));
        assert_eq!(c.current_record().start_time, None);
    }

    #[test]
    fn test_record_is_fresh_after_rating() {
        let (mut c, _) = controller();
        c.handle_input(Input::Move(MotorCommand::StepClockwise));
        c.handle_input(Input::Choose(Direction::Left));
        c.handle_input(Input::Rate(3));

        assert_eq!(c.screen(), Screen::DirectionChoice);
        assert_eq!(c.current_record(), &TrialRecord::default());
        assert_eq!(c.completed_trials(), 1);
    }

    #[test]
    fn test_choice_without_movement_leaves_start_unset() {
        let (mut c, _) = controller();
        c.handle_input(Input::Choose(Direction::Right));
        c.handle_input(Input::Rate(1));

        let record = &c.recorder().records[0];
        assert_eq!(record.start_time, None);
        assert!(record.end_time.is_some());
        assert!(record.is_complete());
    }

    #[test]
    fn test_offline_controller_reports_no_hardware() {
        let c = TrialController::new(
            ControllerConfig::default(),
            OfflineLink,
            SimulatedTimer::default(),
            MemoryRecorder::default(),
        );
        assert!(!c.is_hardware_connected());
    }
}
