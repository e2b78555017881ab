use serde::{Deserialize, Serialize};

/// Screens the participant moves between during a trial
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    /// "Left or right?" screen; motor commands are accepted here
    #[default]
    DirectionChoice,
    /// 1-7 confidence scale
    ConfidenceRating,
}

impl Screen {
    pub fn accepts_movement(&self) -> bool {
        matches!(self, Screen::DirectionChoice)
    }

    pub fn accepts_choice(&self) -> bool {
        matches!(self, Screen::DirectionChoice)
    }

    pub fn accepts_rating(&self) -> bool {
        matches!(self, Screen::ConfidenceRating)
    }

    pub fn next(&self) -> Self {
        match self {
            Screen::DirectionChoice => Screen::ConfidenceRating,
            Screen::ConfidenceRating => Screen::DirectionChoice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_screen_is_direction_choice() {
        assert_eq!(Screen::default(), Screen::DirectionChoice);
    }

    #[test]
    fn test_screens_alternate() {
        let s = Screen::default();
        assert_eq!(s.next(), Screen::ConfidenceRating);
        assert_eq!(s.next().next(), Screen::DirectionChoice);
    }

    #[test]
    fn test_inputs_accepted_per_screen() {
        assert!(Screen::DirectionChoice.accepts_movement());
        assert!(Screen::DirectionChoice.accepts_choice());
        assert!(!Screen::DirectionChoice.accepts_rating());

        assert!(!Screen::ConfidenceRating.accepts_movement());
        assert!(!Screen::ConfidenceRating.accepts_choice());
        assert!(Screen::ConfidenceRating.accepts_rating());
    }
}
