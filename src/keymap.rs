use stepjudge_core::{Direction, Input, MotorCommand};

/// Every bound key. Looked up by the character the key produces, so a
/// QWERTZ keyboard's `y` and `x` work the same as on QWERTY.
pub const KEY_BINDINGS: [(char, Input); 16] = [
    ('f', Input::Choose(Direction::Left)),
    ('j', Input::Choose(Direction::Right)),
    ('1', Input::Rate(1)),
    ('2', Input::Rate(2)),
    ('3', Input::Rate(3)),
    ('4', Input::Rate(4)),
    ('5', Input::Rate(5)),
    ('6', Input::Rate(6)),
    ('7', Input::Rate(7)),
    ('q', Input::Move(MotorCommand::RotateClockwise)),
    ('w', Input::Move(MotorCommand::RotateCounterClockwise)),
    ('a', Input::Move(MotorCommand::StepClockwise)),
    ('s', Input::Move(MotorCommand::StepCounterClockwise)),
    ('y', Input::Move(MotorCommand::SwingClockwise)),
    ('x', Input::Move(MotorCommand::SwingCounterClockwise)),
    ('b', Input::Move(MotorCommand::Stop)),
];

pub fn input_for_char(c: char) -> Option<Input> {
    let c = c.to_ascii_lowercase();
    KEY_BINDINGS
        .iter()
        .find(|(key, _)| *key == c)
        .map(|(_, input)| *input)
}

/// Maps the text of a logical key press; multi-character text is ignored
pub fn input_for_text(text: &str) -> Option<Input> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => input_for_char(c),
        _ => None,
    }
}
