use serde::{Deserialize, Serialize};

use super::{Result, SerialError};

/// MAKCU command grammar: one ASCII line per operation, each terminated
/// by a carriage return. Encoding is a pure function of the command; the
/// connection layer owns pushing the bytes through the transport.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Name of the button in the device's command grammar.
    pub fn command_name(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

/// One device operation as pure data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Relative move. `curve` carries the firmware's optional shaping
    /// parameters: empty for a plain move, one smoothness value, or three
    /// curve-fitting values. Any other count is rejected.
    Move { dx: i32, dy: i32, curve: Vec<i32> },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// Signed wheel step; the sign convention belongs to the firmware and
    /// is passed through unchanged.
    Wheel(i32),
}

impl Command {
    pub fn mouse_move(dx: i32, dy: i32) -> Self {
        Command::Move {
            dx,
            dy,
            curve: Vec::new(),
        }
    }
}

/// Encode a command into its wire line, including the trailing `\r`.
pub fn encode(command: &Command) -> Result<String> {
    match command {
        Command::Move { dx, dy, curve } => match curve.as_slice() {
            [] => Ok(format!("km.move({}, {})\r", dx, dy)),
            [smooth] => Ok(format!("km.move({}, {}, {})\r", dx, dy, smooth)),
            [a, b, c] => Ok(format!("km.move({}, {}, {}, {}, {})\r", dx, dy, a, b, c)),
            other => Err(SerialError::InvalidArgument(format!(
                "move accepts 0, 1 or 3 curve parameters, got {}",
                other.len()
            ))),
        },
        Command::ButtonDown(button) => Ok(format!("km.{}(1)\r", button.command_name())),
        Command::ButtonUp(button) => Ok(format!("km.{}(0)\r", button.command_name())),
        Command::Wheel(amount) => Ok(format!("km.wheel({})\r", amount)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse a `km.move(...)` wire line back into its integers.
    fn decode_move(line: &str) -> Option<(i32, i32, Vec<i32>)> {
        let args = line
            .trim_end_matches('\r')
            .strip_prefix("km.move(")?
            .strip_suffix(')')?;

        let mut values = Vec::new();
        for part in args.split(',') {
            values.push(part.trim().parse().ok()?);
        }

        let (dx, dy) = (*values.first()?, *values.get(1)?);
        Some((dx, dy, values[2..].to_vec()))
    }

    #[test]
    fn move_roundtrip_without_curve() {
        let cmd = Command::mouse_move(12, -7);
        let line = encode(&cmd).unwrap();
        assert_eq!(line, "km.move(12, -7)\r");
        assert_eq!(decode_move(&line), Some((12, -7, vec![])));
    }

    #[test]
    fn move_roundtrip_with_smoothness() {
        let cmd = Command::Move {
            dx: 100,
            dy: 100,
            curve: vec![3],
        };
        let line = encode(&cmd).unwrap();
        assert_eq!(line, "km.move(100, 100, 3)\r");
        assert_eq!(decode_move(&line), Some((100, 100, vec![3])));
    }

    #[test]
    fn move_roundtrip_with_curve_shaping() {
        let cmd = Command::Move {
            dx: -56,
            dy: -200,
            curve: vec![10, 89, 54],
        };
        let line = encode(&cmd).unwrap();
        assert_eq!(line, "km.move(-56, -200, 10, 89, 54)\r");
        assert_eq!(decode_move(&line), Some((-56, -200, vec![10, 89, 54])));
    }

    #[test]
    fn move_rejects_bad_parameter_counts() {
        for count in [2usize, 4, 5] {
            let cmd = Command::Move {
                dx: 1,
                dy: 1,
                curve: vec![0; count],
            };
            assert!(matches!(
                encode(&cmd),
                Err(SerialError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn button_lines_follow_grammar() {
        assert_eq!(
            encode(&Command::ButtonDown(MouseButton::Left)).unwrap(),
            "km.left(1)\r"
        );
        assert_eq!(
            encode(&Command::ButtonUp(MouseButton::Middle)).unwrap(),
            "km.middle(0)\r"
        );
    }

    #[test]
    fn wheel_keeps_sign() {
        assert_eq!(encode(&Command::Wheel(-3)).unwrap(), "km.wheel(-3)\r");
        assert_eq!(encode(&Command::Wheel(5)).unwrap(), "km.wheel(5)\r");
    }
}
