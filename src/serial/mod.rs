//! Serial line protocol
//!
//! The browser writes one text line per lookup to the master controller:
//!
//! ```text
//! box_id:<B>,led_id:<L>\n
//! ```
//!
//! The controller searches for both keys, reads each value up to the next
//! comma, converts it the way Arduino's `String::toInt` does, and only acts on
//! `box_id > 0` and `led_id >= 0`. [`DeviceCommand::parse`] reproduces that
//! acceptance so a location can be checked before it is sent.

use std::fmt;
use thiserror::Error;

use crate::catalog::Slot;

/// Default baud rate of the master controller's USB serial port
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

const BOX_KEY: &str = "box_id:";
const LED_KEY: &str = "led_id:";

/// Command line sent to the controller for one storage location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialCommand {
    pub box_id: Slot,
    pub led_id: Slot,
}

impl SerialCommand {
    pub const fn new(box_id: Slot, led_id: Slot) -> Self {
        Self { box_id, led_id }
    }

    /// Encode as the newline-terminated line written to the port
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for SerialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BOX_KEY}{},{LED_KEY}{}", self.box_id, self.led_id)
    }
}

/// Command as the controller understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCommand {
    /// 1-based box number
    pub box_id: i64,
    /// LED index within the box
    pub led_id: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerialError {
    #[error("command is missing '{0}'")]
    MissingField(&'static str),
    #[error("box_id must be greater than 0, got {0}")]
    InvalidBox(i64),
    #[error("led_id must not be negative, got {0}")]
    InvalidLed(i64),
}

impl DeviceCommand {
    /// Parse one line with the controller's rules
    pub fn parse(line: &str) -> Result<Self, SerialError> {
        let line = line.trim();
        let box_id = field_value(line, BOX_KEY).ok_or(SerialError::MissingField("box_id"))?;
        let led_id = field_value(line, LED_KEY).ok_or(SerialError::MissingField("led_id"))?;

        if box_id <= 0 {
            return Err(SerialError::InvalidBox(box_id));
        }
        if led_id < 0 {
            return Err(SerialError::InvalidLed(led_id));
        }
        Ok(Self { box_id, led_id })
    }
}

/// Value after `key` up to the next comma, converted like `String::toInt`
fn field_value(line: &str, key: &str) -> Option<i64> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let raw = rest.find(',').map_or(rest, |end| &rest[..end]);
    Some(leading_int(raw))
}

/// Leading signed integer, 0 when there is none
fn leading_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_line() {
        let cmd = SerialCommand::new(Slot::Index(3), Slot::Index(17));
        assert_eq!(cmd.encode(), "box_id:3,led_id:17\n");
        assert_eq!(cmd.to_string(), "box_id:3,led_id:17");
    }

    #[test]
    fn test_encoded_line_is_accepted() {
        let cmd = SerialCommand::new(Slot::Index(1), Slot::Label("66".to_string()));
        assert_eq!(
            DeviceCommand::parse(&cmd.encode()),
            Ok(DeviceCommand {
                box_id: 1,
                led_id: 66
            })
        );
    }

    #[test]
    fn test_rejects_box_zero_and_negative_led() {
        assert_eq!(
            DeviceCommand::parse("box_id:0,led_id:5"),
            Err(SerialError::InvalidBox(0))
        );
        assert_eq!(
            DeviceCommand::parse("box_id:2,led_id:-1"),
            Err(SerialError::InvalidLed(-1))
        );
    }

    #[test]
    fn test_rejects_missing_keys() {
        assert_eq!(
            DeviceCommand::parse("B5,L10"),
            Err(SerialError::MissingField("box_id"))
        );
        assert_eq!(
            DeviceCommand::parse("box_id:5"),
            Err(SerialError::MissingField("led_id"))
        );
    }

    #[test]
    fn test_non_numeric_values_read_as_zero() {
        assert_eq!(
            DeviceCommand::parse("box_id:A,led_id:3"),
            Err(SerialError::InvalidBox(0))
        );
        assert_eq!(
            DeviceCommand::parse("box_id:2x,led_id:7 "),
            Ok(DeviceCommand {
                box_id: 2,
                led_id: 7
            })
        );
    }
}
