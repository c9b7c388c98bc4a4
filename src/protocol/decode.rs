use crate::climate::{Airflow, ClimateMode, ClimateState, FanMode};

use super::encode::CommandPayload;
use super::frame::{verify_checksum, Frame, FrameError, StatusFields, FRAME_LENGTH};
use super::tables::{lookup, FanSpeed, Mode, Power};

/// Validate and decode a status frame.
///
/// A checksum mismatch is the only way this fails. Unknown codes in any
/// field fall back to defaults (see [decode_fields]).
pub fn decode(frame: &[u8; FRAME_LENGTH]) -> Result<ClimateState, FrameError> {
    verify_checksum(frame)?;

    Ok(decode_fields(&Frame::new(*frame).fields()))
}

/// Decode frame bytes 5..=10.
///
/// Fallbacks for unrecognized codes: power off, mode `Off`, fan `Auto`,
/// airflow `Position1`.
pub fn decode_fields(fields: &StatusFields) -> ClimateState {
    let [power, temperature, mode, fan_speed, vertical_airflow, horizontal_airflow] = *fields;

    ClimateState {
        power: lookup::<Power>("power", power) == Some(Power::On),
        mode: lookup::<Mode>("mode", mode).map(ClimateMode::from).unwrap_or(ClimateMode::Off),
        current_temperature: temperature,
        fan_mode: lookup::<FanSpeed>("fan_speed", fan_speed).map(FanMode::from).unwrap_or(FanMode::Auto),
        vertical_airflow: lookup("vertical_airflow", vertical_airflow).unwrap_or(Airflow::Position1),
        horizontal_airflow: lookup("horizontal_airflow", horizontal_airflow).unwrap_or(Airflow::Position1),
    }
}


/// A command as seen by the unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceivedCommand {
    pub power: bool,
    pub mode: ClimateMode,
    pub target_temperature: u8,
    pub fan_mode: FanMode,
    pub vertical_airflow: Airflow,
    pub horizontal_airflow: Airflow,
}

/// Commands wrapped in a full frame decode like status frames, with the
/// temperature byte holding the target.
impl From<ClimateState> for ReceivedCommand {
    fn from(state: ClimateState) -> Self {
        ReceivedCommand {
            power: state.power,
            mode: state.mode,
            target_temperature: state.current_temperature,
            fan_mode: state.fan_mode,
            vertical_airflow: state.vertical_airflow,
            horizontal_airflow: state.horizontal_airflow,
        }
    }
}

/// Decode a six byte command payload, with the same fallbacks as [decode_fields].
pub fn decode_command(payload: &CommandPayload) -> ReceivedCommand {
    let [power, mode, temperature, fan_speed, vertical_airflow, horizontal_airflow] = *payload;

    decode_fields(&[power, temperature, mode, fan_speed, vertical_airflow, horizontal_airflow]).into()
}


#[cfg(test)]
mod tests {
    use crate::protocol::frame::{Checksum, CHECKSUM_OFFSET};

    use super::*;

    fn with_checksum(mut bytes: [u8; FRAME_LENGTH]) -> [u8; FRAME_LENGTH] {
        bytes[CHECKSUM_OFFSET] = bytes[..CHECKSUM_OFFSET].iter().checksum();
        bytes
    }

    #[test]
    fn test_decode_status() {
        let bytes = with_checksum([0, 0, 0, 0, 0, 0x01, 22, 0x01, 0x0b, 0x01, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let state = decode(&bytes).unwrap();

        assert_eq!(state, ClimateState {
            power: true,
            mode: ClimateMode::Cool,
            current_temperature: 22,
            fan_mode: FanMode::High,
            vertical_airflow: Airflow::Position1,
            horizontal_airflow: Airflow::Position1,
        });
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let mut bytes = with_checksum([0, 0, 0, 0, 0, 0x01, 22, 0x01, 0x0b, 0x01, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        bytes[CHECKSUM_OFFSET] = bytes[CHECKSUM_OFFSET].wrapping_add(1);

        assert!(matches!(decode(&bytes), Err(FrameError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_only_checksum_rejects() {
        for byte in 0..=u8::MAX {
            let bytes = with_checksum([byte; FRAME_LENGTH]);
            assert!(decode(&bytes).is_ok(), "frame of {byte:02x} rejected");

            let mut corrupted = bytes;
            corrupted[CHECKSUM_OFFSET] = corrupted[CHECKSUM_OFFSET].wrapping_add(1);
            assert!(matches!(decode(&corrupted), Err(FrameError::ChecksumMismatch { .. })));
        }
    }

    #[test]
    fn test_decode_ignores_reserved_bytes() {
        let bytes = with_checksum([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x00, 30, 0x04, 0x00, 0x20, 0x03, 1, 2, 3, 4, 5, 6, 7, 8, 0]);

        let state = decode(&bytes).unwrap();

        assert!(!state.power);
        assert_eq!(state.mode, ClimateMode::Heat);
        assert_eq!(state.current_temperature, 30);
        assert_eq!(state.fan_mode, FanMode::Auto);
        assert_eq!(state.vertical_airflow, Airflow::Swing);
        assert_eq!(state.horizontal_airflow, Airflow::Position3);
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        let frame = Frame::from_fields(&[0x07, 25, 0xff, 0x01, 0x00, 0x99]);

        let state = decode(frame.as_bytes()).unwrap();

        assert_eq!(state, ClimateState {
            power: false,
            mode: ClimateMode::Off,
            current_temperature: 25,
            fan_mode: FanMode::Auto,
            vertical_airflow: Airflow::Position1,
            horizontal_airflow: Airflow::Position1,
        });
    }

    #[test]
    fn test_quiet_reports_as_low() {
        let quiet = decode_fields(&[0x01, 20, 0x00, 0x02, 0x01, 0x01]);
        let low = decode_fields(&[0x01, 20, 0x00, 0x05, 0x01, 0x01]);

        assert_eq!(quiet.fan_mode, FanMode::Low);
        assert_eq!(quiet, low);
    }

    #[test]
    fn test_decode_command() {
        let command = decode_command(&[0x01, 0x04, 24, 0x08, 0x20, 0x01]);

        assert_eq!(command, ReceivedCommand {
            power: true,
            mode: ClimateMode::Heat,
            target_temperature: 24,
            fan_mode: FanMode::Medium,
            vertical_airflow: Airflow::Swing,
            horizontal_airflow: Airflow::Position1,
        });
    }
}
