use bytes::BufMut;
use packed_struct::PrimitiveEnum;
use strum_macros::{EnumString, Display};

use crate::climate::{Airflow, ClimateMode, ClimateState, DesiredClimateState};

use super::frame::Frame;
use super::tables::{FanSpeed, Mode, Power};

pub const COMMAND_LENGTH: usize = 6;

/// Outgoing command: power, mode, temperature, fan speed, vertical airflow, horizontal airflow.
pub type CommandPayload = [u8; COMMAND_LENGTH];

pub const MIN_TARGET_TEMPERATURE: u8 = 16;
pub const MAX_TARGET_TEMPERATURE: u8 = 30;

/// Encode the command payload for a desired state.
pub fn encode(desired: &DesiredClimateState) -> CommandPayload {
    let power = match desired.mode {
        None | Some(ClimateMode::Off) => Power::Off,
        Some(_) => Power::On,
    };

    let mode = desired.mode
        .and_then(Mode::from_climate_mode)
        .unwrap_or(Mode::Auto);

    // an absent target is sent as 0, the only value allowed outside the clamp range
    let temperature = desired.target_temperature
        .map(clamp_temperature)
        .unwrap_or(0);

    let fan_speed = desired.fan_mode
        .map(FanSpeed::from)
        .unwrap_or(FanSpeed::Auto);

    let vertical_airflow = airflow(desired.vertical_swing, desired.vertical_airflow);
    let horizontal_airflow = airflow(desired.horizontal_swing, desired.horizontal_airflow);

    [
        power.to_primitive(),
        mode.to_primitive(),
        temperature,
        fan_speed.to_primitive(),
        vertical_airflow.to_primitive(),
        horizontal_airflow.to_primitive(),
    ]
}

/// Clamp to the unit's setpoint range and truncate to whole degrees. NaN clamps to the minimum.
pub fn clamp_temperature(temperature: f32) -> u8 {
    if temperature.is_nan() {
        return MIN_TARGET_TEMPERATURE;
    }

    temperature.clamp(MIN_TARGET_TEMPERATURE as f32, MAX_TARGET_TEMPERATURE as f32) as u8
}

fn airflow(swing: bool, position: Option<Airflow>) -> Airflow {
    if swing {
        Airflow::Swing
    } else {
        position.unwrap_or(Airflow::Position1)
    }
}

/// Wrap a command payload in a checksummed 20 byte frame, moving the fields
/// into status frame order.
pub fn command_frame(payload: &CommandPayload) -> Frame {
    let [power, mode, temperature, fan_speed, vertical_airflow, horizontal_airflow] = *payload;

    Frame::from_fields(&[power, temperature, mode, fan_speed, vertical_airflow, horizontal_airflow])
}

/// Build the status frame a unit in `state` reports.
pub fn encode_state(state: &ClimateState) -> Frame {
    let power = if state.power { Power::On } else { Power::Off };

    let mode = Mode::from_climate_mode(state.mode).unwrap_or(Mode::Auto);

    Frame::from_fields(&[
        power.to_primitive(),
        state.current_temperature,
        mode.to_primitive(),
        FanSpeed::from(state.fan_mode).to_primitive(),
        state.vertical_airflow.to_primitive(),
        state.horizontal_airflow.to_primitive(),
    ])
}


/// How a command payload is put on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CommandFraming {
    /// The six payload bytes alone.
    #[default]
    Bare,

    /// A full 20 byte frame with checksum, same layout as status frames.
    Framed,
}

impl CommandFraming {
    pub fn len(&self) -> usize {
        match self {
            Self::Bare => COMMAND_LENGTH,
            Self::Framed => super::frame::FRAME_LENGTH,
        }
    }

    pub fn put<B: BufMut>(&self, payload: &CommandPayload, dst: &mut B) {
        match self {
            Self::Bare => dst.put_slice(payload),
            Self::Framed => dst.put_slice(command_frame(payload).as_bytes()),
        }
    }
}
