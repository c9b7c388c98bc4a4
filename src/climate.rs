use std::fmt::{self, Display};

use strum_macros::{EnumIter, EnumString};

pub use crate::protocol::tables::Airflow;
use crate::protocol::tables::Toggle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, strum_macros::Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ClimateMode {
    Off,
    Auto,
    Cool,
    Dry,
    FanOnly,
    Heat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, strum_macros::Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FanMode {
    Auto,
    Quiet,
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, strum_macros::Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SwingMode {
    Off,
    Vertical,
    Horizontal,
    Both,
}

impl SwingMode {
    pub fn from_axes(vertical: bool, horizontal: bool) -> Self {
        match (vertical, horizontal) {
            (false, false) => Self::Off,
            (true, false) => Self::Vertical,
            (false, true) => Self::Horizontal,
            (true, true) => Self::Both,
        }
    }

    pub fn vertical(&self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    pub fn horizontal(&self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }
}


/// Operating state reported by the unit.
///
/// Status frames carry no target temperature. The entity driving the unit
/// keeps its own target in [DesiredClimateState].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClimateState {
    pub power: bool,

    /// `Off` when the unit reported a mode code this crate doesn't know.
    pub mode: ClimateMode,

    /// Room temperature, whole degrees Celsius
    pub current_temperature: u8,

    pub fan_mode: FanMode,

    pub vertical_airflow: Airflow,

    pub horizontal_airflow: Airflow,
}

impl ClimateState {
    pub fn swing_mode(&self) -> SwingMode {
        SwingMode::from_axes(self.vertical_airflow.is_swing(), self.horizontal_airflow.is_swing())
    }

    /// The mode as shown to a user: a powered off unit is `Off` whatever its mode byte says.
    pub fn effective_mode(&self) -> ClimateMode {
        if self.power { self.mode } else { ClimateMode::Off }
    }
}

impl Display for ClimateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let power = if self.power { "on" } else { "off" };

        write!(f, "power={power} mode={} current={}C fan={} vertical={:?} horizontal={:?}",
            self.mode, self.current_temperature, self.fan_mode, self.vertical_airflow, self.horizontal_airflow)
    }
}


/// Auxiliary unit features.
///
/// Part of the data model only; none of these are transmitted yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuxiliaryFeatures {
    pub minimum_heat: Toggle,
    pub powerful: Toggle,
    pub economy: Toggle,
    pub energy_saving_fan: Toggle,
    pub outdoor_unit_low_noise: Toggle,
    pub human_sensor: Toggle,
}


/// Settings requested by the controlling side, input to the command encoder.
///
/// Every field is optional; absent fields encode to the documented defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesiredClimateState {
    /// `None` or `Some(Off)` powers the unit off.
    pub mode: Option<ClimateMode>,

    pub target_temperature: Option<f32>,

    pub fan_mode: Option<FanMode>,

    /// Swing overrides `vertical_airflow`.
    pub vertical_swing: bool,

    /// Swing overrides `horizontal_airflow`.
    pub horizontal_swing: bool,

    pub vertical_airflow: Option<Airflow>,

    pub horizontal_airflow: Option<Airflow>,

    pub features: AuxiliaryFeatures,
}

impl DesiredClimateState {
    pub fn with_swing_mode(mut self, swing: SwingMode) -> Self {
        self.vertical_swing = swing.vertical();
        self.horizontal_swing = swing.horizontal();
        self
    }
}

/// The climate entity that owns the durable state.
pub trait ClimateEntity {
    /// Called once per frame that passed validation.
    fn on_decoded(&mut self, state: ClimateState);

    /// Settings to apply on the next control request.
    fn desired_state(&self) -> DesiredClimateState;
}


#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_swing_mode() {
        let mut state = ClimateState {
            power: true,
            mode: ClimateMode::Cool,
            current_temperature: 21,
            fan_mode: FanMode::Auto,
            vertical_airflow: Airflow::Position3,
            horizontal_airflow: Airflow::Position1,
        };
        assert_eq!(state.swing_mode(), SwingMode::Off);

        state.vertical_airflow = Airflow::Swing;
        assert_eq!(state.swing_mode(), SwingMode::Vertical);

        state.horizontal_airflow = Airflow::Swing;
        assert_eq!(state.swing_mode(), SwingMode::Both);

        state.vertical_airflow = Airflow::Position6;
        assert_eq!(state.swing_mode(), SwingMode::Horizontal);
    }

    #[test]
    fn test_effective_mode() {
        let state = ClimateState {
            power: false,
            mode: ClimateMode::Heat,
            current_temperature: 19,
            fan_mode: FanMode::Low,
            vertical_airflow: Airflow::Position1,
            horizontal_airflow: Airflow::Position1,
        };

        assert_eq!(state.effective_mode(), ClimateMode::Off);
        assert_eq!(ClimateState { power: true, ..state }.effective_mode(), ClimateMode::Heat);
    }

    #[test]
    fn test_with_swing_mode() {
        let desired = DesiredClimateState::default().with_swing_mode(SwingMode::Both);
        assert!(desired.vertical_swing && desired.horizontal_swing);

        let desired = desired.with_swing_mode(SwingMode::Horizontal);
        assert!(!desired.vertical_swing && desired.horizontal_swing);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(ClimateMode::from_str("fan_only").unwrap(), ClimateMode::FanOnly);
        assert_eq!(FanMode::from_str("medium").unwrap(), FanMode::Medium);
        assert_eq!(SwingMode::from_str("both").unwrap(), SwingMode::Both);
        assert!(ClimateMode::from_str("turbo").is_err());
        assert_eq!(ClimateMode::Heat.to_string(), "heat");
    }
}
