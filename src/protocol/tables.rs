use packed_struct::prelude::*;
use strum_macros::EnumIter;
use tracing::trace;

use crate::climate::{ClimateMode, FanMode};

/*
    Codes are documented by the unit as 16 bit registers but only the low
    byte is ever transmitted on the serial link.

    Encoding through these tables is total. Decoding is partial: every
    lookup goes through `lookup` and the caller picks the fallback.
*/

#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum Power {
    Off = 0x00,
    On = 0x01,
}

#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum Mode {
    Auto = 0x00,
    Cool = 0x01,
    Dry = 0x02,
    Fan = 0x03,
    Heat = 0x04,
}

impl Mode {
    /// `Off` has no mode code; it is carried by the power byte instead.
    pub fn from_climate_mode(mode: ClimateMode) -> Option<Self> {
        match mode {
            ClimateMode::Off => None,
            ClimateMode::Auto => Some(Self::Auto),
            ClimateMode::Cool => Some(Self::Cool),
            ClimateMode::Dry => Some(Self::Dry),
            ClimateMode::FanOnly => Some(Self::Fan),
            ClimateMode::Heat => Some(Self::Heat),
        }
    }
}

impl From<Mode> for ClimateMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Auto => Self::Auto,
            Mode::Cool => Self::Cool,
            Mode::Dry => Self::Dry,
            Mode::Fan => Self::FanOnly,
            Mode::Heat => Self::Heat,
        }
    }
}

#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum FanSpeed {
    Auto = 0x00,
    Quiet = 0x02,
    Low = 0x05,
    Medium = 0x08,
    High = 0x0b,
}

impl From<FanMode> for FanSpeed {
    fn from(value: FanMode) -> Self {
        match value {
            FanMode::Auto => Self::Auto,
            FanMode::Quiet => Self::Quiet,
            FanMode::Low => Self::Low,
            FanMode::Medium => Self::Medium,
            FanMode::High => Self::High,
        }
    }
}

/// Reported fan speeds are bucketed: quiet is reported as low.
impl From<FanSpeed> for FanMode {
    fn from(value: FanSpeed) -> Self {
        match value {
            FanSpeed::Auto => Self::Auto,
            FanSpeed::Quiet | FanSpeed::Low => Self::Low,
            FanSpeed::Medium => Self::Medium,
            FanSpeed::High => Self::High,
        }
    }
}

/// Louvre position. Vertical and horizontal airflow share the same codes.
#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Airflow {
    Position1 = 0x01,
    Position2 = 0x02,
    Position3 = 0x03,
    Position4 = 0x04,
    Position5 = 0x05,
    Position6 = 0x06,
    Swing = 0x20,
}

impl Airflow {
    /// Fixed position by number, 1 through 6.
    pub fn position(n: u8) -> Option<Self> {
        match n {
            1..=6 => Self::from_primitive(n),
            _ => None,
        }
    }

    pub fn is_swing(&self) -> bool {
        *self == Self::Swing
    }
}

pub type VerticalAirflow = Airflow;
pub type HorizontalAirflow = Airflow;

/// Binary on/off setting.
#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter)]
pub enum Toggle {
    #[default]
    Off = 0x00,
    On = 0x01,
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<Toggle> for bool {
    fn from(value: Toggle) -> Self {
        value == Toggle::On
    }
}

pub type VerticalSwing = Toggle;
pub type HorizontalSwing = Toggle;
pub type MinimumHeat = Toggle;
pub type Powerful = Toggle;
pub type EconomyMode = Toggle;
pub type EnergySavingFan = Toggle;
pub type OutdoorUnitLowNoise = Toggle;
pub type HumanSensor = Toggle;

/// Look up an on-wire code in a table.
///
/// Returns `None` for codes the table doesn't know; the caller decides what
/// that falls back to.
pub fn lookup<T>(field: &'static str, code: u8) -> Option<T> where
    T: PrimitiveEnum<Primitive = u8>
{
    let value = T::from_primitive(code);

    if value.is_none() {
        trace!(field, code, "unrecognized code");
    }

    value
}


#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for mode in Mode::iter() {
            assert_eq!(lookup::<Mode>("mode", mode.to_primitive()), Some(mode));
        }

        for speed in FanSpeed::iter() {
            assert_eq!(lookup::<FanSpeed>("fan_speed", speed.to_primitive()), Some(speed));
        }

        for airflow in Airflow::iter() {
            assert_eq!(lookup::<Airflow>("airflow", airflow.to_primitive()), Some(airflow));
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(Mode::Cool.to_primitive(), 0x01);
        assert_eq!(Mode::Heat.to_primitive(), 0x04);
        assert_eq!(FanSpeed::High.to_primitive(), 0x0b);
        assert_eq!(FanSpeed::Medium.to_primitive(), 0x08);
        assert_eq!(Airflow::Swing.to_primitive(), 0x20);
        assert_eq!(Power::On.to_primitive(), 0x01);
        assert_eq!(Toggle::On.to_primitive(), 0x01);
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(lookup::<Mode>("mode", 0xff), None);
        assert_eq!(lookup::<FanSpeed>("fan_speed", 0x01), None);
        assert_eq!(lookup::<Airflow>("airflow", 0x00), None);
        assert_eq!(lookup::<Power>("power", 0x02), None);
    }

    #[test]
    fn test_fan_speed_buckets() {
        assert_eq!(FanMode::from(FanSpeed::Quiet), FanMode::Low);
        assert_eq!(FanMode::from(FanSpeed::Low), FanMode::Low);
        assert_eq!(FanSpeed::from(FanMode::Quiet), FanSpeed::Quiet);
    }

    #[test]
    fn test_mode_off_has_no_code() {
        assert_eq!(Mode::from_climate_mode(ClimateMode::Off), None);

        for mode in Mode::iter() {
            assert_eq!(Mode::from_climate_mode(mode.into()), Some(mode));
        }
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Toggle::default(), Toggle::Off);
        assert_eq!(Toggle::from(true), Toggle::On);
        assert!(!bool::from(Toggle::default()));
    }

    #[test]
    fn test_airflow_positions() {
        assert_eq!(Airflow::position(1), Some(Airflow::Position1));
        assert_eq!(Airflow::position(6), Some(Airflow::Position6));
        assert_eq!(Airflow::position(0), None);
        assert_eq!(Airflow::position(7), None);
        assert_eq!(Airflow::position(0x20), None);
    }
}
