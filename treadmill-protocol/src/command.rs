use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::utils::to_tenths;
use crate::Frame;

const SPEED_RANGE: RangeInclusive<i32> = 0..=169;
const INCLINE_RANGE: RangeInclusive<i32> = 0..=30;
const POWER_RANGE: RangeInclusive<i32> = 0..=100;
const CHANNEL_RANGE: RangeInclusive<i32> = 0..=255;
const SETPOINT_RANGE: RangeInclusive<f64> = 0.0..=6553.5;
const WIRE_RANGE: RangeInclusive<i64> = 0..=u16::MAX as i64;

const AROMA_PULSE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandId {
    Speed = 0x01,
    PressureSetpoint = 0x04,
    Incline = 0x05,
    TemperatureSetpoint = 0x06,
    RequestTemperature = 0x09,
    RequestPressure = 0x0A,
    OperationMode = 0x0F,
    HeaterPower = 0x10,
    PumpPower = 0x11,
    Lamp = 0x12,
    RgbColor = 0x13,
    Leds = 0x15,
    Neon = 0x16,
    Aroma = 0x17,
}

impl CommandId {
    pub fn name(self) -> &'static str {
        match self {
            CommandId::Speed => "speed",
            CommandId::PressureSetpoint => "pressure setpoint",
            CommandId::Incline => "incline",
            CommandId::TemperatureSetpoint => "temperature setpoint",
            CommandId::RequestTemperature => "request temperature",
            CommandId::RequestPressure => "request pressure",
            CommandId::OperationMode => "operation mode",
            CommandId::HeaterPower => "heater power",
            CommandId::PumpPower => "pump power",
            CommandId::Lamp => "lamp",
            CommandId::RgbColor => "rgb color",
            CommandId::Leds => "leds",
            CommandId::Neon => "neon",
            CommandId::Aroma => "aroma",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<CommandId> for u8 {
    fn from(id: CommandId) -> Self {
        id as u8
    }
}

impl TryFrom<u8> for CommandId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x01 => CommandId::Speed,
            0x04 => CommandId::PressureSetpoint,
            0x05 => CommandId::Incline,
            0x06 => CommandId::TemperatureSetpoint,
            0x09 => CommandId::RequestTemperature,
            0x0A => CommandId::RequestPressure,
            0x0F => CommandId::OperationMode,
            0x10 => CommandId::HeaterPower,
            0x11 => CommandId::PumpPower,
            0x12 => CommandId::Lamp,
            0x13 => CommandId::RgbColor,
            0x15 => CommandId::Leds,
            0x16 => CommandId::Neon,
            0x17 => CommandId::Aroma,
            other => return Err(other),
        })
    }
}

/// A value rejected before anything reaches the wire.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    #[error("{command} value {value} outside allowed range {min}..={max}")]
    Value {
        command: CommandId,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The ×10 fixed point form does not fit the two byte field.
    #[error("{command} value {value} scales to {scaled}, outside wire range 0..=65535")]
    Wire {
        command: CommandId,
        value: f64,
        scaled: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    #[default]
    Manual = 0,
    Automatic = 1,
}

impl TryFrom<i32> for OperationMode {
    type Error = RangeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OperationMode::Manual),
            1 => Ok(OperationMode::Automatic),
            _ => Err(RangeError::Value {
                command: CommandId::OperationMode,
                value: f64::from(value),
                min: 0.0,
                max: 1.0,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
    pub const ORANGE: Rgb = Rgb::new(255, 165, 0);
    pub const PURPLE: Rgb = Rgb::new(128, 0, 128);

    pub const fn new(red: i32, green: i32, blue: i32) -> Self {
        Self { red, green, blue }
    }
}

/// The two LED strips driven by the RGB command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbColor {
    pub exterior: Rgb,
    pub interior: Rgb,
}

impl RgbColor {
    pub const fn new(exterior: Rgb, interior: Rgb) -> Self {
        Self { exterior, interior }
    }

    /// Same color on both strips.
    pub const fn uniform(color: Rgb) -> Self {
        Self::new(color, color)
    }

    fn channels(&self) -> [i32; 6] {
        [
            self.exterior.red,
            self.exterior.green,
            self.exterior.blue,
            self.interior.red,
            self.interior.green,
            self.interior.blue,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Belt speed index.
    Speed(i32),
    Incline(i32),
    PressureSetpoint(f64),
    TemperatureSetpoint(f64),
    RequestTemperature,
    RequestPressure,
    OperationMode(OperationMode),
    /// Heater power in percent, honoured in manual mode.
    HeaterPower(i32),
    /// Vacuum pump power in percent, honoured in manual mode.
    PumpPower(i32),
    Lamp(bool),
    RgbColor(RgbColor),
    Leds(bool),
    Neon(bool),
    /// Fires one pulse of the aroma diffuser.
    Aroma,
}

impl Command {
    pub fn id(&self) -> CommandId {
        match self {
            Command::Speed(_) => CommandId::Speed,
            Command::Incline(_) => CommandId::Incline,
            Command::PressureSetpoint(_) => CommandId::PressureSetpoint,
            Command::TemperatureSetpoint(_) => CommandId::TemperatureSetpoint,
            Command::RequestTemperature => CommandId::RequestTemperature,
            Command::RequestPressure => CommandId::RequestPressure,
            Command::OperationMode(_) => CommandId::OperationMode,
            Command::HeaterPower(_) => CommandId::HeaterPower,
            Command::PumpPower(_) => CommandId::PumpPower,
            Command::Lamp(_) => CommandId::Lamp,
            Command::RgbColor(_) => CommandId::RgbColor,
            Command::Leds(_) => CommandId::Leds,
            Command::Neon(_) => CommandId::Neon,
            Command::Aroma => CommandId::Aroma,
        }
    }

    /// Validates the value and builds the outbound frame.
    pub fn encode(&self) -> Result<Frame, RangeError> {
        let id = self.id();
        let payload = match *self {
            Command::Speed(v) => vec![checked_byte(id, v, SPEED_RANGE)?],
            Command::Incline(v) => vec![checked_byte(id, v, INCLINE_RANGE)?],
            Command::HeaterPower(v) | Command::PumpPower(v) => {
                vec![checked_byte(id, v, POWER_RANGE)?]
            }
            Command::PressureSetpoint(v) | Command::TemperatureSetpoint(v) => {
                checked_tenths(id, v)?.to_be_bytes().to_vec()
            }
            Command::RequestTemperature | Command::RequestPressure => Vec::new(),
            Command::OperationMode(mode) => vec![mode as u8],
            Command::Lamp(on) | Command::Leds(on) | Command::Neon(on) => vec![u8::from(on)],
            Command::RgbColor(color) => color
                .channels()
                .into_iter()
                .map(|c| checked_byte(id, c, CHANNEL_RANGE))
                .collect::<Result<Vec<u8>, _>>()?,
            Command::Aroma => vec![AROMA_PULSE],
        };

        Ok(Frame::outbound(id.into(), payload))
    }
}

fn checked_byte(command: CommandId, value: i32, range: RangeInclusive<i32>) -> Result<u8, RangeError> {
    if !range.contains(&value) {
        return Err(RangeError::Value {
            command,
            value: f64::from(value),
            min: f64::from(*range.start()),
            max: f64::from(*range.end()),
        });
    }
    // all byte ranges sit inside 0..=255
    Ok(value as u8)
}

/// The semantic bound and the wire bound are checked independently.
fn checked_tenths(command: CommandId, value: f64) -> Result<u16, RangeError> {
    if !SETPOINT_RANGE.contains(&value) {
        return Err(RangeError::Value {
            command,
            value,
            min: *SETPOINT_RANGE.start(),
            max: *SETPOINT_RANGE.end(),
        });
    }

    let scaled = to_tenths(value);
    if !WIRE_RANGE.contains(&scaled) {
        return Err(RangeError::Wire {
            command,
            value,
            scaled,
        });
    }
    Ok(scaled as u16)
}
