use treadmill_protocol::{Command, OperationMode, RgbColor};

use crate::{Connector, PortSession, SessionError};

/// One call per device command. Values are validated before the port state
/// is even looked at, so a bad value fails the same way open or closed.
impl<C: Connector> PortSession<C> {
    pub async fn execute(&self, command: Command) -> Result<(), SessionError> {
        let result = match command.encode() {
            Ok(frame) => self.send_frame(frame).await,
            Err(err) => Err(err.into()),
        };
        self.report(result)
    }

    /// Belt speed index, 0-169.
    pub async fn set_speed(&self, speed: i32) -> Result<(), SessionError> {
        self.execute(Command::Speed(speed)).await
    }

    /// Incline index, 0-30.
    pub async fn set_incline(&self, incline: i32) -> Result<(), SessionError> {
        self.execute(Command::Incline(incline)).await
    }

    pub async fn set_temperature(&self, temperature: f64) -> Result<(), SessionError> {
        self.execute(Command::TemperatureSetpoint(temperature)).await
    }

    pub async fn set_pressure(&self, pressure: f64) -> Result<(), SessionError> {
        self.execute(Command::PressureSetpoint(pressure)).await
    }

    /// The reading arrives later as a `TemperatureReceived` event.
    pub async fn request_temperature(&self) -> Result<(), SessionError> {
        self.execute(Command::RequestTemperature).await
    }

    pub async fn request_pressure(&self) -> Result<(), SessionError> {
        self.execute(Command::RequestPressure).await
    }

    pub async fn set_operation_mode(&self, mode: OperationMode) -> Result<(), SessionError> {
        self.execute(Command::OperationMode(mode)).await
    }

    pub async fn set_heater_power(&self, percent: i32) -> Result<(), SessionError> {
        self.execute(Command::HeaterPower(percent)).await
    }

    pub async fn set_pump_power(&self, percent: i32) -> Result<(), SessionError> {
        self.execute(Command::PumpPower(percent)).await
    }

    pub async fn set_lamp(&self, on: bool) -> Result<(), SessionError> {
        self.execute(Command::Lamp(on)).await
    }

    pub async fn set_rgb_color(&self, color: RgbColor) -> Result<(), SessionError> {
        self.execute(Command::RgbColor(color)).await
    }

    pub async fn set_leds(&self, on: bool) -> Result<(), SessionError> {
        self.execute(Command::Leds(on)).await
    }

    pub async fn set_neon(&self, on: bool) -> Result<(), SessionError> {
        self.execute(Command::Neon(on)).await
    }

    pub async fn activate_aroma(&self) -> Result<(), SessionError> {
        self.execute(Command::Aroma).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{device_pair, read_exactly};
    use crate::{EventKind, SessionConfig, SessionEvent};
    use treadmill_protocol::{RangeError, Rgb};

    fn quiet_config() -> SessionConfig {
        SessionConfig {
            polling: false,
            ..SessionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_every_command_on_the_wire() {
        let (connector, mut devices) = device_pair();
        let mut session = PortSession::with_connector(connector, quiet_config());
        session.open("/dev/ttyFAKE0", 115200).await.unwrap();
        let mut device = devices.recv().await.unwrap();

        session.set_speed(169).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x01\xa9\x03");
        session.set_incline(12).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x05\x0c\x03");
        session.set_temperature(36.6).await.unwrap();
        assert_eq!(read_exactly(&mut device, 6).await, b"\x02\x08\x06\x01\x6e\x03");
        session.set_pressure(101.3).await.unwrap();
        assert_eq!(read_exactly(&mut device, 6).await, b"\x02\x08\x04\x03\xf5\x03");
        session.request_temperature().await.unwrap();
        assert_eq!(read_exactly(&mut device, 4).await, b"\x02\x08\x09\x03");
        session.request_pressure().await.unwrap();
        assert_eq!(read_exactly(&mut device, 4).await, b"\x02\x08\x0a\x03");
        session.set_operation_mode(OperationMode::Manual).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x0f\x00\x03");
        session.set_heater_power(55).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x10\x37\x03");
        session.set_pump_power(100).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x11\x64\x03");
        session.set_lamp(true).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x12\x01\x03");
        session
            .set_rgb_color(RgbColor::new(Rgb::RED, Rgb::BLUE))
            .await
            .unwrap();
        assert_eq!(
            read_exactly(&mut device, 10).await,
            b"\x02\x08\x13\xff\x00\x00\x00\x00\xff\x03",
        );
        session.set_leds(false).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x15\x00\x03");
        session.set_neon(true).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x16\x01\x03");
        session.activate_aroma().await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x17\x01\x03");

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_out_of_range_never_written() {
        let (connector, mut devices) = device_pair();
        let mut session = PortSession::with_connector(connector, quiet_config());
        let mut errors = session.events().subscribe_to(EventKind::SerialError);

        // rejected as a range error even while closed
        assert!(matches!(session.set_speed(170).await, Err(SessionError::Range(_))));

        session.open("/dev/ttyFAKE0", 115200).await.unwrap();
        let mut device = devices.recv().await.unwrap();

        assert!(matches!(
            session.set_incline(-1).await,
            Err(SessionError::Range(RangeError::Value { .. })),
        ));
        assert!(session.set_temperature(7000.0).await.is_err());
        assert!(session.set_heater_power(101).await.is_err());

        session.set_speed(1).await.unwrap();
        assert_eq!(read_exactly(&mut device, 5).await, b"\x02\x08\x01\x01\x03");

        let mut messages = Vec::new();
        while let Some(SessionEvent::SerialError(message)) = errors.try_recv() {
            messages.push(message);
        }
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], "speed value 170 outside allowed range 0..=169");

        session.close().await.unwrap();
    }
}
