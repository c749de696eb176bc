use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tokio::signal;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use treadmill_protocol::{Command, OperationMode, Rgb, RgbColor};
use treadmill_session::{PortSession, SessionConfig, SessionEvent, Subscription};

#[derive(Parser, Debug)]
#[command()]
struct Args {
    #[arg(long, default_value = "info")]
    log_level: Level,

    #[arg(long, value_name = "TTY", value_hint = clap::ValueHint::FilePath)]
    tty_path: String,

    #[arg(short, long, default_value_t = 115200)]
    serial_baudrate: u32,

    /// Seconds between temperature/pressure requests
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    #[arg(long)]
    no_poll: bool,

    /// Seconds to keep logging events after sending a command
    #[arg(long, default_value_t = 1)]
    linger: u64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        matches!(switch, Switch::On)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Manual,
    Automatic,
}

impl From<Mode> for OperationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Manual => OperationMode::Manual,
            Mode::Automatic => OperationMode::Automatic,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Log every event until Ctrl-C
    Monitor,
    /// Belt speed index (0-169)
    Speed { value: i32 },
    /// Incline index (0-30)
    Incline { value: i32 },
    /// Temperature setpoint in °C
    Temperature { value: f64 },
    /// Pressure setpoint
    Pressure { value: f64 },
    RequestTemperature,
    RequestPressure,
    Mode { mode: Mode },
    /// Heater power in percent (manual mode)
    Heater { value: i32 },
    /// Vacuum pump power in percent (manual mode)
    Pump { value: i32 },
    Lamp { state: Switch },
    Leds { state: Switch },
    Neon { state: Switch },
    /// Exterior then interior color, each channel 0-255
    #[command(allow_negative_numbers = true)]
    Rgb {
        #[arg(num_args = 6, value_names = ["R_EXT", "G_EXT", "B_EXT", "R_INT", "G_INT", "B_INT"])]
        channels: Vec<i32>,
    },
    /// Fire one aroma pulse
    Aroma,
}

impl Action {
    fn command(&self) -> Option<Command> {
        Some(match self {
            Action::Monitor => return None,
            Action::Speed { value } => Command::Speed(*value),
            Action::Incline { value } => Command::Incline(*value),
            Action::Temperature { value } => Command::TemperatureSetpoint(*value),
            Action::Pressure { value } => Command::PressureSetpoint(*value),
            Action::RequestTemperature => Command::RequestTemperature,
            Action::RequestPressure => Command::RequestPressure,
            Action::Mode { mode } => Command::OperationMode((*mode).into()),
            Action::Heater { value } => Command::HeaterPower(*value),
            Action::Pump { value } => Command::PumpPower(*value),
            Action::Lamp { state } => Command::Lamp((*state).into()),
            Action::Leds { state } => Command::Leds((*state).into()),
            Action::Neon { state } => Command::Neon((*state).into()),
            Action::Rgb { channels } => Command::RgbColor(RgbColor::new(
                Rgb::new(channels[0], channels[1], channels[2]),
                Rgb::new(channels[3], channels[4], channels[5]),
            )),
            Action::Aroma => Command::Aroma,
        })
    }
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::TemperatureReceived(v) => info!("{}: {:.1} °C", event.kind(), v),
        SessionEvent::PressureReceived(v) => info!("{}: {:.1}", event.kind(), v),
        SessionEvent::SpeedReceived(v) | SessionEvent::InclineReceived(v) => {
            info!("{}: {}", event.kind(), v)
        }
        SessionEvent::SerialError(message) => warn!("{}: {}", event.kind(), message),
    }
}

async fn log_events_until(events: &mut Subscription, deadline: impl std::future::Future<Output = ()>) {
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(args.log_level)
            .finish(),
    )?;

    let config = SessionConfig {
        poll_interval: Duration::from_secs(args.poll_interval.max(1)),
        polling: !args.no_poll,
        ..SessionConfig::default()
    };
    let mut session = PortSession::with_config(config);
    let mut events = session.events().subscribe();

    session
        .open(&args.tty_path, args.serial_baudrate)
        .await
        .with_context(|| format!("Failed to open {}", args.tty_path))?;

    match args.action.command() {
        None => {
            info!("Monitoring {}, press Ctrl-C to stop", args.tty_path);
            log_events_until(&mut events, async {
                if let Err(err) = signal::ctrl_c().await {
                    warn!("Failed to listen for SIGINT: {}", err);
                }
            })
            .await;
        }
        Some(command) => {
            debug!("Sending {:?}", command);
            let sent = session.execute(command).await;
            if sent.is_ok() {
                log_events_until(&mut events, tokio::time::sleep(Duration::from_secs(args.linger))).await;
            }
            sent.with_context(|| format!("Failed to send {}", command.id()))?;
        }
    }

    session.close().await.with_context(|| "Failed to close port")?;

    Ok(())
}
