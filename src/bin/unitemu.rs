use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use clap::Parser;
use futures::{SinkExt, StreamExt};
use fujitsu_anywair::{climate::{Airflow, ClimateMode, ClimateState, FanMode}, config::init_logging, protocol::{codec::UnitCodec, decode::ReceivedCommand, encode::{encode_state, CommandFraming}, frame::{Frame, FRAME_LENGTH}}};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{net::{TcpListener, TcpStream}, select, sync::Mutex, time::interval};
use tokio_util::codec::Framed;
use tracing::{info, warn};

/// Emulator for a Fujitsu AnywAIR unit
///
/// Listens for tcp+raw connections. Every connected controller gets a
/// status frame on each tick and after each command it sends.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address and port to listen on (host:port)
    listen: String,

    /// bare (6 byte payload) or framed (20 byte checksummed frame)
    #[arg(long, default_value = "bare")]
    framing: CommandFraming,

    /// Interval between unsolicited status frames
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Probability (0-1) of corrupting a byte in each status frame sent
    #[arg(long, default_value_t = 0.0)]
    corrupt_rate: f64,

    /// Initial room temperature
    #[arg(long, default_value_t = 24)]
    room_temperature: u8,
}


struct Unit {
    state: ClimateState,
    target_temperature: u8,
}

impl Unit {
    fn new(room_temperature: u8) -> Self {
        Unit {
            state: ClimateState {
                power: false,
                mode: ClimateMode::Auto,
                current_temperature: room_temperature,
                fan_mode: FanMode::Auto,
                vertical_airflow: Airflow::Position1,
                horizontal_airflow: Airflow::Position1,
            },
            target_temperature: room_temperature,
        }
    }

    fn apply(&mut self, command: &ReceivedCommand) {
        self.state.power = command.power;
        self.state.mode = command.mode;
        self.state.fan_mode = command.fan_mode;
        self.state.vertical_airflow = command.vertical_airflow;
        self.state.horizontal_airflow = command.horizontal_airflow;

        // 0 means no target was given
        if command.target_temperature != 0 {
            self.target_temperature = command.target_temperature;
        }
    }

    /// Move the room one degree towards the target while running, or drift while off.
    fn step<R: Rng>(&mut self, rng: &mut R) {
        let current = self.state.current_temperature;

        self.state.current_temperature = if self.state.power && self.state.mode != ClimateMode::FanOnly {
            match current.cmp(&self.target_temperature) {
                std::cmp::Ordering::Less => current + 1,
                std::cmp::Ordering::Greater => current - 1,
                std::cmp::Ordering::Equal => current,
            }
        } else if rng.gen_bool(0.1) {
            if rng.gen() { current.saturating_add(1) } else { current.saturating_sub(1) }
        } else {
            current
        };
    }
}


#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.corrupt_rate) {
        bail!("--corrupt-rate must be between 0 and 1");
    }

    let listener = TcpListener::bind(&args.listen).await?;

    let unit = Arc::new(Mutex::new(Unit::new(args.room_temperature)));
    let args = Arc::new(args);

    info!("listening on {}", args.listen);

    loop {
        let (socket, addr) = listener.accept().await?;

        socket.set_nodelay(true)?;

        info!("new connection from {addr}");

        tokio::spawn({
            let unit = unit.clone();
            let args = args.clone();

            async move {
                if let Err(err) = serve(socket, unit, &args).await {
                    warn!("connection from {addr} failed: {err}");
                }

                info!("{addr} disconnected");
            }
        });
    }
}

async fn serve(socket: TcpStream, unit: Arc<Mutex<Unit>>, args: &Args) -> Result<()> {
    let mut framed = Framed::new(socket, UnitCodec::new(args.framing));
    let mut ticker = interval(Duration::from_millis(args.interval_ms));
    let mut rng = StdRng::from_entropy();

    loop {
        let state = select! {
            command = framed.next() => {
                let Some(command) = command else {
                    return Ok(())
                };
                let command = command?;

                info!(?command, "command received");

                let mut unit = unit.lock().await;
                unit.apply(&command);
                unit.state
            },
            _ = ticker.tick() => {
                let mut unit = unit.lock().await;
                unit.step(&mut rng);
                unit.state
            }
        };

        let mut frame = *encode_state(&state).as_bytes();

        if rng.gen_bool(args.corrupt_rate) {
            let index = rng.gen_range(0..FRAME_LENGTH);
            frame[index] ^= rng.gen_range(1..=u8::MAX);

            warn!("corrupting byte {index} of status frame");
        }

        framed.send(Frame::new(frame)).await?;
    }
}
