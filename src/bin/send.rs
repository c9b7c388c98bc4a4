use anyhow::{Result, Context, bail};

use clap::Parser;
use fujitsu_anywair::{climate::{Airflow, ClimateMode, DesiredClimateState, FanMode, SwingMode}, config::{init_logging, open_transport}, protocol::encode::CommandFraming, transport::Link};
use tracing::info;
use url::Url;


/// Send one command to the unit
///
/// Unspecified settings are sent as their defaults: no mode powers the unit
/// off, fan auto, airflow position 1.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the port to connect to
    ///
    /// either serial:///device/path or tcp+raw://host:port URLs supported
    port: Url,

    /// off, auto, cool, dry, fan_only or heat
    #[arg(long)]
    mode: Option<ClimateMode>,

    /// Target temperature in Celsius, clamped to 16-30
    #[arg(long)]
    temperature: Option<f32>,

    /// auto, quiet, low, medium or high
    #[arg(long)]
    fan: Option<FanMode>,

    /// off, vertical, horizontal or both
    #[arg(long, default_value = "off")]
    swing: SwingMode,

    /// Fixed vertical louvre position, 1-6
    #[arg(long)]
    vertical_position: Option<u8>,

    /// Fixed horizontal louvre position, 1-6
    #[arg(long)]
    horizontal_position: Option<u8>,

    /// bare (6 byte payload) or framed (20 byte checksummed frame)
    #[arg(long, default_value = "bare")]
    framing: CommandFraming,

    /// Wait this long for a status frame after sending
    #[arg(long)]
    wait_ms: Option<u32>,
}

fn position(n: Option<u8>) -> Result<Option<Airflow>> {
    match n {
        None => Ok(None),
        Some(n) => Airflow::position(n)
            .map(Some)
            .with_context(|| format!("louvre position {n} out of range (1-6)")),
    }
}


fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();

    if args.swing.vertical() && args.vertical_position.is_some() {
        bail!("--vertical-position can't be combined with vertical swing");
    }

    if args.swing.horizontal() && args.horizontal_position.is_some() {
        bail!("--horizontal-position can't be combined with horizontal swing");
    }

    let desired = DesiredClimateState {
        mode: args.mode,
        target_temperature: args.temperature,
        fan_mode: args.fan,
        vertical_airflow: position(args.vertical_position)?,
        horizontal_airflow: position(args.horizontal_position)?,
        ..Default::default()
    }.with_swing_mode(args.swing);

    let transport = open_transport(&args.port)?;
    let mut link = Link::new(transport, args.framing);

    match args.wait_ms {
        None => {
            link.send_command(&desired)?;
            info!("command sent");
        },
        Some(timeout_ms) => {
            let state = link.exchange(&desired, timeout_ms)?;
            println!("{state}");
        }
    }

    Ok(())
}
