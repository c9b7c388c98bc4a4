use std::time::SystemTime;

use anyhow::Result;

use clap::Parser;
use colored::{Colorize, ColoredString};
use futures::StreamExt;
use fujitsu_anywair::{config::{init_logging, Port}, climate::ClimateState, protocol::{codec::RxFrame, encode::CommandFraming}};
use tracing::error;
use url::Url;


/// Decode and print every frame seen on a port
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the port to connect to
    ///
    /// either serial:///device/path or tcp+raw://host:port URLs supported
    port: Url,
}


fn delta_ms(time: Option<SystemTime>) -> u128 {
    time.and_then(|time| time.elapsed().ok())
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}

fn coloured(state: Option<&ClimateState>, line: String) -> ColoredString {
    match state {
        None => line.on_red().bright_white(),
        Some(state) if !state.power => line.dimmed(),
        Some(_) => line.normal(),
    }
}


#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();

    // nothing is sent, the framing only matters for outgoing commands
    let mut framed = Port::open(&args.port).await?.framed(CommandFraming::Bare);

    let start_time = SystemTime::now();
    let mut last_frame_time: Option<SystemTime> = None;

    while let Some(frame) = framed.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                error!("read failed: {err}");
                break;
            }
        };

        let start_delta_ms = delta_ms(Some(start_time));
        let last_frame_delta_ms = delta_ms(last_frame_time);

        let desc = match &frame {
            RxFrame::Status(_, state) => state.to_string(),
            RxFrame::Corrupted(_) => "corrupted".to_string(),
        };

        let bytes = frame.frame().as_bytes();
        let line = format!("[{start_delta_ms:8}, {last_frame_delta_ms:8}] {bytes:02x?} {desc}");

        println!("{}", coloured(frame.state(), line));

        last_frame_time = Some(SystemTime::now());
    }

    Ok(())
}
