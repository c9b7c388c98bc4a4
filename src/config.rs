use std::{net::TcpStream as StdTcpStream, time::Duration};

use futures::{Sink, Stream};
use tokio::net::TcpStream;
use tokio_serial::{Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tokio_util::codec::Framed;
use tracing_subscriber::EnvFilter;
use url::Url;
use anyhow::{Result, Context, bail};

use crate::climate::DesiredClimateState;
use crate::protocol::{codec::{ControllerCodec, RxFrame}, encode::CommandFraming};
use crate::transport::{StreamTransport, Transport};


pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Install the log subscriber for the command line tools.
///
/// Filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Serial line settings, taken from the query string of a `serial://` URL
/// (e.g. `serial:///dev/ttyUSB0?baud=9600&parity=even`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub parity: Parity,
}

impl Default for SerialSettings {
    fn default() -> Self {
        SerialSettings {
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
        }
    }
}

impl SerialSettings {
    pub fn from_url(url: &Url) -> Result<Self> {
        let mut settings = Self::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "baud" => {
                    settings.baud_rate = value.parse()
                        .with_context(|| format!("invalid baud rate {value} in url: {url}"))?;
                },
                "parity" => {
                    settings.parity = match value.as_ref() {
                        "none" => Parity::None,
                        "even" => Parity::Even,
                        "odd" => Parity::Odd,
                        other => bail!("invalid parity {other} in url: {url} (expected none, even or odd)"),
                    };
                },
                other => bail!("unknown serial option {other} in url: {url}"),
            }
        }

        Ok(settings)
    }
}


pub enum Port {
    Serial(SerialStream),
    TcpRaw(TcpStream)
}


pub trait PortStream: Stream<Item = std::io::Result<RxFrame>> + Sink<DesiredClimateState, Error = std::io::Error> + Send + Unpin {}

impl<T> PortStream for T
where
    T: Stream<Item = std::io::Result<RxFrame>> + Sink<DesiredClimateState, Error = std::io::Error> + Send + Unpin,
{}


fn tcp_address(url: &Url) -> Result<(&str, u16)> {
    let host = url.host_str()
        .with_context(|| format!("tcp+raw requires a host to be specified in the url: {url}"))?;

    let port = url.port()
        .with_context(|| format!("tcp+raw requires a port number to be specified in the url: {url}"))?;

    Ok((host, port))
}

impl Port {
    pub async fn open(url: &Url) -> Result<Self> {
        match url.scheme() {
            "serial" => {
                let path = url.path();
                let settings = SerialSettings::from_url(url)?;

                let port = tokio_serial::new(path, settings.baud_rate)
                    .stop_bits(StopBits::One)
                    .parity(settings.parity)
                    .open_native_async()
                    .with_context(|| format!("failed to open serial port {path}"))
                    ?;

                Ok(Self::Serial(port))
            },
            "tcp+raw" => {
                let address = tcp_address(url)?;

                let stream = TcpStream::connect(address).await
                    .with_context(|| format!("failed to open tcp+raw connection to: {url}"))?;

                stream.set_nodelay(true)?;

                Ok(Self::TcpRaw(stream))
            },
            other => {
                bail!("url scheme {other} not supported");
            }
        }
    }

    pub fn framed(self, framing: CommandFraming) -> Box<dyn PortStream> {
        match self {
            Port::Serial(port) => {
                Box::new(Framed::new(port, ControllerCodec::new(framing)))
            },
            Port::TcpRaw(stream) => {
                Box::new(Framed::new(stream, ControllerCodec::new(framing)))
            }
        }
    }
}


/// Open a port for synchronous polling.
///
/// Reads never block: serial ports are opened with a zero timeout and
/// sockets are put in non-blocking mode.
pub fn open_transport(url: &Url) -> Result<Box<dyn Transport + Send>> {
    match url.scheme() {
        "serial" => {
            let path = url.path();
            let settings = SerialSettings::from_url(url)?;

            let port = tokio_serial::new(path, settings.baud_rate)
                .stop_bits(StopBits::One)
                .parity(settings.parity)
                .timeout(Duration::ZERO)
                .open()
                .with_context(|| format!("failed to open serial port {path}"))?;

            Ok(Box::new(StreamTransport::new(port)))
        },
        "tcp+raw" => {
            let address = tcp_address(url)?;

            let stream = StdTcpStream::connect(address)
                .with_context(|| format!("failed to open tcp+raw connection to: {url}"))?;

            stream.set_nodelay(true)?;
            stream.set_nonblocking(true)?;

            Ok(Box::new(StreamTransport::new(stream)))
        },
        other => {
            bail!("url scheme {other} not supported");
        }
    }
}
