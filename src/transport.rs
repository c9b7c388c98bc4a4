use std::{collections::VecDeque, io::{self, Read, Write}, thread, time::{Duration, Instant}};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::climate::{ClimateEntity, ClimateState, DesiredClimateState};
use crate::protocol::{decode::decode, encode::{encode, CommandFraming}, reassembler::FrameReassembler};


/// Byte level access to the serial link.
pub trait Transport {
    /// Next received byte, or `None` if nothing is buffered. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    fn bytes_available(&mut self) -> bool;

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Monotonic clock in milliseconds. Wraps.
    fn millis(&self) -> u32;

    fn elapsed_millis_since(&self, start: u32) -> u32 {
        self.millis().wrapping_sub(start)
    }

    /// Called by bounded waits when there is nothing to read yet.
    fn idle(&mut self) {}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn bytes_available(&mut self) -> bool {
        (**self).bytes_available()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn millis(&self) -> u32 {
        (**self).millis()
    }

    fn elapsed_millis_since(&self, start: u32) -> u32 {
        (**self).elapsed_millis_since(start)
    }

    fn idle(&mut self) {
        (**self).idle()
    }
}


/// [Transport] over any non-blocking (or zero timeout) `Read + Write` stream,
/// such as a serial port or a TCP socket.
pub struct StreamTransport<S> {
    stream: S,
    pending: VecDeque<u8>,
    epoch: Instant,
}

impl<S: Read + Write> StreamTransport<S> {
    const IDLE: Duration = Duration::from_millis(1);

    pub fn new(stream: S) -> Self {
        StreamTransport {
            stream,
            pending: VecDeque::new(),
            epoch: Instant::now(),
        }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    fn fill(&mut self) {
        let mut buffer = [0; 64];

        match self.stream.read(&mut buffer) {
            Ok(n) => self.pending.extend(&buffer[..n]),

            // nothing buffered right now
            Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => (),

            Err(err) => warn!("read failed: {err}"),
        }
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            self.fill();
        }

        self.pending.pop_front()
    }

    fn bytes_available(&mut self) -> bool {
        if self.pending.is_empty() {
            self.fill();
        }

        !self.pending.is_empty()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }

    fn millis(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }

    fn idle(&mut self) {
        thread::sleep(Self::IDLE);
    }
}


#[derive(Error, Debug)]
pub enum LinkError {
    #[error("no valid frame received within {timeout_ms}ms")]
    Timeout {
        timeout_ms: u32
    },
    #[error("failed to write command: {0}")]
    Write(#[from] io::Error),
}

/// One end of the serial link, as driven from a polling loop.
///
/// Owns the reassembly buffer for its transport; nothing is shared between links.
pub struct Link<T> {
    transport: T,
    reassembler: FrameReassembler,
    framing: CommandFraming,
}

impl<T: Transport> Link<T> {
    pub fn new(transport: T, framing: CommandFraming) -> Self {
        Link {
            transport,
            reassembler: FrameReassembler::new(),
            framing,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Consume whatever bytes are available and push every valid status to `entity`.
    ///
    /// Returns the number of states delivered. Never waits for more bytes; a
    /// partial frame is kept for the next poll.
    pub fn poll<E: ClimateEntity + ?Sized>(&mut self, entity: &mut E) -> usize {
        let mut delivered = 0;

        while let Some(state) = self.next_state(None) {
            entity.on_decoded(state);
            delivered += 1;
        }

        delivered
    }

    /// Read bytes until a valid status frame completes, the transport runs
    /// dry, or `deadline` (start millis, timeout) passes.
    fn next_state(&mut self, deadline: Option<(u32, u32)>) -> Option<ClimateState> {
        while self.transport.bytes_available() {
            if let Some((start, timeout_ms)) = deadline {
                if self.transport.elapsed_millis_since(start) >= timeout_ms {
                    break;
                }
            }

            let Some(byte) = self.transport.read_byte() else {
                break;
            };

            let Some(bytes) = self.reassembler.feed(byte) else {
                continue;
            };

            match decode(&bytes) {
                Ok(state) => {
                    debug!(%state, "status frame");
                    return Some(state);
                },
                Err(err) => {
                    warn!("discarding frame {:02x?}: {err}", &bytes[..]);
                }
            }
        }

        None
    }

    /// Encode and write a command. Fire-and-forget: nothing is read back.
    pub fn send_command(&mut self, desired: &DesiredClimateState) -> Result<(), LinkError> {
        let payload = encode(desired);

        let mut buffer = Vec::with_capacity(self.framing.len());
        self.framing.put(&payload, &mut buffer);

        debug!(framing = %self.framing, "sending command {buffer:02x?}");

        self.transport.write_bytes(&buffer)?;
        self.transport.flush()?;

        Ok(())
    }

    /// Send whatever `entity` currently wants.
    pub fn apply<E: ClimateEntity + ?Sized>(&mut self, entity: &E) -> Result<(), LinkError> {
        self.send_command(&entity.desired_state())
    }

    /// Wait up to `timeout_ms` for the next valid status frame.
    pub fn read_response(&mut self, timeout_ms: u32) -> Result<ClimateState, LinkError> {
        let start = self.transport.millis();

        loop {
            if let Some(state) = self.next_state(Some((start, timeout_ms))) {
                return Ok(state);
            }

            if self.transport.elapsed_millis_since(start) >= timeout_ms {
                trace!(pending = self.reassembler.pending(), "response timed out");
                return Err(LinkError::Timeout { timeout_ms });
            }

            self.transport.idle();
        }
    }

    /// Send a command then wait for the unit's reply.
    pub fn exchange(&mut self, desired: &DesiredClimateState, timeout_ms: u32) -> Result<ClimateState, LinkError> {
        self.send_command(desired)?;
        self.read_response(timeout_ms)
    }
}
