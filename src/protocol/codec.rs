use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::climate::{ClimateState, DesiredClimateState};

use super::decode::{decode, decode_command, ReceivedCommand};
use super::encode::{encode, encode_state, CommandFraming, COMMAND_LENGTH};
use super::frame::{Frame, FRAME_LENGTH};
use super::reassembler::{FrameReassembler, Reassembler};


/// A frame received from the unit
#[derive(Clone, Debug)]
pub enum RxFrame {
    Status(Frame, ClimateState),

    /// Failed the checksum. Already logged by the codec.
    Corrupted(Frame),
}

impl RxFrame {
    pub fn frame(&self) -> &Frame {
        match self {
            RxFrame::Status(frame, _) => frame,
            RxFrame::Corrupted(frame) => frame,
        }
    }

    pub fn state(&self) -> Option<&ClimateState> {
        match self {
            RxFrame::Status(_, state) => Some(state),
            RxFrame::Corrupted(_) => None,
        }
    }
}


/// Controller side of the link: decodes status frames, encodes commands.
pub struct ControllerCodec {
    reassembler: FrameReassembler,
    framing: CommandFraming,
}

impl ControllerCodec {
    pub fn new(framing: CommandFraming) -> Self {
        ControllerCodec {
            reassembler: FrameReassembler::new(),
            framing,
        }
    }
}

impl Default for ControllerCodec {
    fn default() -> Self {
        Self::new(CommandFraming::default())
    }
}

impl Decoder for ControllerCodec {
    type Item = RxFrame;

    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            let Some(bytes) = self.reassembler.feed(src.get_u8()) else {
                continue;
            };

            let frame = Frame::new(bytes);

            let rx = match decode(frame.as_bytes()) {
                Ok(state) => {
                    debug!(%state, "status frame");
                    RxFrame::Status(frame, state)
                },
                Err(err) => {
                    warn!("discarding frame: {err}");
                    RxFrame::Corrupted(frame)
                }
            };

            return Ok(Some(rx));
        }

        // need more data for a complete frame
        Ok(None)
    }
}

impl Encoder<DesiredClimateState> for ControllerCodec {
    type Error = std::io::Error;

    fn encode(&mut self, desired: DesiredClimateState, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = encode(&desired);

        debug!(framing = %self.framing, "command {payload:02x?}");

        dst.reserve(self.framing.len());
        self.framing.put(&payload, dst);

        Ok(())
    }
}


/// Unit side of the link: decodes commands, encodes status frames.
///
/// Used to emulate the air-conditioning unit.
pub struct UnitCodec {
    framing: CommandFraming,
    commands: Reassembler<COMMAND_LENGTH>,
    frames: FrameReassembler,
}

impl UnitCodec {
    pub fn new(framing: CommandFraming) -> Self {
        UnitCodec {
            framing,
            commands: Reassembler::new(),
            frames: FrameReassembler::new(),
        }
    }
}

impl Decoder for UnitCodec {
    type Item = ReceivedCommand;

    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();

            let command = match self.framing {
                CommandFraming::Bare => match self.commands.feed(byte) {
                    Some(payload) => decode_command(&payload),
                    None => continue,
                },
                CommandFraming::Framed => {
                    let Some(bytes) = self.frames.feed(byte) else {
                        continue;
                    };

                    match decode(&bytes) {
                        Ok(state) => ReceivedCommand::from(state),
                        Err(err) => {
                            warn!("discarding command frame {:02x?}: {err}", &bytes[..]);
                            continue;
                        }
                    }
                }
            };

            return Ok(Some(command));
        }

        Ok(None)
    }
}

impl Encoder<ClimateState> for UnitCodec {
    type Error = std::io::Error;

    fn encode(&mut self, state: ClimateState, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<Frame>>::encode(self, encode_state(&state), dst)
    }
}

/// Raw frames are written as is, valid or not.
impl Encoder<Frame> for UnitCodec {
    type Error = std::io::Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(FRAME_LENGTH);
        dst.put_slice(frame.as_bytes());

        Ok(())
    }
}
