use std::fmt::Debug;

use thiserror::Error;

/*
    Status frame layout:

    0..=4   reserved
    5       power
    6       current temperature, whole degrees Celsius
    7       mode
    8       fan speed
    9       vertical airflow
    10      horizontal airflow
    11..=18 not understood yet
    19      checksum, sum of bytes 0..=18 modulo 256
*/

pub const FRAME_LENGTH: usize = 20;

/// The six bytes carrying semantic fields, starting at byte 5.
pub const FIELDS_OFFSET: usize = 5;
pub const FIELDS_LENGTH: usize = 6;

pub const CHECKSUM_OFFSET: usize = FRAME_LENGTH - 1;

/// Frame bytes 5..=10: power, temperature, mode, fan speed, vertical airflow, horizontal airflow.
pub type StatusFields = [u8; FIELDS_LENGTH];

pub trait Checksum {
    fn checksum(&mut self) -> u8;
}

impl <'a>Checksum for std::slice::Iter<'a, u8> {
    fn checksum(&mut self) -> u8 {
        self.fold(0, |acc, byte| acc.wrapping_add(*byte))
    }
}

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("invalid checksum (expected {expected:02x}, actual: {actual:02x})")]
    ChecksumMismatch {
        expected: u8,
        actual: u8,
    },
}

/// Check the trailing checksum byte against the sum of the other 19.
pub fn verify_checksum(bytes: &[u8; FRAME_LENGTH]) -> Result<(), FrameError> {
    let expected = bytes[..CHECKSUM_OFFSET].iter().checksum();
    let actual = bytes[CHECKSUM_OFFSET];

    if expected != actual {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(())
}


/// A candidate frame as cut from the byte stream. Not necessarily valid.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LENGTH]);

impl Frame {
    pub fn new(bytes: [u8; FRAME_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Build a valid frame around `fields`, with every other byte zeroed.
    pub fn from_fields(fields: &StatusFields) -> Self {
        let mut bytes = [0x00; FRAME_LENGTH];
        bytes[FIELDS_OFFSET..FIELDS_OFFSET + FIELDS_LENGTH].copy_from_slice(fields);
        bytes[CHECKSUM_OFFSET] = bytes[..CHECKSUM_OFFSET].iter().checksum();

        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LENGTH] {
        &self.0
    }

    pub fn fields(&self) -> StatusFields {
        let mut fields = [0x00; FIELDS_LENGTH];
        fields.copy_from_slice(&self.0[FIELDS_OFFSET..FIELDS_OFFSET + FIELDS_LENGTH]);
        fields
    }

    pub fn checksum(&self) -> u8 {
        self.0[CHECKSUM_OFFSET]
    }

    pub fn is_valid(&self) -> bool {
        verify_checksum(&self.0).is_ok()
    }
}

impl From<[u8; FRAME_LENGTH]> for Frame {
    fn from(bytes: [u8; FRAME_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({:02x?})", &self.0[..])
    }
}
