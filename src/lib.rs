//! Codec for the Fujitsu AnywAIR serial link.
//!
//! Status frames from the unit are fixed 20 byte frames closed by an
//! additive checksum. There is no start marker; frames are cut purely by
//! length. Commands going the other way are six bytes in the order
//! power, mode, temperature, fan, vertical flow, horizontal flow.

pub mod climate;
pub mod config;
pub mod protocol;
pub mod transport;
