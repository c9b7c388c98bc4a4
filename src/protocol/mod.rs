pub mod codec;
pub mod decode;
pub mod encode;
pub mod frame;
pub mod reassembler;
pub mod tables;
