use super::frame::FRAME_LENGTH;

/// Cuts a byte stream into fixed length chunks.
///
/// There is no start-of-frame marker on this link, so no resync search is
/// done: a dropped or injected byte shifts every following chunk until the
/// stream happens to line up again. Misaligned chunks are rejected later by
/// the checksum.
#[derive(Debug)]
pub struct Reassembler<const N: usize> {
    buffer: [u8; N],
    cursor: usize,
}

pub type FrameReassembler = Reassembler<FRAME_LENGTH>;

impl<const N: usize> Reassembler<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0x00; N],
            cursor: 0,
        }
    }

    /// Append one byte, returning the completed chunk when this byte fills it.
    pub fn feed(&mut self, byte: u8) -> Option<[u8; N]> {
        self.buffer[self.cursor] = byte;
        self.cursor += 1;

        if self.cursor < N {
            return None;
        }

        self.cursor = 0;

        Some(self.buffer)
    }

    /// Number of bytes held towards the next chunk.
    pub fn pending(&self) -> usize {
        self.cursor
    }

    /// Drop any partially accumulated chunk.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl<const N: usize> Default for Reassembler<N> {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_frame_not_emitted() {
        let mut reassembler = FrameReassembler::new();

        for byte in 0..(FRAME_LENGTH as u8 - 1) {
            assert_eq!(reassembler.feed(byte), None);
        }

        assert_eq!(reassembler.pending(), FRAME_LENGTH - 1);
    }

    #[test]
    fn test_full_frame_emitted_once() {
        let mut reassembler = FrameReassembler::new();
        let bytes: Vec<u8> = (0..FRAME_LENGTH as u8).collect();

        let frames: Vec<_> = bytes.iter().filter_map(|byte| reassembler.feed(*byte)).collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &bytes[..]);
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_consecutive_frames() {
        let mut reassembler = Reassembler::<4>::new();

        let frames: Vec<_> = [1, 2, 3, 4, 5, 6, 7, 8, 9]
            .into_iter()
            .filter_map(|byte| reassembler.feed(byte))
            .collect();

        assert_eq!(frames, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
        assert_eq!(reassembler.pending(), 1);
    }

    #[test]
    fn test_injected_byte_shifts_boundaries() {
        let mut reassembler = Reassembler::<3>::new();

        // one junk byte ahead of two aligned chunks
        let frames: Vec<_> = [0xee, 1, 2, 3, 4, 5, 6]
            .into_iter()
            .filter_map(|byte| reassembler.feed(byte))
            .collect();

        assert_eq!(frames, vec![[0xee, 1, 2], [3, 4, 5]]);
    }

    #[test]
    fn test_reset() {
        let mut reassembler = Reassembler::<3>::new();
        reassembler.feed(0xee);
        reassembler.reset();

        assert_eq!(reassembler.feed(1), None);
        assert_eq!(reassembler.feed(2), None);
        assert_eq!(reassembler.feed(3), Some([1, 2, 3]));
    }
}
