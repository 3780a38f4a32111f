use std::mem::size_of;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address {0:#x} is outside physical memory")]
    OverCapacity(u64),
}

/// Simulated physical memory: `frames` contiguous frames of `FRAME_SIZE` bytes.
#[derive(Clone)]
pub struct PhysicalMemory<const FRAME_SIZE: usize> {
    buffer: Vec<u8>,
}

impl<const FRAME_SIZE: usize> std::fmt::Debug for PhysicalMemory<FRAME_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalMemory")
            .field("frame_size", &FRAME_SIZE)
            .field("frames", &self.frames())
            .finish()
    }
}

impl<const FRAME_SIZE: usize> PhysicalMemory<FRAME_SIZE> {
    pub fn create(frames: usize) -> Self {
        Self {
            buffer: vec![0; frames * FRAME_SIZE],
        }
    }

    pub fn frames(&self) -> usize {
        self.buffer.len() / FRAME_SIZE
    }

    /// Byte address of the first byte of `frame`.
    pub fn frame_address(frame: usize) -> u64 {
        (frame * FRAME_SIZE) as u64
    }

    pub fn frame(&self, frame: usize) -> &[u8] {
        &self.buffer[frame * FRAME_SIZE..(frame + 1) * FRAME_SIZE]
    }

    pub fn frame_mut(&mut self, frame: usize) -> &mut [u8] {
        &mut self.buffer[frame * FRAME_SIZE..(frame + 1) * FRAME_SIZE]
    }

    pub fn zero_frame(&mut self, frame: usize) {
        self.frame_mut(frame).fill(0);
    }

    fn check_address(&self, address: u64, len: usize) -> Result<(), MemoryError> {
        if address as usize + len > self.buffer.len() {
            return Err(MemoryError::OverCapacity(address));
        }
        Ok(())
    }

    pub fn write_u64(&mut self, address: u64, word: u64) -> Result<(), MemoryError> {
        self.check_address(address, size_of::<u64>())?;
        let start = address as usize;
        self.buffer[start..start + size_of::<u64>()].copy_from_slice(&word.to_be_bytes());
        Ok(())
    }
}
