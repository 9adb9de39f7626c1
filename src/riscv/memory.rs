//! The alignment shim (spec §4.7 "Alignment shim"): splits an arbitrary
//! byte-granular memory access into the word-aligned reads/writes the
//! debug module actually supports, splicing in the requested bytes.

use crate::riscv::dtm::DebugTransportModule;
use crate::riscv::error::RiscvError;
use crate::riscv::translator::{MemoryAccessStrategy, RiscvTranslator};

const WORD_SIZE: u32 = 4;

fn aligned_envelope(address: u32, length: u32) -> (u32, u32) {
    let aligned_start = address - (address % WORD_SIZE);
    let end = address + length;
    let aligned_end = (end + WORD_SIZE - 1) / WORD_SIZE * WORD_SIZE;
    (aligned_start, (aligned_end - aligned_start) / WORD_SIZE)
}

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}

fn bytes_to_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

impl<D: DebugTransportModule> RiscvTranslator<D> {
    /// Reads `length` bytes starting at `address`, at any alignment, by
    /// reading the containing aligned word range and splicing out the
    /// requested bytes.
    pub fn read_memory(&mut self, address: u32, length: u32) -> Result<Vec<u8>, RiscvError> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let (aligned_start, word_count) = aligned_envelope(address, length);

        let words = match self.active_strategy() {
            Some(MemoryAccessStrategy::AbstractCommand) | None => {
                self.read_words_abstract_command(aligned_start, word_count)?
            }
            Some(MemoryAccessStrategy::ProgramBuffer) => {
                self.read_words_program_buffer(aligned_start, word_count)?
            }
        };

        let bytes = words_to_bytes(&words);
        let offset = (address - aligned_start) as usize;
        Ok(bytes[offset..offset + length as usize].to_vec())
    }

    /// Writes `data` starting at `address`, at any alignment, by
    /// read-modify-writing only the affected aligned words.
    pub fn write_memory(&mut self, address: u32, data: &[u8]) -> Result<(), RiscvError> {
        if data.is_empty() {
            return Ok(());
        }
        let (aligned_start, word_count) = aligned_envelope(address, data.len() as u32);

        let mut words = match self.active_strategy() {
            Some(MemoryAccessStrategy::AbstractCommand) | None => {
                self.read_words_abstract_command(aligned_start, word_count)?
            }
            Some(MemoryAccessStrategy::ProgramBuffer) => {
                self.read_words_program_buffer(aligned_start, word_count)?
            }
        };

        let mut bytes = words_to_bytes(&words);
        let offset = (address - aligned_start) as usize;
        bytes[offset..offset + data.len()].copy_from_slice(data);
        words = bytes_to_words(&bytes);

        match self.active_strategy() {
            Some(MemoryAccessStrategy::AbstractCommand) | None => {
                self.write_words_abstract_command(aligned_start, &words)
            }
            Some(MemoryAccessStrategy::ProgramBuffer) => {
                self.write_words_program_buffer(aligned_start, &words)
            }
        }
    }
}
