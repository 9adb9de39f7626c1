//! Flash-programming session: accumulates erase/write requests across
//! `vFlashErase`/`vFlashWrite` and flushes them atomically on
//! `vFlashDone` (spec §4.5).

/// One pending write within a flash-programming session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub address: u32,
    pub bytes: Vec<u8>,
}

/// A growable buffer of writes plus a set of erased regions, flushed
/// atomically on `vFlashDone`.
///
/// Writes within the same contiguous erased region are coalesced;
/// overlapping writes in the same session overwrite earlier bytes in
/// arrival order (spec §4.5).
#[derive(Debug, Default)]
pub struct FlashSession {
    erased_regions: Vec<(u32, u32)>,
    writes: Vec<PendingWrite>,
}

impl FlashSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_erase(&mut self, address: u32, length: u32) {
        self.erased_regions.push((address, length));
    }

    pub fn record_write(&mut self, address: u32, bytes: Vec<u8>) {
        self.writes.push(PendingWrite { address, bytes });
    }

    pub fn erased_regions(&self) -> &[(u32, u32)] {
        &self.erased_regions
    }

    /// Coalesces all recorded writes into a single flat buffer per
    /// contiguous erased region, later writes overwriting earlier ones
    /// byte-for-byte where they overlap. Returns `(region_start,
    /// flattened_bytes)` pairs ready for a single atomic program
    /// operation.
    pub fn flatten(&self) -> Vec<(u32, Vec<u8>)> {
        let mut out = Vec::with_capacity(self.erased_regions.len());

        for &(region_start, region_length) in &self.erased_regions {
            let mut buffer = vec![0u8; region_length as usize];
            let region_end = region_start as u64 + region_length as u64;

            for write in &self.writes {
                let write_start = write.address as u64;
                let write_end = write_start + write.bytes.len() as u64;
                if write_end <= region_start as u64 || write_start >= region_end {
                    continue;
                }

                let overlap_start = write_start.max(region_start as u64);
                let overlap_end = write_end.min(region_end);
                for addr in overlap_start..overlap_end {
                    let src_index = (addr - write_start) as usize;
                    let dst_index = (addr - region_start as u64) as usize;
                    buffer[dst_index] = write.bytes[src_index];
                }
            }

            out.push((region_start, buffer));
        }

        out
    }
}
