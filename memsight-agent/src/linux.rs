//! Linux memory statistics from `/proc/meminfo`.
//!
//! Used memory follows the classic definition `MemTotal - MemFree`; page
//! cache and buffers count as used.

use procfs::{Current, Meminfo};

use crate::sampler::{HostStatError, HostStatSource, MemoryReading};

/// Reads `/proc/meminfo` on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeminfoSource;

impl HostStatSource for MeminfoSource {
    fn read_memory(&mut self) -> Result<MemoryReading, HostStatError> {
        let meminfo = Meminfo::current().map_err(|e| HostStatError::Read(e.to_string()))?;
        Ok(reading_from(&meminfo))
    }
}

fn reading_from(meminfo: &Meminfo) -> MemoryReading {
    MemoryReading::from_total_free(meminfo.mem_total, meminfo.mem_free)
}
