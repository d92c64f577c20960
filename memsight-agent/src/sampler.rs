//! Host memory sampling.

use thiserror::Error;

/// Error reading host memory statistics.
#[derive(Debug, Error)]
pub enum HostStatError {
    #[error("Failed to read memory statistics: {0}")]
    Read(String),
    #[error("Memory statistics are not supported on this platform")]
    Unsupported,
}

/// Raw memory figures in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl MemoryReading {
    /// Build a reading from total and free memory; used is the difference.
    pub fn from_total_free(total: u64, free: u64) -> Self {
        Self {
            total,
            used: total.saturating_sub(free),
            free,
        }
    }
}

/// A source of host memory statistics.
pub trait HostStatSource {
    fn read_memory(&mut self) -> Result<MemoryReading, HostStatError>;
}

/// One memory sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    /// `floor(100 * used / total)`.
    pub utilization: u64,
}

/// Turns host readings into samples.
///
/// When the host reports a total of zero the utilization of the previous
/// sample is carried over (zero before the first valid reading).
pub struct Sampler<H> {
    source: H,
    last_utilization: u64,
}

impl<H: HostStatSource> Sampler<H> {
    pub fn new(source: H) -> Self {
        Self {
            source,
            last_utilization: 0,
        }
    }

    /// Read the host and compute a new sample.
    pub fn sample(&mut self) -> Result<Sample, HostStatError> {
        let reading = self.source.read_memory()?;

        if reading.total > 0 {
            self.last_utilization =
                (u128::from(reading.used) * 100 / u128::from(reading.total)) as u64;
        }

        Ok(Sample {
            total: reading.total,
            used: reading.used,
            free: reading.free,
            utilization: self.last_utilization,
        })
    }
}

/// Memory statistics from the `sysinfo` crate.
pub struct SysinfoSource {
    system: sysinfo::System,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            system: sysinfo::System::new(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HostStatSource for SysinfoSource {
    fn read_memory(&mut self) -> Result<MemoryReading, HostStatError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(HostStatError::Unsupported);
        }

        self.system.refresh_memory();
        Ok(MemoryReading::from_total_free(
            self.system.total_memory(),
            self.system.free_memory(),
        ))
    }
}

/// The memory source for the current platform.
#[cfg(target_os = "linux")]
pub fn host_source() -> crate::linux::MeminfoSource {
    crate::linux::MeminfoSource
}

/// The memory source for the current platform.
#[cfg(not(target_os = "linux"))]
pub fn host_source() -> SysinfoSource {
    SysinfoSource::new()
}
