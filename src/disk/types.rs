/// Default sector size in bytes.
pub const DEFAULT_SECTOR_SIZE: usize = 512;

/// Default number of sectors on a freshly created disk image (2 MiB).
pub const DEFAULT_TOTAL_SECTORS: u32 = 4096;

/// A single sector's worth of bytes. All device I/O moves whole sectors.
pub type Sector = Vec<u8>;

/// Fixed shape of a block device, known once the device is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub total_sectors: u32,
    pub sector_size: usize,
}

impl Geometry {
    pub const fn new(total_sectors: u32, sector_size: usize) -> Self {
        Self {
            total_sectors,
            sector_size,
        }
    }

    /// Size of the whole device in bytes.
    pub const fn disk_size(&self) -> u64 {
        self.total_sectors as u64 * self.sector_size as u64
    }

    /// A zero-filled buffer of exactly one sector.
    pub fn empty_sector(&self) -> Sector {
        vec![0; self.sector_size]
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SECTORS, DEFAULT_SECTOR_SIZE)
    }
}
