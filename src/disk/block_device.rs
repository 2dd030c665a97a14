use std::io::Result;

use crate::disk::types::Geometry;

/// Sector-addressed storage underneath the file system.
///
/// Implementations may fail transiently (`WouldBlock`, `Interrupted`,
/// `TimedOut`); the file system retries those with a bounded budget.
pub trait BlockDevice: Send + Sync {
    fn geometry(&self) -> Geometry;

    /// Fill `buf` (exactly one sector long) with the contents of `sector`.
    fn read_sector(&self, sector: u32, buf: &mut [u8]) -> Result<()>;

    /// Overwrite `sector` with `buf` (exactly one sector long).
    fn write_sector(&self, sector: u32, buf: &[u8]) -> Result<()>;
}

impl<D: BlockDevice + ?Sized> BlockDevice for Box<D> {
    fn geometry(&self) -> Geometry {
        (**self).geometry()
    }

    fn read_sector(&self, sector: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read_sector(sector, buf)
    }

    fn write_sector(&self, sector: u32, buf: &[u8]) -> Result<()> {
        (**self).write_sector(sector, buf)
    }
}

/// Reject buffers and sector numbers that do not fit the geometry.
pub(crate) fn check_access(geometry: &Geometry, sector: u32, len: usize) -> Result<()> {
    if sector >= geometry.total_sectors {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "sector {sector} out of range (device has {})",
                geometry.total_sectors
            ),
        ));
    }
    if len != geometry.sector_size {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "buffer of {len} bytes does not match sector size {}",
                geometry.sector_size
            ),
        ));
    }
    Ok(())
}
