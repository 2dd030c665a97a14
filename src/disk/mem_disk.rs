use std::{
    io::{Error, ErrorKind, Result},
    sync::Mutex,
};

use crate::disk::{
    block_device::{check_access, BlockDevice},
    types::Geometry,
};

/// A volatile device held entirely in memory.
#[derive(Debug)]
pub struct MemDisk {
    bytes: Mutex<Vec<u8>>,
    geometry: Geometry,
}

impl MemDisk {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            bytes: Mutex::new(vec![0; geometry.disk_size() as usize]),
            geometry,
        }
    }

    fn range(&self, sector: u32) -> std::ops::Range<usize> {
        let start = sector as usize * self.geometry.sector_size;
        start..start + self.geometry.sector_size
    }
}

impl BlockDevice for MemDisk {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn read_sector(&self, sector: u32, buf: &mut [u8]) -> Result<()> {
        check_access(&self.geometry, sector, buf.len())?;
        let bytes = self
            .bytes
            .lock()
            .map_err(|_| Error::new(ErrorKind::Other, "memory disk lock poisoned"))?;
        buf.copy_from_slice(&bytes[self.range(sector)]);
        Ok(())
    }

    fn write_sector(&self, sector: u32, buf: &[u8]) -> Result<()> {
        check_access(&self.geometry, sector, buf.len())?;
        let mut bytes = self
            .bytes
            .lock()
            .map_err(|_| Error::new(ErrorKind::Other, "memory disk lock poisoned"))?;
        let range = self.range(sector);
        bytes[range].copy_from_slice(buf);
        Ok(())
    }
}
