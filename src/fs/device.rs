use std::io::ErrorKind;

use tracing::{error, warn};

use crate::{
    disk::{BlockDevice, Geometry, Sector},
    fs::error::{DeviceOp, FileSystemError, Result},
};

/// Whole-sector I/O with a bounded retry on transient device failures.
#[derive(Debug)]
pub struct SectorIo<D> {
    disk: D,
    max_retries: u32,
}

// 只有这几类错误值得重试
fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::WouldBlock | ErrorKind::Interrupted | ErrorKind::TimedOut
    )
}

impl<D: BlockDevice> SectorIo<D> {
    pub fn new(disk: D, max_retries: u32) -> Self {
        Self { disk, max_retries }
    }

    pub fn geometry(&self) -> Geometry {
        self.disk.geometry()
    }

    pub fn disk(&self) -> &D {
        &self.disk
    }

    pub fn into_inner(self) -> D {
        self.disk
    }

    pub fn read(&self, sector: u32) -> Result<Sector> {
        let mut buf = self.geometry().empty_sector();
        self.retry(DeviceOp::Read, sector, || {
            self.disk.read_sector(sector, &mut buf)
        })?;
        Ok(buf)
    }

    pub fn write(&self, sector: u32, buf: &[u8]) -> Result<()> {
        self.retry(DeviceOp::Write, sector, || self.disk.write_sector(sector, buf))
    }

    fn retry(
        &self,
        op: DeviceOp,
        sector: u32,
        mut call: impl FnMut() -> std::io::Result<()>,
    ) -> Result<()> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match call() {
                Ok(()) => return Ok(()),
                Err(e) if is_transient(e.kind()) && attempts <= self.max_retries => {
                    warn!(%op, sector, attempts, error = %e, "transient device failure, retrying");
                }
                Err(source) => {
                    error!(%op, sector, attempts, error = %source, "device call failed");
                    return Err(FileSystemError::Device {
                        op,
                        sector,
                        attempts,
                        source,
                    });
                }
            }
        }
    }
}
