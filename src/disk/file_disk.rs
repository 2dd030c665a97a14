use std::{
    fs::{File, OpenOptions},
    io::{Error, ErrorKind, Read, Result, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use tracing::debug;

use crate::disk::{
    block_device::{check_access, BlockDevice},
    types::Geometry,
};

/// A disk image on the host file system, one sector after another.
#[derive(Debug)]
pub struct FileDisk {
    path: PathBuf,
    file: Mutex<File>,
    geometry: Geometry,
    /// True when the image did not exist (or was too short) before opening.
    pub fresh: bool,
}

impl FileDisk {
    /// Open or create the image at `path`, growing it to cover `geometry`.
    pub fn open(path: impl AsRef<Path>, geometry: Geometry) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let prev_len = file.metadata()?.len();
        let fresh = prev_len < geometry.disk_size();
        if fresh {
            debug!(path = %path.display(), size = geometry.disk_size(), "allocating disk image");
            file.set_len(geometry.disk_size())?;
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
            geometry,
            fresh,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| Error::new(ErrorKind::Other, "disk image lock poisoned"))
    }

    fn offset(&self, sector: u32) -> u64 {
        u64::from(sector) * self.geometry.sector_size as u64
    }
}

impl BlockDevice for FileDisk {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn read_sector(&self, sector: u32, buf: &mut [u8]) -> Result<()> {
        check_access(&self.geometry, sector, buf.len())?;
        let mut file = self.lock()?;
        file.seek(SeekFrom::Start(self.offset(sector)))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_sector(&self, sector: u32, buf: &[u8]) -> Result<()> {
        check_access(&self.geometry, sector, buf.len())?;
        let mut file = self.lock()?;
        file.seek(SeekFrom::Start(self.offset(sector)))?;
        file.write_all(buf)?;
        Ok(())
    }
}
