use std::path::Path;

use tracing::info;

use crate::{
    disk::{file_disk::FileDisk, types::Geometry},
    fs::{config::FsOptions, error::Result, FileSystem},
};

/// How the volume came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boot {
    Formatted,
    Mounted,
}

/// Open the disk image at `path` and bring a volume up on it.
///
/// A fresh image (or `force_format`) is formatted; anything else is mounted.
pub fn open_volume(
    path: impl AsRef<Path>,
    geometry: Geometry,
    options: FsOptions,
    force_format: bool,
) -> Result<(FileSystem<FileDisk>, Boot)> {
    let disk = FileDisk::open(path, geometry)?;
    let fresh = disk.fresh;
    info!(path = %disk.path().display(), fresh, "disk image opened");

    if fresh || force_format {
        let fs = FileSystem::format(disk, options)?;
        Ok((fs, Boot::Formatted))
    } else {
        let fs = FileSystem::mount(disk, options)?;
        Ok((fs, Boot::Mounted))
    }
}
