//! A small single-volume file system laid directly over a sector device.
//!
//! `disk` holds the device side (geometry, the `BlockDevice` trait and two
//! implementations); `fs` holds the on-disk layout, allocation, inode store,
//! path resolution and the open-file layer, all reached through
//! [`fs::FileSystem`].

pub mod disk;
pub mod fs;

pub use disk::{BlockDevice, FileDisk, Geometry, MemDisk};
pub use fs::{config::FsOptions, error::FileSystemError, FileSystem};
