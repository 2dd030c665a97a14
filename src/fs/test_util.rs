use crate::{
    disk::{Geometry, MemDisk},
    fs::{config::FsOptions, FileSystem},
};

pub const SECTOR_SIZE: usize = 512;
pub const TOTAL_SECTORS: u32 = 1024;

pub fn mem_fs() -> FileSystem<MemDisk> {
    mem_fs_with(Geometry::new(TOTAL_SECTORS, SECTOR_SIZE))
}

pub fn mem_fs_with(geometry: Geometry) -> FileSystem<MemDisk> {
    FileSystem::format(MemDisk::new(geometry), FsOptions::default()).expect("format")
}

/// Create (or reopen) `path`, write `bytes` at offset 0 and close it.
pub fn write_file(fs: &mut FileSystem<MemDisk>, path: &str, bytes: &[u8]) {
    let fd = fs.open(path).expect("open");
    assert_eq!(fs.write(fd, bytes).expect("write"), bytes.len());
    fs.close(fd).expect("close");
}

pub fn read_file(fs: &mut FileSystem<MemDisk>, path: &str) -> Vec<u8> {
    let size = fs.stat(path).expect("stat").size as usize;
    let fd = fs.open(path).expect("open");
    let bytes = fs.read(fd, size).expect("read");
    fs.close(fd).expect("close");
    bytes
}

/// Use up inodes with a chain of nested directories (`/n`, `/n/n`, ...)
/// until only `keep` are free. Each directory holds one child, so nothing
/// spills. Returns the deepest path, or "" when nothing was created.
pub fn fill_inodes(fs: &mut FileSystem<MemDisk>, keep: u32) -> String {
    let mut path = String::new();
    while fs.free_inodes().expect("free inodes") > keep {
        path.push_str("/n");
        fs.mkdir(&path).expect("mkdir");
    }
    path
}
