pub mod block_device;
pub mod file_disk;
pub mod init;
pub mod mem_disk;
pub mod types;


pub use block_device::BlockDevice;
pub use file_disk::FileDisk;
pub use mem_disk::MemDisk;
pub use types::{Geometry, Sector};
