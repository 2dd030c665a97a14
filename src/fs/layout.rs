use crate::{
    disk::Geometry,
    fs::{
        error::{FileSystemError, Result},
        inode::Inode,
    },
};

/// Fixed on-disk regions of a volume, derived from the device geometry.
///
/// ```text
/// | sector bitmap | inode bitmap | inode table | data area ... |
/// 0               ^ inode_bitmap_start        ^ data_start
/// ```
///
/// Nothing about the layout is stored on disk: mounting recomputes it from
/// the geometry and the inode record size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub total_sectors: u32,
    pub sector_size: usize,
    /// Bytes per inode record (the larger of the file and directory variants).
    pub inode_size: usize,
    /// ceil(ceil(N / 8) / sector_size)
    pub sector_bitmap_sectors: u32,
    /// N - sector_bitmap_sectors
    pub inode_count: u32,
    /// ceil(inode_count / sector_size / 8)
    pub inode_bitmap_sectors: u32,
    /// ceil(inode_count * inode_size / sector_size)
    pub inode_table_sectors: u32,
}

impl Layout {
    pub fn compute(total_sectors: u32, sector_size: usize, inode_size: usize) -> Result<Self> {
        if sector_size == 0 || sector_size % 4 != 0 {
            return Err(FileSystemError::InvalidGeometry(format!(
                "sector size {sector_size} is not a positive multiple of 4"
            )));
        }
        if inode_size == 0 || inode_size > sector_size {
            return Err(FileSystemError::InvalidGeometry(format!(
                "inode record of {inode_size} bytes does not fit a {sector_size}-byte sector"
            )));
        }

        // 用 u64 计算，避免中间结果溢出
        let n = u64::from(total_sectors);
        let ss = sector_size as u64;

        let sector_bitmap_sectors = n.div_ceil(8).div_ceil(ss);
        let inode_count = n.saturating_sub(sector_bitmap_sectors);
        let inode_bitmap_sectors = inode_count.div_ceil(ss * 8);
        let inode_table_sectors = (inode_count * inode_size as u64).div_ceil(ss);

        let metadata = sector_bitmap_sectors + inode_bitmap_sectors + inode_table_sectors;
        if metadata >= n {
            return Err(FileSystemError::InvalidGeometry(format!(
                "{total_sectors} sectors leave no room for data after {metadata} metadata sectors"
            )));
        }

        // every value is bounded by `n`, which came from a u32
        Ok(Self {
            total_sectors,
            sector_size,
            inode_size,
            sector_bitmap_sectors: sector_bitmap_sectors as u32,
            inode_count: inode_count as u32,
            inode_bitmap_sectors: inode_bitmap_sectors as u32,
            inode_table_sectors: inode_table_sectors as u32,
        })
    }

    /// Layout for a device using this crate's inode record encoding.
    pub fn for_geometry(geometry: Geometry) -> Result<Self> {
        Self::compute(
            geometry.total_sectors,
            geometry.sector_size,
            Inode::record_size(),
        )
    }

    // 扇区位图从 0 号扇区开始
    pub const fn sector_bitmap_start(&self) -> u32 {
        0
    }

    pub const fn inode_bitmap_start(&self) -> u32 {
        self.sector_bitmap_sectors
    }

    pub const fn inode_table_start(&self) -> u32 {
        self.sector_bitmap_sectors + self.inode_bitmap_sectors
    }

    /// First sector of the data area; everything before it is metadata.
    pub const fn data_start(&self) -> u32 {
        self.inode_table_start() + self.inode_table_sectors
    }

    pub const fn metadata_sectors(&self) -> u32 {
        self.data_start()
    }

    // 每个扇区能放下的 inode 记录数（记录不跨扇区）
    pub const fn inodes_per_sector(&self) -> u32 {
        (self.sector_size / self.inode_size) as u32
    }

    /// Inodes that can actually be addressed inside the inode table.
    ///
    /// Records never straddle sectors, so when `inode_size` does not divide
    /// the sector size this is smaller than `inode_count`.
    pub fn inode_capacity(&self) -> u32 {
        let addressable = u64::from(self.inode_table_sectors) * u64::from(self.inodes_per_sector());
        addressable.min(u64::from(self.inode_count)) as u32
    }

    /// Sector holding inode `number`, and the byte offset of its record there.
    pub fn inode_location(&self, number: u32) -> (u32, usize) {
        let per_sector = self.inodes_per_sector();
        let sector = number / per_sector + self.inode_table_start();
        let offset = (number % per_sector) as usize * self.inode_size;
        (sector, offset)
    }
}
