use tracing::{debug, info, warn};

use crate::{
    disk::BlockDevice,
    fs::{
        bitmap::Bitmap,
        device::SectorIo,
        error::{FileSystemError, Result},
        inode::{Inode, InodeTable},
        layout::Layout,
    },
};

/// Device plus the allocation and inode-table views laid over it.
#[derive(Debug)]
pub struct Volume<D> {
    io: SectorIo<D>,
    layout: Layout,
    sector_map: Bitmap,
    inode_map: Bitmap,
    table: InodeTable,
}

impl<D: BlockDevice> Volume<D> {
    pub fn new(disk: D, max_retries: u32) -> Result<Self> {
        let layout = Layout::for_geometry(disk.geometry())?;
        Ok(Self {
            io: SectorIo::new(disk, max_retries),
            layout,
            sector_map: Bitmap::new(
                layout.sector_bitmap_start(),
                layout.sector_bitmap_sectors,
                layout.total_sectors,
            ),
            inode_map: Bitmap::new(
                layout.inode_bitmap_start(),
                layout.inode_bitmap_sectors,
                layout.inode_capacity(),
            ),
            table: InodeTable::new(layout),
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn disk(&self) -> &D {
        self.io.disk()
    }

    pub fn into_disk(self) -> D {
        self.io.into_inner()
    }

    /// Zero every metadata sector and reserve them in the sector bitmap.
    pub fn format_regions(&self) -> Result<()> {
        let metadata = self.layout.metadata_sectors();
        let zero = self.io.geometry().empty_sector();
        for sector in 0..metadata {
            self.io.write(sector, &zero)?;
        }
        self.sector_map.set_range(&self.io, 0..metadata)?;
        info!(
            sector_bitmap = self.layout.sector_bitmap_sectors,
            inode_bitmap = self.layout.inode_bitmap_sectors,
            inode_table = self.layout.inode_table_sectors,
            inodes = self.layout.inode_capacity(),
            "metadata regions formatted"
        );
        Ok(())
    }

    pub fn read_sector(&self, sector: u32) -> Result<Vec<u8>> {
        self.io.read(sector)
    }

    pub fn write_sector(&self, sector: u32, buf: &[u8]) -> Result<()> {
        self.io.write(sector, buf)
    }

    // 分配一个数据扇区，没有空闲扇区时返回 DiskFull
    pub fn alloc_sector(&self) -> Result<u32> {
        let sector = self
            .sector_map
            .alloc(&self.io)?
            .ok_or(FileSystemError::DiskFull)?;
        debug!(sector, "sector allocated");
        Ok(sector)
    }

    pub fn free_sector(&self, sector: u32) -> Result<()> {
        if sector < self.layout.data_start() || sector >= self.layout.total_sectors {
            return Err(FileSystemError::Corrupted(format!(
                "sector {sector} is not in the data area"
            )));
        }
        self.sector_map.clear(&self.io, sector)?;
        debug!(sector, "sector freed");
        Ok(())
    }

    // 分配一个 inode，没有空闲时返回 InodeFull
    pub fn alloc_inode(&self) -> Result<u32> {
        let inode = self
            .inode_map
            .alloc(&self.io)?
            .ok_or(FileSystemError::InodeFull)?;
        debug!(inode, "inode allocated");
        Ok(inode)
    }

    pub fn free_inode(&self, inode: u32) -> Result<()> {
        if inode >= self.inode_map.capacity() {
            return Err(FileSystemError::InvalidInode(inode));
        }
        self.inode_map.clear(&self.io, inode)?;
        debug!(inode, "inode freed");
        Ok(())
    }

    /// Undo an allocation on an error path. The original error is what the
    /// caller reports, so a failure here is only logged.
    pub fn release_inode(&self, inode: u32) {
        if let Err(e) = self.free_inode(inode) {
            warn!(inode, error = %e, "could not release inode after a failed operation");
        }
    }

    // 同上，针对数据扇区
    pub fn release_sector(&self, sector: u32) {
        if let Err(e) = self.free_sector(sector) {
            warn!(sector, error = %e, "could not release sector after a failed operation");
        }
    }

    pub fn inode_allocated(&self, inode: u32) -> Result<bool> {
        if inode >= self.inode_map.capacity() {
            return Ok(false);
        }
        self.inode_map.is_set(&self.io, inode)
    }

    pub fn load(&self, inode: u32) -> Result<Inode> {
        self.table.load(&self.io, inode)
    }

    pub fn save(&self, inode: &Inode) -> Result<()> {
        self.table.save(&self.io, inode)
    }

    // 空闲扇区数 = 总扇区数 - 已置位的位数
    pub fn free_sectors(&self) -> Result<u32> {
        Ok(self.layout.total_sectors - self.sector_map.count_set(&self.io)?)
    }

    pub fn free_inodes(&self) -> Result<u32> {
        Ok(self.inode_map.capacity() - self.inode_map.count_set(&self.io)?)
    }
}
