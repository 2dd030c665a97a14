//! Open-file layer.
//!
//! Opening a file copies its whole contents into memory; reads, writes and
//! seeks work on that copy and nothing reaches the disk until `close`, which
//! grows the sector chain as needed and writes the buffer back. Files must
//! therefore fit in memory, and writes made before `close` are not durable.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    disk::BlockDevice,
    fs::{
        config::NONE,
        directory,
        error::{FileSystemError, Result},
        inode::Inode,
        path::Resolver,
        slot_list::{DataSectors, SlotList},
        FileSystem,
    },
};

/// An open file: the inode as of `open`, a cursor, and the file's bytes.
#[derive(Debug)]
pub struct OpenFile {
    pub id: u32,
    pub inode: Inode,
    pub cursor: u32,
    /// Sector-sized chunks in chain order; at least `inode.size()` long.
    pub buffer: Vec<u8>,
}

/// Descriptor ids only ever increase, so a closed id is never handed out again.
#[derive(Debug, Default)]
pub struct FileTable {
    open: BTreeMap<u32, OpenFile>,
    next_id: u32,
}

impl FileTable {
    // 登记一个新打开的文件，返回描述符编号
    fn insert(&mut self, inode: Inode, buffer: Vec<u8>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.open.insert(
            id,
            OpenFile {
                id,
                inode,
                cursor: 0,
                buffer,
            },
        );
        id
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut OpenFile> {
        self.open
            .get_mut(&id)
            .ok_or(FileSystemError::BadDescriptor(id))
    }

    pub fn get(&self, id: u32) -> Option<&OpenFile> {
        self.open.get(&id)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.open.keys().copied().collect()
    }

    pub fn is_open(&self, inode: u32) -> bool {
        self.open.values().any(|file| file.inode.number == inode)
    }

    pub(crate) fn clear(&mut self) {
        self.open.clear();
    }
}

impl<D: BlockDevice> FileSystem<D> {
    /// Open `path`, creating an empty file when the name is free.
    pub fn open(&mut self, path: &str) -> Result<u32> {
        let resolver = Resolver::new(&self.volume, self.cwd);
        let (parent, name) = resolver.resolve_parent(path)?;

        let inode = match directory::lookup(&self.volume, &parent, name)? {
            Some(existing) if existing.is_dir() => {
                return Err(FileSystemError::IsADirectory(path.to_string()))
            }
            Some(existing) => existing,
            None => {
                let mut inode = Inode::file(NONE, parent.number, name)?;
                inode.number = self.volume.alloc_inode()?;
                directory::adopt(&self.volume, parent, &inode)?;
                debug!(path, inode = inode.number, "file created");
                inode
            }
        };

        // 把整条扇区链读进内存
        let sector_size = self.volume.layout().sector_size;
        let sectors = SlotList::<D, DataSectors>::new(&self.volume, inode.clone())?.entries()?;
        let mut buffer = Vec::with_capacity(sectors.len() * sector_size);
        for sector in sectors {
            buffer.extend_from_slice(&self.volume.read_sector(sector)?);
        }
        if buffer.len() < inode.size() as usize {
            return Err(FileSystemError::Corrupted(format!(
                "file {path} claims {} bytes but owns {} bytes of sectors",
                inode.size(),
                buffer.len()
            )));
        }

        let id = self.files.insert(inode, buffer);
        debug!(path, fd = id, "file opened");
        Ok(id)
    }

    /// Flush the descriptor's buffer to disk and forget it.
    ///
    /// Sectors missing from the chain are allocated and written before they
    /// are linked in; the head record (with the new size) is saved last.
    /// If the flush fails the descriptor stays open with its buffer intact,
    /// so the caller can free space and close again.
    pub fn close(&mut self, id: u32) -> Result<()> {
        let file = self
            .files
            .get(id)
            .ok_or(FileSystemError::BadDescriptor(id))?;
        self.flush(file)?;
        self.files.open.remove(&id);
        debug!(fd = id, "file closed");
        Ok(())
    }

    pub(crate) fn flush(&self, file: &OpenFile) -> Result<()> {
        let sector_size = self.volume.layout().sector_size;
        let size = file.inode.size() as usize;
        let needed = size.div_ceil(sector_size);

        // the head may have changed on disk since open (e.g. continuation links)
        let head = self.volume.load(file.inode.number)?;
        let mut sectors = SlotList::<D, DataSectors>::new(&self.volume, head)?;
        let existing = sectors.entries()?;

        let mut chunk = vec![0u8; sector_size];
        for index in 0..needed.max(existing.len()) {
            let start = index * sector_size;
            chunk.fill(0);
            if start < file.buffer.len() {
                let end = (start + sector_size).min(file.buffer.len());
                chunk[..end - start].copy_from_slice(&file.buffer[start..end]);
            }

            match existing.get(index) {
                Some(&sector) => self.volume.write_sector(sector, &chunk)?,
                None => {
                    let sector = self.volume.alloc_sector()?;
                    let linked = self
                        .volume
                        .write_sector(sector, &chunk)
                        .and_then(|()| sectors.append(sector));
                    if let Err(e) = linked {
                        // 扇区还没挂进链表，直接归还
                        self.volume.release_sector(sector);
                        return Err(e);
                    }
                }
            }
        }

        sectors.head_mut().set_size(file.inode.size());
        self.volume.save(sectors.head())?;
        Ok(())
    }

    // 从游标处读取最多 length 字节，并移动游标
    pub fn read(&mut self, id: u32, length: usize) -> Result<Vec<u8>> {
        let file = self.files.get_mut(id)?;
        let cursor = file.cursor as usize;
        let available = (file.inode.size() as usize).saturating_sub(cursor);
        let count = length.min(available);
        let bytes = file.buffer[cursor..cursor + count].to_vec();
        file.cursor += count as u32;
        Ok(bytes)
    }

    /// Copy `bytes` into the file at the cursor, growing the file if the
    /// write runs past its end. The cursor does not move.
    pub fn write(&mut self, id: u32, bytes: &[u8]) -> Result<usize> {
        let file = self.files.get_mut(id)?;
        let start = file.cursor as usize;
        let end = start + bytes.len();
        let end_u32 = u32::try_from(end).map_err(|_| FileSystemError::FileTooLarge)?;

        if end_u32 > file.inode.size() {
            file.inode.set_size(end_u32);
        }
        if end > file.buffer.len() {
            file.buffer.resize(end, 0);
        }
        file.buffer[start..end].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Move the cursor; only positions inside the file are accepted.
    pub fn seek(&mut self, id: u32, position: u32) -> Result<u32> {
        let file = self.files.get_mut(id)?;
        let size = file.inode.size();
        if position >= size {
            return Err(FileSystemError::InvalidSeek { position, size });
        }
        file.cursor = position;
        Ok(position)
    }

    pub fn open_files(&self) -> &FileTable {
        &self.files
    }
}
