use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    disk::BlockDevice,
    fs::{
        config::{NAME_LEN, NONE, SLOT_COUNT},
        device::SectorIo,
        error::{FileSystemError, Result},
        layout::Layout,
    },
};

/// Six inline slots; unused ones hold [`NONE`].
pub type Slots = [u32; SLOT_COUNT];

const EMPTY_SLOTS: Slots = [NONE; SLOT_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InodeKind {
    Directory { children: Slots },
    File { sectors: Slots, size: u32 },
}

/// One fixed-size record of the inode table.
///
/// A record whose six slots are not enough points at a `continuation`
/// record of the same kind; the chain reads as one longer slot array.
/// Continuation records have no name and no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inode {
    pub number: u32,
    pub parent: u32,
    pub continuation: u32,
    name: [u8; NAME_LEN],
    pub kind: InodeKind,
}

/// Check that `name` can be stored in a record.
pub fn validate_name(name: &str) -> Result<()> {
    if name.len() > NAME_LEN {
        return Err(FileSystemError::NameTooLong(name.to_string()));
    }
    let reserved = name.is_empty() || name == "." || name == "..";
    if reserved || name.contains(|c: char| c == '/' || c == '\0') {
        return Err(FileSystemError::InvalidPath(name.to_string()));
    }
    Ok(())
}

fn pack_name(name: &str) -> [u8; NAME_LEN] {
    let mut packed = [0; NAME_LEN];
    let len = name.len().min(NAME_LEN);
    packed[..len].copy_from_slice(&name.as_bytes()[..len]);
    packed
}

impl Inode {
    fn new(number: u32, parent: u32, name: &str, kind: InodeKind) -> Self {
        Self {
            number,
            parent,
            continuation: NONE,
            name: pack_name(name),
            kind,
        }
    }

    pub fn root(number: u32) -> Self {
        Self::new(number, NONE, "", InodeKind::Directory { children: EMPTY_SLOTS })
    }

    pub fn directory(number: u32, parent: u32, name: &str) -> Result<Self> {
        validate_name(name)?;
        Ok(Self::new(
            number,
            parent,
            name,
            InodeKind::Directory { children: EMPTY_SLOTS },
        ))
    }

    pub fn file(number: u32, parent: u32, name: &str) -> Result<Self> {
        validate_name(name)?;
        Ok(Self::new(
            number,
            parent,
            name,
            InodeKind::File {
                sectors: EMPTY_SLOTS,
                size: 0,
            },
        ))
    }

    /// An empty overflow record of the same kind as `self`.
    pub fn continuation_record(&self, number: u32) -> Self {
        let kind = match self.kind {
            InodeKind::Directory { .. } => InodeKind::Directory { children: EMPTY_SLOTS },
            InodeKind::File { .. } => InodeKind::File {
                sectors: EMPTY_SLOTS,
                size: 0,
            },
        };
        Self::new(number, NONE, "", kind)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, InodeKind::File { .. })
    }

    pub fn is_dir(&self) -> bool {
        !self.is_file()
    }

    pub fn name(&self) -> String {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..len]).into_owned()
    }

    /// Exact, case-sensitive comparison against the stored name.
    pub fn name_matches(&self, name: &str) -> bool {
        name.len() <= NAME_LEN && self.name == pack_name(name)
    }

    pub fn next(&self) -> Option<u32> {
        (self.continuation != NONE).then_some(self.continuation)
    }

    pub fn parent(&self) -> Option<u32> {
        (self.parent != NONE).then_some(self.parent)
    }

    pub fn slots(&self) -> &Slots {
        match &self.kind {
            InodeKind::Directory { children } => children,
            InodeKind::File { sectors, .. } => sectors,
        }
    }

    pub fn slots_mut(&mut self) -> &mut Slots {
        match &mut self.kind {
            InodeKind::Directory { children } => children,
            InodeKind::File { sectors, .. } => sectors,
        }
    }

    /// File size in bytes; always 0 for directories.
    pub fn size(&self) -> u32 {
        match self.kind {
            InodeKind::File { size, .. } => size,
            InodeKind::Directory { .. } => 0,
        }
    }

    pub fn set_size(&mut self, new_size: u32) {
        if let InodeKind::File { size, .. } = &mut self.kind {
            *size = new_size;
        }
    }

    /// Bytes one record occupies in the inode table.
    pub fn record_size() -> usize {
        static SIZE: OnceLock<usize> = OnceLock::new();
        *SIZE.get_or_init(|| {
            let dir = Self::root(0);
            let mut file = Self::root(0);
            file.kind = InodeKind::File {
                sectors: EMPTY_SLOTS,
                size: 0,
            };
            let dir_len = bincode::serialized_size(&dir).unwrap_or(0);
            let file_len = bincode::serialized_size(&file).unwrap_or(0);
            dir_len.max(file_len) as usize
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Maps inode numbers onto the inode table region.
#[derive(Debug, Clone, Copy)]
pub struct InodeTable {
    layout: Layout,
}

impl InodeTable {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    fn check(&self, number: u32) -> Result<()> {
        if number >= self.layout.inode_capacity() {
            return Err(FileSystemError::InvalidInode(number));
        }
        Ok(())
    }

    /// Read an owned copy of inode `number`.
    pub fn load<D: BlockDevice>(&self, io: &SectorIo<D>, number: u32) -> Result<Inode> {
        self.check(number)?;
        let (sector, offset) = self.layout.inode_location(number);
        let buf = io.read(sector)?;
        let inode = Inode::decode(&buf[offset..offset + self.layout.inode_size])?;
        if inode.number != number {
            return Err(FileSystemError::Corrupted(format!(
                "slot of inode {number} holds record {}",
                inode.number
            )));
        }
        Ok(inode)
    }

    /// Rewrite only this inode's bytes; neighbours sharing the sector survive.
    pub fn save<D: BlockDevice>(&self, io: &SectorIo<D>, inode: &Inode) -> Result<()> {
        self.check(inode.number)?;
        let (sector, offset) = self.layout.inode_location(inode.number);
        let bytes = inode.encode()?;
        let mut buf = io.read(sector)?;
        let slot = &mut buf[offset..offset + self.layout.inode_size];
        slot.fill(0);
        slot[..bytes.len()].copy_from_slice(&bytes);
        io.write(sector, &buf)?;
        trace!(inode = inode.number, sector, offset, "inode saved");
        Ok(())
    }
}
