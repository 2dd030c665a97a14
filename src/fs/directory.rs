use std::fmt;

use crate::{
    disk::BlockDevice,
    fs::{
        error::Result,
        inode::Inode,
        slot_list::{Children, DataSectors, SlotList},
        volume::Volume,
    },
};

// 目录项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// What `stat` reports about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub inode: u32,
    pub name: String,
    pub kind: EntryKind,
    /// Bytes for files, 0 for directories.
    pub size: u32,
    /// Data sectors for files, child entries for directories.
    pub slots_used: u32,
}

impl Metadata {
    pub fn of<D: BlockDevice>(volume: &Volume<D>, inode: Inode) -> Result<Self> {
        let (kind, slots_used) = if inode.is_file() {
            let list = SlotList::<D, DataSectors>::new(volume, inode.clone())?;
            (EntryKind::File, list.entries()?.len())
        } else {
            let list = SlotList::<D, Children>::new(volume, inode.clone())?;
            (EntryKind::Directory, list.entries()?.len())
        };
        Ok(Self {
            inode: inode.number,
            name: inode.name(),
            kind,
            size: inode.size(),
            slots_used: slots_used as u32,
        })
    }
}

/// First child of `dir` named `name`, if any.
pub fn lookup<D: BlockDevice>(volume: &Volume<D>, dir: &Inode, name: &str) -> Result<Option<Inode>> {
    let children = SlotList::<D, Children>::new(volume, dir.clone())?;
    let mut found = None;
    children.find(|number| {
        let child = volume.load(number)?;
        if child.name_matches(name) {
            found = Some(child);
            return Ok(true);
        }
        Ok(false)
    })?;
    Ok(found)
}

/// Names of every child, in slot order then chain order.
pub fn names<D: BlockDevice>(volume: &Volume<D>, dir: &Inode) -> Result<Vec<String>> {
    let children = SlotList::<D, Children>::new(volume, dir.clone())?;
    children
        .entries()?
        .into_iter()
        .map(|number| volume.load(number).map(|child| child.name()))
        .collect()
}

/// Record `child` (already saved) under `dir`. Returns the updated `dir`.
pub fn link<D: BlockDevice>(volume: &Volume<D>, dir: Inode, child: u32) -> Result<Inode> {
    let mut children = SlotList::<D, Children>::new(volume, dir)?;
    children.append(child)?;
    Ok(children.into_head())
}

/// Save a freshly allocated `child` and link it under `dir`.
///
/// 失败时归还 child 的 inode，不留下无人引用的记录
pub fn adopt<D: BlockDevice>(volume: &Volume<D>, dir: Inode, child: &Inode) -> Result<()> {
    let linked = volume
        .save(child)
        .and_then(|()| link(volume, dir, child.number).map(|_| ()));
    if let Err(e) = linked {
        volume.release_inode(child.number);
        return Err(e);
    }
    Ok(())
}

pub fn unlink<D: BlockDevice>(volume: &Volume<D>, dir: Inode, child: u32) -> Result<bool> {
    let mut children = SlotList::<D, Children>::new(volume, dir)?;
    children.remove(child)
}

pub fn is_empty<D: BlockDevice>(volume: &Volume<D>, dir: &Inode) -> Result<bool> {
    let children = SlotList::<D, Children>::new(volume, dir.clone())?;
    Ok(children.find(|_| Ok(true))?.is_none())
}
