use std::marker::PhantomData;

use crate::{
    disk::BlockDevice,
    fs::{
        config::NONE,
        error::{FileSystemError, Result},
        inode::Inode,
        volume::Volume,
    },
};

/// What a slot list stores, and which inode kind may head it.
pub trait SlotKind {
    fn accepts(head: &Inode) -> Result<()>;
}

/// Child inode numbers of a directory.
#[derive(Debug)]
pub struct Children;

/// Data sector numbers of a file, in file order.
#[derive(Debug)]
pub struct DataSectors;

impl SlotKind for Children {
    fn accepts(head: &Inode) -> Result<()> {
        if head.is_dir() {
            Ok(())
        } else {
            Err(FileSystemError::NotADirectory(head.name()))
        }
    }
}

impl SlotKind for DataSectors {
    fn accepts(head: &Inode) -> Result<()> {
        if head.is_file() {
            Ok(())
        } else {
            Err(FileSystemError::IsADirectory(head.name()))
        }
    }
}

/// An unbounded list stored as the head record's six slots followed by the
/// slots of each continuation record, in chain order.
///
/// The list owns its copy of the head record; every change to it is saved
/// before the call returns.
#[derive(Debug)]
pub struct SlotList<'v, D, K> {
    volume: &'v Volume<D>,
    head: Inode,
    _kind: PhantomData<K>,
}

// 第一个空槽位的下标
fn free_slot(record: &Inode) -> Option<usize> {
    record.slots().iter().position(|&slot| slot == NONE)
}

impl<'v, D: BlockDevice, K: SlotKind> SlotList<'v, D, K> {
    pub fn new(volume: &'v Volume<D>, head: Inode) -> Result<Self> {
        K::accepts(&head)?;
        Ok(Self {
            volume,
            head,
            _kind: PhantomData,
        })
    }

    // 链表头记录
    pub fn head(&self) -> &Inode {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut Inode {
        &mut self.head
    }

    pub fn into_head(self) -> Inode {
        self.head
    }

    /// The head followed by every continuation record.
    pub fn records(&self) -> Result<Vec<Inode>> {
        let mut records = vec![self.head.clone()];
        let mut next = self.head.next();
        while let Some(number) = next {
            let record = self.volume.load(number)?;
            next = record.next();
            records.push(record);
        }
        Ok(records)
    }

    /// Every occupied slot, in slot order within a record and chain order
    /// across records.
    pub fn entries(&self) -> Result<Vec<u32>> {
        Ok(self
            .records()?
            .iter()
            .flat_map(|record| record.slots().iter().copied())
            .filter(|&slot| slot != NONE)
            .collect())
    }

    /// First occupied slot accepted by `pred`, stopping the chain walk early.
    pub fn find(&self, mut pred: impl FnMut(u32) -> Result<bool>) -> Result<Option<u32>> {
        let mut record = self.head.clone();
        loop {
            for &slot in record.slots() {
                if slot != NONE && pred(slot)? {
                    return Ok(Some(slot));
                }
            }
            match record.next() {
                Some(number) => record = self.volume.load(number)?,
                None => return Ok(None),
            }
        }
    }

    /// Store `value` in the first free slot, growing the chain by one
    /// continuation record when every slot is taken.
    ///
    /// A new continuation record is written in full before its owner is
    /// linked to it.
    pub fn append(&mut self, value: u32) -> Result<()> {
        if let Some(slot) = free_slot(&self.head) {
            self.head.slots_mut()[slot] = value;
            return self.volume.save(&self.head);
        }

        // 头记录已满，沿续接链向后找空位
        let mut owner = self.head.clone();
        loop {
            match owner.next() {
                Some(number) => {
                    let mut record = self.volume.load(number)?;
                    if let Some(slot) = free_slot(&record) {
                        record.slots_mut()[slot] = value;
                        return self.volume.save(&record);
                    }
                    owner = record;
                }
                None => {
                    let number = self.volume.alloc_inode()?;
                    let mut record = owner.continuation_record(number);
                    record.slots_mut()[0] = value;
                    owner.continuation = number;
                    // 先写续接记录，再让 owner 指向它；任一步失败都归还 inode
                    let linked = self
                        .volume
                        .save(&record)
                        .and_then(|()| self.volume.save(&owner));
                    if let Err(e) = linked {
                        self.volume.release_inode(number);
                        return Err(e);
                    }
                    if owner.number == self.head.number {
                        self.head.continuation = number;
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Clear the first slot holding `value`. Continuation records stay in
    /// the chain and are refilled by later appends.
    pub fn remove(&mut self, value: u32) -> Result<bool> {
        if let Some(slot) = self.head.slots().iter().position(|&s| s == value) {
            self.head.slots_mut()[slot] = NONE;
            self.volume.save(&self.head)?;
            return Ok(true);
        }

        let mut next = self.head.next();
        while let Some(number) = next {
            let mut record = self.volume.load(number)?;
            if let Some(slot) = record.slots().iter().position(|&s| s == value) {
                record.slots_mut()[slot] = NONE;
                self.volume.save(&record)?;
                return Ok(true);
            }
            next = record.next();
        }
        Ok(false)
    }

    /// Inode numbers of the continuation records, head excluded.
    pub fn continuations(&self) -> Result<Vec<u32>> {
        Ok(self
            .records()?
            .iter()
            .skip(1)
            .map(|record| record.number)
            .collect())
    }
}
