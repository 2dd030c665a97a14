use tracing::{debug, info};

use crate::{
    disk::BlockDevice,
    fs::{
        config::{FsOptions, NONE, ROOT_INODE},
        directory::Metadata,
        error::{FileSystemError, Result},
        file_table::FileTable,
        inode::Inode,
        layout::Layout,
        path::Resolver,
        slot_list::{Children, DataSectors, SlotList},
        volume::Volume,
    },
};

pub mod bitmap;
pub mod config;
pub mod device;
pub mod directory;
pub mod error;
pub mod file_table;
pub mod inode;
pub mod layout;
pub mod path;
pub mod slot_list;
pub mod volume;

#[cfg(test)]
mod file_table_tests;
#[cfg(test)]
mod fs_tests;
#[cfg(test)]
mod test_util;

/// A mounted volume: the device, the working directory and the open files.
///
/// Every operation goes through `&mut self`, so one volume serves one caller
/// at a time; wrap it in a mutex to share it.
#[derive(Debug)]
pub struct FileSystem<D> {
    volume: Volume<D>,
    cwd: u32,
    files: FileTable,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Lay a fresh, empty file system over `disk`.
    pub fn format(disk: D, options: FsOptions) -> Result<Self> {
        let mut fs = Self {
            volume: Volume::new(disk, options.max_retries)?,
            cwd: ROOT_INODE,
            files: FileTable::default(),
        };
        fs.reformat()?;
        Ok(fs)
    }

    /// Pick up the file system already on `disk`.
    pub fn mount(disk: D, options: FsOptions) -> Result<Self> {
        let volume = Volume::new(disk, options.max_retries)?;
        if !volume.inode_allocated(ROOT_INODE)? {
            return Err(FileSystemError::Unformatted);
        }
        let root = volume.load(ROOT_INODE).map_err(|e| match e {
            FileSystemError::Corrupted(_) => FileSystemError::Unformatted,
            other => other,
        })?;
        if root.is_file() || root.parent().is_some() {
            return Err(FileSystemError::Unformatted);
        }
        info!(
            sectors = volume.layout().total_sectors,
            sector_size = volume.layout().sector_size,
            "volume mounted"
        );
        Ok(Self {
            volume,
            cwd: ROOT_INODE,
            files: FileTable::default(),
        })
    }

    /// Wipe the volume in place. Open descriptors are dropped unflushed.
    pub fn reformat(&mut self) -> Result<()> {
        self.files.clear();
        self.volume.format_regions()?;
        let root = self.volume.alloc_inode()?;
        self.volume.save(&Inode::root(root))?;
        self.cwd = root;
        info!(root, "volume formatted");
        Ok(())
    }

    /// Flush every open descriptor and hand the device back.
    pub fn unmount(mut self) -> Result<D> {
        for id in self.files.ids() {
            self.close(id)?;
        }
        Ok(self.volume.into_disk())
    }

    pub fn layout(&self) -> &Layout {
        self.volume.layout()
    }

    pub fn disk(&self) -> &D {
        self.volume.disk()
    }

    /// Inode number of the working directory.
    pub fn cwd(&self) -> u32 {
        self.cwd
    }

    fn resolver(&self) -> Resolver<'_, D> {
        Resolver::new(&self.volume, self.cwd)
    }

    /// Inode number `path` resolves to.
    pub fn resolve(&self, path: &str) -> Result<u32> {
        Ok(self.resolver().resolve(path)?.number)
    }

    pub fn mkdir(&mut self, path: &str) -> Result<u32> {
        let (parent, name) = self.resolver().resolve_parent(path)?;
        if directory::lookup(&self.volume, &parent, name)?.is_some() {
            return Err(FileSystemError::AlreadyExists(path.to_string()));
        }

        let mut dir = Inode::directory(NONE, parent.number, name)?;
        dir.number = self.volume.alloc_inode()?;
        directory::adopt(&self.volume, parent, &dir)?;
        debug!(path, inode = dir.number, "directory created");
        Ok(dir.number)
    }

    /// `cd`; "" and "/" go to the root.
    pub fn change_directory(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            self.cwd = ROOT_INODE;
            return Ok(());
        }
        let target = self.resolver().resolve(path)?;
        if target.is_file() {
            return Err(FileSystemError::NotADirectory(path.to_string()));
        }
        self.cwd = target.number;
        debug!(path, cwd = self.cwd, "working directory changed");
        Ok(())
    }

    /// Names in the working directory, in storage order.
    pub fn list(&self) -> Result<Vec<String>> {
        let cwd = self.volume.load(self.cwd)?;
        directory::names(&self.volume, &cwd)
    }

    pub fn list_path(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.resolver().resolve(path)?;
        if dir.is_file() {
            return Err(FileSystemError::NotADirectory(path.to_string()));
        }
        directory::names(&self.volume, &dir)
    }

    /// Absolute path of the working directory.
    pub fn pwd(&self) -> Result<String> {
        let mut parts = Vec::new();
        let mut current = self.volume.load(self.cwd)?;
        while let Some(parent) = current.parent() {
            parts.push(current.name());
            current = self.volume.load(parent)?;
        }
        parts.reverse();
        Ok(format!("/{}", parts.join("/")))
    }

    pub fn stat(&self, path: &str) -> Result<Metadata> {
        let inode = self.resolver().resolve(path)?;
        Metadata::of(&self.volume, inode)
    }

    /// Delete a file or an empty directory, releasing its inode, its
    /// continuation records and (for files) its data sectors.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let target = self.resolver().resolve(path)?;
        let parent = target
            .parent()
            .ok_or_else(|| FileSystemError::Busy(path.to_string()))?;
        if target.number == self.cwd {
            return Err(FileSystemError::Busy(path.to_string()));
        }

        let (sectors, continuations) = if target.is_file() {
            if self.files.is_open(target.number) {
                return Err(FileSystemError::Busy(path.to_string()));
            }
            let list = SlotList::<D, DataSectors>::new(&self.volume, target.clone())?;
            (list.entries()?, list.continuations()?)
        } else {
            if !directory::is_empty(&self.volume, &target)? {
                return Err(FileSystemError::DirectoryNotEmpty(path.to_string()));
            }
            let list = SlotList::<D, Children>::new(&self.volume, target.clone())?;
            (Vec::new(), list.continuations()?)
        };

        let parent = self.volume.load(parent)?;
        if !directory::unlink(&self.volume, parent, target.number)? {
            return Err(FileSystemError::Corrupted(format!(
                "{path} is missing from its parent directory"
            )));
        }
        for sector in sectors {
            self.volume.free_sector(sector)?;
        }
        for record in continuations {
            self.volume.free_inode(record)?;
        }
        self.volume.free_inode(target.number)?;
        debug!(path, inode = target.number, "removed");
        Ok(())
    }

    pub fn free_sectors(&self) -> Result<u32> {
        self.volume.free_sectors()
    }

    pub fn free_inodes(&self) -> Result<u32> {
        self.volume.free_inodes()
    }
}
