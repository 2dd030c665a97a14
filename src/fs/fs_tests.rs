use super::config::{FsOptions, ROOT_INODE};
use super::directory::EntryKind;
use super::error::FileSystemError;
use super::test_util::{
    fill_inodes, mem_fs, mem_fs_with, read_file, write_file, SECTOR_SIZE, TOTAL_SECTORS,
};
use super::FileSystem;
use crate::disk::{Geometry, MemDisk};

#[test]
fn format_reserves_metadata_and_root() {
    let fs = mem_fs();
    let layout = *fs.layout();

    assert_eq!(fs.cwd(), ROOT_INODE);
    assert_eq!(fs.free_sectors().unwrap(), TOTAL_SECTORS - layout.data_start());
    assert_eq!(fs.free_inodes().unwrap(), layout.inode_capacity() - 1);
    assert!(fs.list().unwrap().is_empty());
    assert_eq!(fs.pwd().unwrap(), "/");
}

#[test]
fn mkdir_and_list_in_creation_order() {
    let mut fs = mem_fs();
    fs.mkdir("bin").unwrap();
    fs.mkdir("/etc").unwrap();
    write_file(&mut fs, "readme", b"hi");

    assert_eq!(fs.list().unwrap(), vec!["bin", "etc", "readme"]);
    assert_eq!(fs.stat("etc").unwrap().kind, EntryKind::Directory);
    assert_eq!(fs.stat("readme").unwrap().kind, EntryKind::File);
}

#[test]
fn mkdir_rejects_duplicates_and_bad_names() {
    let mut fs = mem_fs();
    fs.mkdir("a").unwrap();
    assert!(matches!(fs.mkdir("a"), Err(FileSystemError::AlreadyExists(_))));
    assert!(matches!(fs.mkdir("/"), Err(FileSystemError::InvalidPath(_))));
    assert!(matches!(fs.mkdir("a/.."), Err(FileSystemError::InvalidPath(_))));
    assert!(matches!(
        fs.mkdir("a-name-that-is-too-long"),
        Err(FileSystemError::NameTooLong(_))
    ));
}

#[test]
fn seventh_child_spills_into_a_continuation_record() {
    let mut fs = mem_fs();
    let inodes_before = fs.free_inodes().unwrap();
    let names: Vec<String> = (1..=7).map(|i| format!("file{i}")).collect();
    for name in &names {
        write_file(&mut fs, name, name.as_bytes());
    }

    // seven files plus one continuation record
    assert_eq!(fs.free_inodes().unwrap(), inodes_before - 8);
    assert_eq!(fs.list().unwrap(), names);
    assert_eq!(fs.stat("/").unwrap().slots_used, 7);
    assert_eq!(read_file(&mut fs, "file7"), b"file7");
}

#[test]
fn many_children_chain_across_several_records() {
    let mut fs = mem_fs();
    fs.mkdir("d").unwrap();
    let names: Vec<String> = (0..20).map(|i| format!("n{i:02}")).collect();
    for name in &names {
        fs.mkdir(&format!("d/{name}")).unwrap();
    }
    assert_eq!(fs.list_path("d").unwrap(), names);
    assert!(fs.resolve("/d/n19").is_ok());
}

#[test]
fn cd_dot_dot_returns_to_root() {
    let mut fs = mem_fs();
    fs.mkdir("home").unwrap();
    fs.mkdir("tmp").unwrap();
    fs.mkdir("home/user").unwrap();

    fs.change_directory("home").unwrap();
    assert_eq!(fs.list().unwrap(), vec!["user"]);
    assert_eq!(fs.pwd().unwrap(), "/home");

    fs.change_directory("..").unwrap();
    assert_eq!(fs.cwd(), ROOT_INODE);
    assert_eq!(fs.list().unwrap(), vec!["home", "tmp"]);
    assert!(matches!(
        fs.change_directory(".."),
        Err(FileSystemError::NoParent)
    ));
}

#[test]
fn cd_follows_nested_paths_and_empty_goes_home() {
    let mut fs = mem_fs();
    fs.mkdir("a").unwrap();
    fs.mkdir("a/b").unwrap();
    fs.mkdir("a/b/c").unwrap();

    fs.change_directory("/a/b/c").unwrap();
    assert_eq!(fs.pwd().unwrap(), "/a/b/c");
    fs.change_directory("../..").unwrap();
    assert_eq!(fs.pwd().unwrap(), "/a");
    fs.change_directory("").unwrap();
    assert_eq!(fs.cwd(), ROOT_INODE);
    fs.change_directory("a/b").unwrap();
    fs.change_directory("/").unwrap();
    assert_eq!(fs.cwd(), ROOT_INODE);
}

#[test]
fn cd_into_a_file_fails() {
    let mut fs = mem_fs();
    write_file(&mut fs, "f", b"1");
    assert!(matches!(
        fs.change_directory("f"),
        Err(FileSystemError::NotADirectory(_))
    ));
    assert_eq!(fs.cwd(), ROOT_INODE);
}

#[test]
fn remove_releases_sectors_inodes_and_the_slot() {
    let mut fs = mem_fs();
    let sectors_before = fs.free_sectors().unwrap();
    let inodes_before = fs.free_inodes().unwrap();

    write_file(&mut fs, "big", &vec![0xAB; 7 * SECTOR_SIZE]);
    assert_eq!(fs.free_sectors().unwrap(), sectors_before - 7);
    assert_eq!(fs.free_inodes().unwrap(), inodes_before - 2);

    fs.remove("big").unwrap();
    assert_eq!(fs.free_sectors().unwrap(), sectors_before);
    assert_eq!(fs.free_inodes().unwrap(), inodes_before);
    assert!(fs.list().unwrap().is_empty());
    assert!(matches!(fs.resolve("big"), Err(FileSystemError::NotFound(_))));
}

#[test]
fn remove_refuses_busy_and_non_empty_targets() {
    let mut fs = mem_fs();
    fs.mkdir("dir").unwrap();
    write_file(&mut fs, "dir/inner", b"x");

    assert!(matches!(
        fs.remove("dir"),
        Err(FileSystemError::DirectoryNotEmpty(_))
    ));
    assert!(matches!(fs.remove("/"), Err(FileSystemError::Busy(_))));

    let fd = fs.open("dir/inner").unwrap();
    assert!(matches!(fs.remove("dir/inner"), Err(FileSystemError::Busy(_))));
    fs.close(fd).unwrap();
    fs.remove("dir/inner").unwrap();

    fs.change_directory("dir").unwrap();
    assert!(matches!(fs.remove("/dir"), Err(FileSystemError::Busy(_))));
    fs.change_directory("/").unwrap();
    fs.remove("dir").unwrap();
    assert!(fs.list().unwrap().is_empty());
}

#[test]
fn removed_slots_are_refilled() {
    let mut fs = mem_fs();
    for name in ["a", "b", "c"] {
        fs.mkdir(name).unwrap();
    }
    fs.remove("b").unwrap();
    fs.mkdir("d").unwrap();
    assert_eq!(fs.list().unwrap(), vec!["a", "d", "c"]);
}

#[test]
fn unmount_then_mount_keeps_everything() {
    let mut fs = mem_fs();
    fs.mkdir("docs").unwrap();
    write_file(&mut fs, "docs/plan", b"ship it");
    let open = fs.open("docs/draft").unwrap();
    fs.write(open, b"unsaved until unmount").unwrap();

    let disk = fs.unmount().unwrap();
    let mut fs = FileSystem::mount(disk, FsOptions::default()).unwrap();

    assert_eq!(fs.cwd(), ROOT_INODE);
    assert_eq!(fs.list().unwrap(), vec!["docs"]);
    assert_eq!(fs.list_path("docs").unwrap(), vec!["plan", "draft"]);
    assert_eq!(read_file(&mut fs, "docs/plan"), b"ship it");
    assert_eq!(read_file(&mut fs, "docs/draft"), b"unsaved until unmount");
}

#[test]
fn mounting_a_blank_disk_fails() {
    let disk = MemDisk::new(Geometry::new(TOTAL_SECTORS, SECTOR_SIZE));
    assert!(matches!(
        FileSystem::mount(disk, FsOptions::default()),
        Err(FileSystemError::Unformatted)
    ));
}

#[test]
fn reformat_wipes_the_volume() {
    let mut fs = mem_fs();
    fs.mkdir("old").unwrap();
    fs.change_directory("old").unwrap();
    let fd = fs.open("x").unwrap();

    fs.reformat().unwrap();
    assert_eq!(fs.cwd(), ROOT_INODE);
    assert!(fs.list().unwrap().is_empty());
    assert!(matches!(fs.read(fd, 1), Err(FileSystemError::BadDescriptor(_))));
}

#[test]
fn tiny_volume_runs_out_of_sectors() {
    // 64 x 64-byte sectors leave two data sectors
    let mut fs = mem_fs_with(Geometry::new(64, 64));
    assert_eq!(fs.free_sectors().unwrap(), 2);

    let fd = fs.open("f").unwrap();
    fs.write(fd, &[1u8; 3 * 64]).unwrap();
    assert!(matches!(fs.close(fd), Err(FileSystemError::DiskFull)));

    // the two sectors that fit are linked into the file, none is lost
    assert_eq!(fs.free_sectors().unwrap(), 0);
    assert_eq!(fs.stat("f").unwrap().slots_used, 2);
    assert_eq!(fs.open_files().ids(), vec![fd]);
}

#[test]
fn inode_table_exhaustion_is_reported() {
    let mut fs = mem_fs_with(Geometry::new(64, 64));
    let capacity = fs.layout().inode_capacity();

    let mut failure = None;
    for i in 0..=capacity {
        if let Err(e) = fs.mkdir(&format!("d{i}")) {
            failure = Some(e);
            break;
        }
    }
    assert!(matches!(failure, Some(FileSystemError::InodeFull)));

    // every allocated inode is the root, a child, or a continuation of the root
    let children = fs.list().unwrap().len() as u32;
    let records = children.div_ceil(6);
    assert_eq!(fs.free_inodes().unwrap(), capacity - children - records);
}

#[test]
fn failed_spill_releases_the_new_inode() {
    let mut fs = mem_fs_with(Geometry::new(64, 64));
    fs.mkdir("d").unwrap();
    for i in 0..6 {
        fs.mkdir(&format!("d/c{i}")).unwrap();
    }
    fill_inodes(&mut fs, 1);
    assert_eq!(fs.free_inodes().unwrap(), 1);

    // the child takes the last inode, then its continuation record cannot
    assert!(matches!(fs.mkdir("d/seventh"), Err(FileSystemError::InodeFull)));
    assert_eq!(fs.free_inodes().unwrap(), 1);
    assert_eq!(fs.list_path("d").unwrap().len(), 6);
    assert!(matches!(
        fs.resolve("d/seventh"),
        Err(FileSystemError::NotFound(_))
    ));

    assert!(matches!(fs.open("d/file"), Err(FileSystemError::InodeFull)));
    assert_eq!(fs.free_inodes().unwrap(), 1);
    assert!(fs.open_files().is_empty());

    // the released inode is still usable where no spill is needed
    fs.mkdir("last").unwrap();
    assert_eq!(fs.free_inodes().unwrap(), 0);
}
