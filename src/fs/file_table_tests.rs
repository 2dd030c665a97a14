use rand::RngCore;

use super::config::FsOptions;
use super::error::FileSystemError;
use super::test_util::{fill_inodes, mem_fs, mem_fs_with, read_file, write_file, SECTOR_SIZE};
use super::FileSystem;
use crate::disk::Geometry;

#[test]
fn write_close_reopen_read() {
    let mut fs = mem_fs();
    write_file(&mut fs, "hello.txt", b"hello, sectors");

    let fd = fs.open("hello.txt").unwrap();
    assert_eq!(fs.read(fd, 5).unwrap(), b"hello");
    assert_eq!(fs.read(fd, 100).unwrap(), b", sectors");
    assert!(fs.read(fd, 1).unwrap().is_empty());
    fs.close(fd).unwrap();

    assert_eq!(fs.stat("hello.txt").unwrap().size, 14);
}

#[test]
fn random_contents_survive_a_round_trip() {
    let mut fs = mem_fs();
    let mut bytes = vec![0u8; 5 * SECTOR_SIZE + 123];
    rand::rng().fill_bytes(&mut bytes);

    write_file(&mut fs, "noise", &bytes);
    assert_eq!(read_file(&mut fs, "noise"), bytes);
    assert_eq!(fs.stat("noise").unwrap().slots_used, 6);
}

#[test]
fn large_file_grows_a_sector_continuation() {
    let mut fs = mem_fs();
    let bytes: Vec<u8> = (0..7 * SECTOR_SIZE).map(|i| (i % 251) as u8).collect();
    let sectors_before = fs.free_sectors().unwrap();
    write_file(&mut fs, "big", &bytes);

    let meta = fs.stat("big").unwrap();
    assert_eq!(meta.size as usize, bytes.len());
    assert_eq!(meta.slots_used, 7);
    assert_eq!(fs.free_sectors().unwrap(), sectors_before - 7);

    let disk = fs.unmount().unwrap();
    let mut fs = FileSystem::mount(disk, FsOptions::default()).unwrap();
    assert_eq!(read_file(&mut fs, "big"), bytes);
}

#[test]
fn write_leaves_the_cursor_in_place() {
    let mut fs = mem_fs();
    let fd = fs.open("f").unwrap();
    assert_eq!(fs.write(fd, b"abc").unwrap(), 3);
    assert_eq!(fs.read(fd, 3).unwrap(), b"abc");

    fs.seek(fd, 0).unwrap();
    fs.write(fd, b"xy").unwrap();
    assert_eq!(fs.read(fd, 10).unwrap(), b"xyc");
    fs.close(fd).unwrap();
    assert_eq!(read_file(&mut fs, "f"), b"xyc");
}

#[test]
fn seek_stays_inside_the_file() {
    let mut fs = mem_fs();
    write_file(&mut fs, "digits", b"0123456789");

    let fd = fs.open("digits").unwrap();
    assert_eq!(fs.seek(fd, 4).unwrap(), 4);
    assert_eq!(fs.read(fd, 3).unwrap(), b"456");
    assert!(matches!(
        fs.seek(fd, 10),
        Err(FileSystemError::InvalidSeek {
            position: 10,
            size: 10
        })
    ));
    fs.close(fd).unwrap();

    let empty = fs.open("empty").unwrap();
    assert!(matches!(
        fs.seek(empty, 0),
        Err(FileSystemError::InvalidSeek { .. })
    ));
}

#[test]
fn writing_past_the_end_extends_the_file() {
    let mut fs = mem_fs();
    write_file(&mut fs, "log", &[b'a'; 100]);

    let fd = fs.open("log").unwrap();
    fs.seek(fd, 99).unwrap();
    fs.write(fd, &[b'b'; 1000]).unwrap();
    fs.close(fd).unwrap();

    let bytes = read_file(&mut fs, "log");
    assert_eq!(bytes.len(), 1099);
    assert!(bytes[..99].iter().all(|&b| b == b'a'));
    assert!(bytes[99..].iter().all(|&b| b == b'b'));
    assert_eq!(fs.stat("log").unwrap().slots_used, 3);
}

#[test]
fn closed_descriptors_are_gone_for_good() {
    let mut fs = mem_fs();
    let first = fs.open("a").unwrap();
    fs.close(first).unwrap();
    let second = fs.open("a").unwrap();
    let third = fs.open("b").unwrap();

    assert!(second > first);
    assert!(third > second);
    assert!(matches!(fs.read(first, 1), Err(FileSystemError::BadDescriptor(id)) if id == first));
    assert!(matches!(fs.close(first), Err(FileSystemError::BadDescriptor(_))));
    assert!(matches!(fs.write(99, b"x"), Err(FileSystemError::BadDescriptor(99))));

    assert_eq!(fs.open_files().len(), 2);
    assert_eq!(fs.open_files().ids(), vec![second, third]);
    fs.close(second).unwrap();
    fs.close(third).unwrap();
    assert!(fs.open_files().is_empty());
}

#[test]
fn open_checks_the_path() {
    let mut fs = mem_fs();
    fs.mkdir("dir").unwrap();
    write_file(&mut fs, "plain", b"1");

    assert!(matches!(fs.open("dir"), Err(FileSystemError::IsADirectory(_))));
    assert!(matches!(fs.open("missing/f"), Err(FileSystemError::NotFound(_))));
    assert!(matches!(fs.open("plain/f"), Err(FileSystemError::NotADirectory(_))));
    assert!(matches!(fs.open("/"), Err(FileSystemError::InvalidPath(_))));

    let fd = fs.open("dir/inside").unwrap();
    fs.close(fd).unwrap();
    assert_eq!(fs.list_path("/dir").unwrap(), vec!["inside"]);
}

#[test]
fn creating_a_file_does_not_touch_data_sectors() {
    let mut fs = mem_fs();
    let sectors = fs.free_sectors().unwrap();
    let fd = fs.open("empty").unwrap();
    fs.close(fd).unwrap();
    assert_eq!(fs.free_sectors().unwrap(), sectors);
    assert_eq!(fs.stat("empty").unwrap().size, 0);
}

#[test]
fn failed_close_keeps_the_descriptor_for_a_retry() {
    // two data sectors of 64 bytes
    let mut fs = mem_fs_with(Geometry::new(64, 64));
    write_file(&mut fs, "a", &[1u8; 64]);

    let data: Vec<u8> = (0..128).map(|i| i as u8).collect();
    let fd = fs.open("b").unwrap();
    fs.write(fd, &data).unwrap();
    assert!(matches!(fs.close(fd), Err(FileSystemError::DiskFull)));

    assert_eq!(fs.free_sectors().unwrap(), 0);
    assert_eq!(fs.open_files().ids(), vec![fd]);
    assert_eq!(fs.read(fd, 128).unwrap(), data);

    fs.remove("a").unwrap();
    fs.close(fd).unwrap();
    assert!(fs.open_files().is_empty());
    assert_eq!(read_file(&mut fs, "b"), data);
    assert_eq!(fs.free_sectors().unwrap(), 0);
}

#[test]
fn sector_that_cannot_be_linked_is_released() {
    // 54 data sectors, 63 inodes
    let mut fs = mem_fs_with(Geometry::new(64, 512));
    write_file(&mut fs, "big", &[7u8; 6 * 512]);
    let deepest = fill_inodes(&mut fs, 0);
    let sectors_before = fs.free_sectors().unwrap();

    let bytes: Vec<u8> = (0..7 * 512).map(|i| (i % 253) as u8).collect();
    let fd = fs.open("big").unwrap();
    fs.write(fd, &bytes).unwrap();

    // the seventh sector needs a continuation record and no inode is free
    assert!(matches!(fs.close(fd), Err(FileSystemError::InodeFull)));
    assert_eq!(fs.free_sectors().unwrap(), sectors_before);
    assert_eq!(fs.free_inodes().unwrap(), 0);
    assert_eq!(fs.stat("big").unwrap().slots_used, 6);
    assert_eq!(fs.open_files().len(), 1);

    fs.remove(&deepest).unwrap();
    fs.close(fd).unwrap();
    assert_eq!(fs.free_sectors().unwrap(), sectors_before - 1);
    assert_eq!(fs.stat("big").unwrap().slots_used, 7);
    assert_eq!(read_file(&mut fs, "big"), bytes);
}
