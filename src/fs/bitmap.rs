use std::ops::Range;

use crate::{
    disk::BlockDevice,
    fs::{device::SectorIo, error::Result},
};

const WORD_BYTES: usize = 4;
const WORD_BITS: u32 = 32;

/// An allocation bitmap spread over a run of sectors.
///
/// Bit `i` (one per sector or per inode) lives in 32-bit little-endian word
/// `(i % bits_per_sector) / 32` of sector `start_sector + i / bits_per_sector`.
/// Bits at or beyond `capacity` are never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    start_sector: u32,
    sectors: u32,
    capacity: u32,
}

// 按小端序读取第 index 个 32 位字
fn word(buf: &[u8], index: usize) -> u32 {
    let at = index * WORD_BYTES;
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn put_word(buf: &mut [u8], index: usize, value: u32) {
    let at = index * WORD_BYTES;
    buf[at..at + WORD_BYTES].copy_from_slice(&value.to_le_bytes());
}

impl Bitmap {
    pub fn new(start_sector: u32, sectors: u32, capacity: u32) -> Self {
        Self {
            start_sector,
            sectors,
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    fn bits_per_sector(sector_size: usize) -> u32 {
        sector_size as u32 * 8
    }

    // 返回 (扇区号, 扇区内字下标, 字内位下标)
    fn locate(&self, index: u32, sector_size: usize) -> (u32, usize, u32) {
        let per_sector = Self::bits_per_sector(sector_size);
        let within = index % per_sector;
        (
            self.start_sector + index / per_sector,
            (within / WORD_BITS) as usize,
            within % WORD_BITS,
        )
    }

    /// Claim the lowest clear bit, or `None` when every bit below `capacity`
    /// is already set.
    pub fn alloc<D: BlockDevice>(&self, io: &SectorIo<D>) -> Result<Option<u32>> {
        let sector_size = io.geometry().sector_size;
        let per_sector = Self::bits_per_sector(sector_size);
        let words = sector_size / WORD_BYTES;

        for offset in 0..self.sectors {
            let sector = self.start_sector + offset;
            let mut buf = io.read(sector)?;

            for w in 0..words {
                let bits = word(&buf, w);
                if bits == u32::MAX {
                    continue; // 整个字已满
                }
                let bit = bits.trailing_ones();
                let index = offset * per_sector + w as u32 * WORD_BITS + bit;
                if index >= self.capacity {
                    return Ok(None); // 超出容量即视为已满
                }
                put_word(&mut buf, w, bits | (1 << bit));
                io.write(sector, &buf)?;
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    pub fn set<D: BlockDevice>(&self, io: &SectorIo<D>, index: u32) -> Result<()> {
        self.update(io, index, true)
    }

    pub fn clear<D: BlockDevice>(&self, io: &SectorIo<D>, index: u32) -> Result<()> {
        self.update(io, index, false)
    }

    fn update<D: BlockDevice>(&self, io: &SectorIo<D>, index: u32, used: bool) -> Result<()> {
        let (sector, w, bit) = self.locate(index, io.geometry().sector_size);
        let mut buf = io.read(sector)?;
        let bits = word(&buf, w);
        let bits = if used {
            bits | (1 << bit)
        } else {
            bits & !(1 << bit)
        };
        put_word(&mut buf, w, bits);
        io.write(sector, &buf)
    }

    /// Mark a whole range as used, touching each bitmap sector once.
    pub fn set_range<D: BlockDevice>(&self, io: &SectorIo<D>, range: Range<u32>) -> Result<()> {
        let sector_size = io.geometry().sector_size;
        let mut current: Option<(u32, Vec<u8>)> = None;

        for index in range {
            let (sector, w, bit) = self.locate(index, sector_size);
            if current.as_ref().map(|(s, _)| *s) != Some(sector) {
                if let Some((s, buf)) = current.take() {
                    io.write(s, &buf)?;
                }
                current = Some((sector, io.read(sector)?));
            }
            if let Some((_, buf)) = current.as_mut() {
                let bits = word(buf, w) | (1 << bit);
                put_word(buf, w, bits);
            }
        }
        if let Some((s, buf)) = current {
            io.write(s, &buf)?;
        }
        Ok(())
    }

    // 检查某一位是否被占用
    pub fn is_set<D: BlockDevice>(&self, io: &SectorIo<D>, index: u32) -> Result<bool> {
        let (sector, w, bit) = self.locate(index, io.geometry().sector_size);
        let buf = io.read(sector)?;
        Ok(word(&buf, w) & (1 << bit) != 0)
    }

    /// Number of set bits across the whole region.
    pub fn count_set<D: BlockDevice>(&self, io: &SectorIo<D>) -> Result<u32> {
        let mut used = 0;
        for offset in 0..self.sectors {
            let buf = io.read(self.start_sector + offset)?;
            used += buf.iter().map(|b| b.count_ones()).sum::<u32>();
        }
        Ok(used)
    }
}
