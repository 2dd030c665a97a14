/// 每个 inode 记录内联的槽位数（子目录项或数据扇区号）
pub const SLOT_COUNT: usize = 6;

/// 名字最多 16 字节
pub const NAME_LEN: usize = 16;

/// 哨兵值：空槽位 / 没有续接记录 / 没有父目录（磁盘上即 -1）
pub const NONE: u32 = u32::MAX;

/// 格式化时第一个分配的 inode 就是根目录
pub const ROOT_INODE: u32 = 0;

/// 瞬时设备错误的默认重试次数
pub const DEFAULT_MAX_RETRIES: u32 = 16;

/// Runtime knobs for a mounted volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsOptions {
    /// Extra attempts after a transient device failure before giving up.
    pub max_retries: u32,
}

impl Default for FsOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}
