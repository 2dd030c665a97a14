use std::fmt;

/// Which device call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    Read,
    Write,
}

impl fmt::Display for DeviceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// 文件系统错误类型
#[derive(Debug)]
pub enum FileSystemError {
    Io(std::io::Error), // 底层 I/O 错误
    Device {
        op: DeviceOp,
        sector: u32,
        attempts: u32,
        source: std::io::Error,
    }, // 设备重试耗尽
    DiskFull,                  // 磁盘已满
    InodeFull,                 // inode 已满
    NotFound(String),          // 文件或目录不存在，带路径
    AlreadyExists(String),     // 文件或目录已存在，带路径
    NotADirectory(String),     // 期望目录，实际不是
    IsADirectory(String),      // 期望文件，实际是目录
    DirectoryNotEmpty(String), // 目录非空
    InvalidPath(String),       // 路径非法
    NameTooLong(String),       // 名字超过 16 字节
    NoParent,                  // 根目录没有父目录
    BadDescriptor(u32),        // 未打开的文件描述符
    InvalidSeek { position: u32, size: u32 },
    FileTooLarge,              // 文件超过 u32 字节
    Busy(String),              // 正在使用，不能删除
    InvalidGeometry(String),   // 磁盘参数无法布局
    InvalidInode(u32),         // inode 无效
    Corrupted(String),         // 文件系统损坏
    Unformatted,               // 磁盘上没有文件系统
}

impl From<std::io::Error> for FileSystemError {
    fn from(e: std::io::Error) -> Self {
        FileSystemError::Io(e)
    }
}

impl From<bincode::Error> for FileSystemError {
    fn from(e: bincode::Error) -> Self {
        FileSystemError::Corrupted(format!("inode record: {e}"))
    }
}

// 实现 Display trait，用于打印错误信息
impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Disk I/O error: {}", e),
            Self::Device {
                op,
                sector,
                attempts,
                source,
            } => write!(
                f,
                "Device {} of sector {} failed after {} attempt(s): {}",
                op, sector, attempts, source
            ),
            Self::DiskFull => write!(f, "Disk space is full"),
            Self::InodeFull => write!(f, "No free inode available"),
            Self::NotFound(path) => write!(f, "File or directory not found: {}", path),
            Self::AlreadyExists(path) => write!(f, "File or directory already exists: {}", path),
            Self::NotADirectory(path) => write!(f, "Expected a directory, found a file: {}", path),
            Self::IsADirectory(path) => write!(f, "Expected a file, found a directory: {}", path),
            Self::DirectoryNotEmpty(path) => write!(f, "Directory is not empty: {}", path),
            Self::InvalidPath(path) => write!(f, "Invalid path: {}", path),
            Self::NameTooLong(name) => write!(f, "Name longer than 16 bytes: {}", name),
            Self::NoParent => write!(f, "Root directory has no parent"),
            Self::BadDescriptor(fd) => write!(f, "Unknown file descriptor: {}", fd),
            Self::InvalidSeek { position, size } => write!(
                f,
                "Cannot seek to {} in a file of {} bytes",
                position, size
            ),
            Self::FileTooLarge => write!(f, "File would exceed 4 GiB"),
            Self::Busy(path) => write!(f, "Resource busy: {}", path),
            Self::InvalidGeometry(desc) => write!(f, "Unusable disk geometry: {}", desc),
            Self::InvalidInode(inode) => write!(f, "Invalid inode: {}", inode),
            Self::Corrupted(desc) => write!(f, "File system corrupted: {}", desc),
            Self::Unformatted => write!(f, "No file system found on disk"),
        }
    }
}

// 支持链式错误，方便追踪底层原因
impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Device { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, FileSystemError>;
