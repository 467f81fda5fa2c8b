mod lmdb;
mod rocks;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use log::info;

pub use lmdb::LmdbDatabase;
pub use rocks::RocksDatabase;

/// 存储后端
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// LMDB
    #[default]
    Lmdb,
    /// RocksDB
    Rocksdb,
    /// 旧的 leveldb 参数，实际以 RocksDB 存储，目录名保持为 leveldb
    Leveldb,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lmdb => "lmdb",
            Self::Rocksdb => "rocksdb",
            Self::Leveldb => "leveldb",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 打开数据库的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 只读打开已存在的数据库
    Read,
    /// 打开数据库，不存在则创建
    Write,
    /// 创建新数据库，已存在则报错
    New,
}

pub trait Database {
    /// 开启一个写事务
    fn new_transaction(&self) -> Result<Box<dyn Transaction + '_>>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 数据库中的记录数量
    fn len(&self) -> Result<u64>;

    /// 将数据落盘并关闭数据库
    fn close(self: Box<Self>) -> Result<()>;
}

pub trait Transaction {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// 提交事务，提交后事务不可再使用
    fn commit(self: Box<Self>) -> Result<()>;
}

/// 根据后端类型打开数据库
pub fn open_database<P: AsRef<Path>>(
    backend: Backend,
    path: P,
    mode: Mode,
) -> Result<Box<dyn Database>> {
    let path = path.as_ref();
    info!("open {} database at {} ({:?})", backend, path.display(), mode);
    Ok(match backend {
        Backend::Lmdb => Box::new(LmdbDatabase::open(path, mode)?),
        Backend::Rocksdb | Backend::Leveldb => Box::new(RocksDatabase::open(path, mode)?),
    })
}
