use std::path::Path;

use anyhow::{Context, Result};
use rocksdb::{
    BlockBasedIndexType, BlockBasedOptions, Cache, DB, DBCompressionType, IteratorMode, Options,
    WriteBatch,
};

use super::{Database, Mode, Transaction};

fn default_options() -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_size(16 << 10);
    block_opts.set_block_cache(&Cache::new_lru_cache(256 << 20));
    block_opts.set_index_type(BlockBasedIndexType::TwoLevelIndexSearch);
    block_opts.set_bloom_filter(10.0, false);
    block_opts.set_cache_index_and_filter_blocks(true);

    let mut options = Options::default();
    options.set_block_based_table_factory(&block_opts);
    // 像素数据几乎无法压缩，只压缩最底层
    options.set_compression_type(DBCompressionType::None);
    options.set_bottommost_compression_type(DBCompressionType::Zstd);
    options.increase_parallelism(num_cpus::get() as i32);
    options.set_keep_log_file_num(10);
    options.set_level_compaction_dynamic_level_bytes(true);
    options.set_max_total_wal_size(512 << 20);
    options.set_write_buffer_size(64 << 20);

    options
}

pub struct RocksDatabase {
    db: DB,
    read_only: bool,
}

impl RocksDatabase {
    pub fn open(path: &Path, mode: Mode) -> Result<Self> {
        let mut options = default_options();
        let db = match mode {
            Mode::Read => DB::open_for_read_only(&options, path, false),
            Mode::Write => {
                options.create_if_missing(true);
                DB::open(&options, path)
            }
            Mode::New => {
                options.create_if_missing(true);
                options.set_error_if_exists(true);
                DB::open(&options, path)
            }
        }
        .with_context(|| format!("failed to open rocksdb at {}", path.display()))?;
        Ok(Self { db, read_only: mode == Mode::Read })
    }
}

impl Database for RocksDatabase {
    fn new_transaction(&self) -> Result<Box<dyn Transaction + '_>> {
        Ok(Box::new(RocksTransaction { db: &self.db, batch: WriteBatch::default() }))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn len(&self) -> Result<u64> {
        let mut count = 0;
        for item in self.db.iterator(IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn close(self: Box<Self>) -> Result<()> {
        if !self.read_only {
            self.db.flush()?;
        }
        Ok(())
    }
}

/// 写入先缓存在 WriteBatch 中，提交时原子写入
pub struct RocksTransaction<'a> {
    db: &'a DB,
    batch: WriteBatch,
}

impl Transaction for RocksTransaction<'_> {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.batch.put(key, value);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let Self { db, batch } = *self;
        db.write(batch)?;
        Ok(())
    }
}
