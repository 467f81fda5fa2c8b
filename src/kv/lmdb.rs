use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use heed::types::{Bytes, Str};
use heed::{Database as HeedDatabase, Env, EnvOpenOptions, RwTxn, WithTls};

use super::{Database, Mode, Transaction};

/// LMDB 数据库，所有记录存放在未命名的默认库中
pub struct LmdbDatabase {
    env: Env<WithTls>,
    db: HeedDatabase<Str, Bytes>,
}

impl LmdbDatabase {
    pub fn open(path: &Path, mode: Mode) -> Result<Self> {
        match mode {
            Mode::New => fs::create_dir(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
            Mode::Write => fs::create_dir_all(path)?,
            Mode::Read => {}
        }

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1 << 40) // 此处直接分配 1TiB 大小，实际占用随数据增长
                .open(path)
                .with_context(|| format!("failed to open lmdb at {}", path.display()))?
        };

        let db = match mode {
            Mode::Read => {
                let txn = env.read_txn()?;
                let db = env
                    .open_database::<Str, Bytes>(&txn, None)?
                    .ok_or_else(|| anyhow!("no database found in {}", path.display()))?;
                txn.commit()?;
                db
            }
            Mode::Write | Mode::New => {
                let mut txn = env.write_txn()?;
                let db = env.create_database::<Str, Bytes>(&mut txn, None)?;
                txn.commit()?;
                db
            }
        };

        Ok(Self { env, db })
    }
}

impl Database for LmdbDatabase {
    fn new_transaction(&self) -> Result<Box<dyn Transaction + '_>> {
        let txn = self.env.write_txn()?;
        Ok(Box::new(LmdbTransaction { txn, db: self.db }))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let txn = self.env.read_txn()?;
        Ok(self.db.get(&txn, key)?.map(|v| v.to_vec()))
    }

    fn len(&self) -> Result<u64> {
        let txn = self.env.read_txn()?;
        Ok(self.db.len(&txn)?)
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.env.force_sync()?;
        Ok(())
    }
}

pub struct LmdbTransaction<'a> {
    txn: RwTxn<'a>,
    db: HeedDatabase<Str, Bytes>,
}

impl Transaction for LmdbTransaction<'_> {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.db.put(&mut self.txn, key, value)?;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.txn.commit()?;
        Ok(())
    }
}
