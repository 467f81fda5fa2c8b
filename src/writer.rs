use anyhow::{Result, bail, ensure};
use log::info;

use crate::kv::{Database, Transaction};
use crate::record::PairedRecord;
use crate::utils::format_key;

#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// key 的位数，不足补零
    pub key_width: usize,
    /// 每写入多少条记录提交一次事务，`None` 表示只在结束时提交
    pub commit_every: Option<usize>,
    /// 检查所有记录的数据大小是否一致
    pub check_size: bool,
}

impl WriterOptions {
    pub fn cifar() -> Self {
        Self { key_width: 5, commit_every: None, check_size: false }
    }

    pub fn imageset(check_size: bool) -> Self {
        Self { key_width: 8, commit_every: Some(1000), check_size }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub records: usize,
    pub commits: usize,
}

/// 将记录按顺序写入数据库，同一时间只持有一个事务
pub struct RecordWriter<'a> {
    db: &'a dyn Database,
    txn: Option<Box<dyn Transaction + 'a>>,
    options: WriterOptions,
    /// 已写入的记录数，同时也是下一条记录的序号
    count: usize,
    /// 当前事务中尚未提交的记录数
    pending: usize,
    commits: usize,
    expected_size: Option<usize>,
}

impl<'a> RecordWriter<'a> {
    pub fn new(db: &'a dyn Database, options: WriterOptions) -> Result<Self> {
        ensure!(options.key_width > 0, "key width must be positive");
        if let Some(n) = options.commit_every {
            ensure!(n > 0, "commit interval must be positive");
        }
        Ok(Self {
            txn: Some(db.new_transaction()?),
            db,
            options,
            count: 0,
            pending: 0,
            commits: 0,
            expected_size: None,
        })
    }

    /// 写入一条记录，返回其 key
    pub fn write(&mut self, record: &PairedRecord) -> Result<String> {
        if self.options.check_size {
            let size = record.data_size();
            match self.expected_size {
                None => self.expected_size = Some(size),
                Some(expected) => ensure!(
                    size == expected,
                    "incorrect data field size {} for record {}, expected {}",
                    size,
                    self.count,
                    expected
                ),
            }
        }

        let key = format_key(self.count, self.options.key_width)?;
        let value = record.to_bytes()?;
        let Some(txn) = self.txn.as_mut() else {
            bail!("writer has no open transaction");
        };
        txn.put(&key, &value)?;
        self.count += 1;
        self.pending += 1;

        if self.options.commit_every.is_some_and(|n| self.count % n == 0) {
            self.commit()?;
            self.txn = Some(self.db.new_transaction()?);
        }
        Ok(key)
    }

    /// 提交最后一批数据
    pub fn finish(mut self) -> Result<WriteStats> {
        if self.pending > 0 {
            self.commit()?;
        }
        Ok(WriteStats { records: self.count, commits: self.commits })
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(txn) = self.txn.take() {
            txn.commit()?;
            self.commits += 1;
            self.pending = 0;
            info!("Processed {} files.", self.count);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use super::*;
    use crate::record::RecordData;

    /// 记录每次提交的内存数据库
    #[derive(Default)]
    struct MemoryDatabase {
        data: RefCell<BTreeMap<String, Vec<u8>>>,
        commits: RefCell<Vec<usize>>,
    }

    struct MemoryTransaction<'a> {
        db: &'a MemoryDatabase,
        puts: Vec<(String, Vec<u8>)>,
    }

    impl Database for MemoryDatabase {
        fn new_transaction(&self) -> Result<Box<dyn Transaction + '_>> {
            Ok(Box::new(MemoryTransaction { db: self, puts: vec![] }))
        }

        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.data.borrow().get(key).cloned())
        }

        fn len(&self) -> Result<u64> {
            Ok(self.data.borrow().len() as u64)
        }

        fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    impl Transaction for MemoryTransaction<'_> {
        fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
            self.puts.push((key.to_owned(), value.to_vec()));
            Ok(())
        }

        fn commit(self: Box<Self>) -> Result<()> {
            self.db.commits.borrow_mut().push(self.puts.len());
            self.db.data.borrow_mut().extend(self.puts);
            Ok(())
        }
    }

    fn record(size: usize) -> PairedRecord {
        PairedRecord {
            channels: 6,
            height: 1,
            width: 1,
            data: RecordData::Raw(vec![0; size]),
            label: 1,
        }
    }

    #[test]
    fn commit_batching() {
        let db = MemoryDatabase::default();
        let mut writer = RecordWriter::new(&db, WriterOptions::imageset(false)).unwrap();
        for _ in 0..2500 {
            writer.write(&record(6)).unwrap();
        }
        let stats = writer.finish().unwrap();
        assert_eq!(stats, WriteStats { records: 2500, commits: 3 });
        assert_eq!(*db.commits.borrow(), vec![1000, 1000, 500]);
        assert_eq!(db.len().unwrap(), 2500);
    }

    #[test]
    fn exact_multiple_has_no_empty_commit() {
        let db = MemoryDatabase::default();
        let mut writer = RecordWriter::new(&db, WriterOptions::imageset(false)).unwrap();
        for _ in 0..2000 {
            writer.write(&record(6)).unwrap();
        }
        assert_eq!(writer.finish().unwrap().commits, 2);
        assert_eq!(*db.commits.borrow(), vec![1000, 1000]);
    }

    #[test]
    fn single_commit_per_split() {
        let db = MemoryDatabase::default();
        let mut writer = RecordWriter::new(&db, WriterOptions::cifar()).unwrap();
        let keys = (0..3).map(|_| writer.write(&record(6)).unwrap()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["00000", "00001", "00002"]);
        // 提交前数据库中没有数据
        assert_eq!(db.len().unwrap(), 0);
        writer.finish().unwrap();
        assert_eq!(*db.commits.borrow(), vec![3]);
        assert!(db.get("00002").unwrap().is_some());
    }

    #[test]
    fn size_check_aborts() {
        let db = MemoryDatabase::default();
        let mut writer = RecordWriter::new(&db, WriterOptions::imageset(true)).unwrap();
        writer.write(&record(6144)).unwrap();
        let err = writer.write(&record(4096)).unwrap_err();
        assert!(err.to_string().contains("incorrect data field size 4096"));
        assert_eq!(writer.finish().unwrap().records, 1);
    }

    #[test]
    fn size_check_disabled() {
        let db = MemoryDatabase::default();
        let mut writer = RecordWriter::new(&db, WriterOptions::imageset(false)).unwrap();
        writer.write(&record(6144)).unwrap();
        writer.write(&record(4096)).unwrap();
        assert_eq!(writer.finish().unwrap().records, 2);
    }

    #[test]
    fn stored_value_decodes() {
        let db = MemoryDatabase::default();
        let mut writer = RecordWriter::new(&db, WriterOptions::imageset(false)).unwrap();
        let key = writer.write(&record(12)).unwrap();
        writer.finish().unwrap();
        let value = db.get(&key).unwrap().unwrap();
        assert_eq!(PairedRecord::from_bytes(&value).unwrap(), record(12));
    }
}
