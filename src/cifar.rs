use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use log::info;

use crate::sample::{Layout, Sample};

pub const CIFAR_SIZE: u32 = 32;
pub const CIFAR_CHANNELS: u32 = 3;
pub const CIFAR_IMAGE_BYTES: usize = 3072;

/// 每条记录：1 字节标签 + 3072 字节像素
const RECORD_BYTES: u64 = 1 + CIFAR_IMAGE_BYTES as u64;

struct BatchFile {
    path: PathBuf,
    file: File,
    records: u64,
}

/// 一组 CIFAR 二进制 batch 文件，按顺序视为一个连续的样本序列
pub struct CifarBatches {
    files: Vec<BatchFile>,
    buffer: Vec<u8>,
}

impl CifarBatches {
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref().to_path_buf();
            let file = File::open(&path)
                .with_context(|| format!("unable to open batch file {}", path.display()))?;
            let len = file.metadata()?.len();
            ensure!(
                len % RECORD_BYTES == 0,
                "{} is not a CIFAR batch file: size {} is not a multiple of {}",
                path.display(),
                len,
                RECORD_BYTES
            );
            files.push(BatchFile { path, file, records: len / RECORD_BYTES });
        }
        Ok(Self { files, buffer: vec![0; RECORD_BYTES as usize] })
    }

    /// 训练集：优先使用合并后的 `data_batch.bin`，否则读取 `data_batch_1.bin` 到 `data_batch_5.bin`
    pub fn train<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let folder = folder.as_ref();
        let merged = folder.join("data_batch.bin");
        if merged.exists() {
            return Self::open(&[merged]);
        }
        let parts = (1..=5).map(|i| folder.join(format!("data_batch_{}.bin", i))).collect::<Vec<_>>();
        info!("{} not found, reading {} batch files", merged.display(), parts.len());
        Self::open(&parts)
    }

    pub fn test<P: AsRef<Path>>(folder: P) -> Result<Self> {
        Self::open(&[folder.as_ref().join("test_batch.bin")])
    }

    /// 样本总数
    pub fn len(&self) -> u64 {
        self.files.iter().map(|f| f.records).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读取第 `index` 个样本
    pub fn read_sample(&mut self, index: usize) -> Result<Sample> {
        let mut local = index as u64;
        for batch in &mut self.files {
            if local >= batch.records {
                local -= batch.records;
                continue;
            }
            batch.file.seek(SeekFrom::Start(local * RECORD_BYTES))?;
            batch.file.read_exact(&mut self.buffer).with_context(|| {
                format!("failed to read sample {} from {}", index, batch.path.display())
            })?;
            let label = self.buffer[0] as i32;
            let data = self.buffer[1..].to_vec();
            return Ok(Sample::new(
                data,
                CIFAR_SIZE,
                CIFAR_SIZE,
                CIFAR_CHANNELS,
                Layout::ChannelMajor,
                label,
            ));
        }
        bail!("sample index {} out of range, dataset has {} samples", index, self.len())
    }
}
