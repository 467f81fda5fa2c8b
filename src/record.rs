use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// 记录中保存的图像数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordData {
    /// 两张图片按通道拼接后的像素，C×H×W
    Raw(Vec<u8>),
    /// 两张图片各自的压缩数据
    Encoded { first: Vec<u8>, second: Vec<u8> },
}

/// 写入数据库的孪生网络训练样本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedRecord {
    pub channels: u32,
    pub height: u32,
    pub width: u32,
    pub data: RecordData,
    /// 两张图片标签相同为 1，否则为 0
    pub label: i32,
}

impl PairedRecord {
    /// 用于尺寸一致性检查的数据大小
    pub fn data_size(&self) -> usize {
        match &self.data {
            RecordData::Raw(data) => data.len(),
            RecordData::Encoded { .. } => {
                self.channels as usize * self.height as usize * self.width as usize
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// 将两个样本在通道维度上拼接成一条记录
///
/// 两个样本的宽高必须一致，通道数可以不同。
pub fn build_pair(a: &Sample, b: &Sample) -> Result<PairedRecord> {
    ensure!(
        a.height == b.height && a.width == b.width,
        "image size mismatch: {}x{} vs {}x{}",
        a.height,
        a.width,
        b.height,
        b.width
    );

    let data = match (&a.encoded, &b.encoded) {
        (Some(first), Some(second)) => {
            RecordData::Encoded { first: first.clone(), second: second.clone() }
        }
        _ => {
            let mut buffer = Vec::with_capacity(a.size() + b.size());
            buffer.extend_from_slice(&a.channel_major());
            buffer.extend_from_slice(&b.channel_major());
            RecordData::Raw(buffer)
        }
    };

    Ok(PairedRecord {
        channels: a.channels + b.channels,
        height: a.height,
        width: a.width,
        data,
        label: (a.label == b.label) as i32,
    })
}
