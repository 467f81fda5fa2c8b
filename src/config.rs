use std::path::Path;

use clap::Parser;
use log::warn;

use crate::kv::Backend;

/// 图片集转换参数
#[derive(Parser, Debug, Clone, Default)]
pub struct ImagesetOptions {
    /// 以灰度图读取图片
    #[arg(long)]
    pub gray: bool,
    /// 随机打乱写入顺序，配对文件中的下标始终对应列表文件的原始顺序
    #[arg(long)]
    pub shuffle: bool,
    /// 打乱顺序使用的随机种子
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
    /// 存储后端
    #[arg(long, value_enum, default_value_t = Backend::Lmdb)]
    pub backend: Backend,
    /// 图片缩放后的宽度，0 表示不缩放
    #[arg(long, alias = "resize_width", value_name = "WIDTH", default_value_t = 0)]
    pub resize_width: u32,
    /// 图片缩放后的高度，0 表示不缩放
    #[arg(long, alias = "resize_height", value_name = "HEIGHT", default_value_t = 0)]
    pub resize_height: u32,
    /// 检查所有记录的数据大小是否一致
    #[arg(long, alias = "check_size")]
    pub check_size: bool,
    /// 保存图片的压缩数据而不是解码后的像素
    #[arg(long)]
    pub encoded: bool,
    /// 压缩格式（png、jpg 等），指定后自动开启 encoded
    #[arg(long, alias = "encode_type", value_name = "TYPE", default_value = "")]
    pub encode_type: String,
}

impl ImagesetOptions {
    pub fn is_encoded(&self) -> bool {
        self.encoded || !self.encode_type.is_empty()
    }

    /// 返回一组图片使用的压缩格式，未指定时根据第一张图片的后缀名猜测
    pub fn encoding(&self, first_path: &str) -> Option<String> {
        if !self.is_encoded() {
            return None;
        }
        if !self.encode_type.is_empty() {
            return Some(self.encode_type.to_lowercase());
        }
        match Path::new(first_path).extension() {
            Some(ext) => Some(ext.to_string_lossy().to_lowercase()),
            None => {
                warn!("failed to guess the encoding of '{}'", first_path);
                None
            }
        }
    }
}
