use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommand;
use crate::config::ImagesetOptions;
use crate::pipeline::convert_imageset;

/// 将图片集按配对文件转换为孪生网络训练用的数据库
///
/// LISTFILE 每行为 `相对路径 标签`，PAIRFILE 每行为 `idx1 idx2 label1 label2`，
/// 其中 idx 为 LISTFILE 中的行号（从 0 开始）。
#[derive(Parser, Debug, Clone)]
#[command(name = "convert_imageset", version)]
pub struct ImagesetCommand {
    #[command(flatten)]
    pub options: ImagesetOptions,
    /// 图片根目录
    #[arg(value_name = "ROOTFOLDER")]
    pub root_folder: PathBuf,
    /// 图片列表文件
    #[arg(value_name = "LISTFILE")]
    pub list_file: PathBuf,
    /// 配对文件
    #[arg(value_name = "PAIRFILE")]
    pub pair_file: PathBuf,
    /// 输出数据库路径
    #[arg(value_name = "DB_NAME")]
    pub db_name: PathBuf,
}

impl SubCommand for ImagesetCommand {
    fn run(&self) -> Result<()> {
        convert_imageset(
            &self.root_folder,
            &self.list_file,
            &self.pair_file,
            &self.db_name,
            &self.options,
        )?;
        Ok(())
    }
}
