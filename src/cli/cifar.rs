use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use crate::cli::SubCommand;
use crate::kv::Backend;
use crate::pipeline::convert_cifar;

/// 将 CIFAR 数据集按配对文件转换为孪生网络训练用的数据库
///
/// 输入目录中应包含解压后的二进制 batch 文件（data_batch.bin 或 data_batch_1.bin ~ data_batch_5.bin，
/// 以及 test_batch.bin）。数据集下载地址：http://www.cs.toronto.edu/~kriz/cifar.html
#[derive(Parser, Debug, Clone)]
#[command(name = "convert_cifar_data", version)]
pub struct CifarCommand {
    /// CIFAR 二进制文件所在目录
    pub input_folder: PathBuf,
    /// 输出目录，训练集和测试集数据库会创建在该目录下
    pub output_folder: PathBuf,
    /// 存储后端
    #[arg(value_enum)]
    pub db_type: Backend,
    /// 训练集配对文件，每行为 `idx1 idx2 label1 label2`
    pub train_pairs: PathBuf,
    /// 测试集配对文件
    pub test_pairs: PathBuf,
}

impl SubCommand for CifarCommand {
    fn run(&self) -> Result<()> {
        let summary = convert_cifar(
            &self.input_folder,
            &self.output_folder,
            self.db_type,
            &self.train_pairs,
            &self.test_pairs,
        )?;
        info!(
            "done: {} train records, {} test records",
            summary.train.records, summary.test.records
        );
        Ok(())
    }
}
