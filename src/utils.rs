use anyhow::{Result, ensure};
use indicatif::{ProgressBar, ProgressStyle};

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .expect("invalid progress template")
        .progress_chars("#>-")
}

/// 总数未知时使用，不显示进度条和剩余时间
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {pos} {per_sec} {msg}")
        .expect("invalid progress template")
}

pub fn progress_bar(len: Option<usize>) -> ProgressBar {
    match len {
        Some(len) => ProgressBar::new(len as u64).with_style(pb_style()),
        None => ProgressBar::no_length().with_style(spinner_style()),
    }
}

/// 将序号补零到固定位数，保证 key 的字典序与写入顺序一致
pub fn format_key(seq: usize, width: usize) -> Result<String> {
    let key = format!("{:0width$}", seq, width = width);
    ensure!(key.len() == width, "sequence number {} exceeds {}-digit key space", seq, width);
    Ok(key)
}
