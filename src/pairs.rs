use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, ensure};

/// 配对文件中的一行：两个样本下标及其期望标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSpec {
    pub first: usize,
    pub second: usize,
    pub first_label: i32,
    pub second_label: i32,
    /// 所在行号，从 1 开始
    pub line: usize,
}

impl PairSpec {
    /// 校验配对文件中的标签与数据集中的真实标签是否一致
    pub fn check_labels(&self, first_label: i32, second_label: i32) -> Result<()> {
        ensure!(
            self.first_label == first_label,
            "label mismatch at pair line {}: sample {} has label {}, pair file says {}",
            self.line,
            self.first,
            first_label,
            self.first_label
        );
        ensure!(
            self.second_label == second_label,
            "label mismatch at pair line {}: sample {} has label {}, pair file says {}",
            self.line,
            self.second,
            second_label,
            self.second_label
        );
        Ok(())
    }
}

/// 按行读取配对文件，每行格式为 `idx1 idx2 label1 label2`
pub struct PairReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: usize,
}

impl PairReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("unable to open pair file {}", path.display()))?;
        Ok(Self { path, lines: BufReader::new(file).lines(), line: 0 })
    }
}

impl Iterator for PairReader {
    type Item = Result<PairSpec>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(anyhow!(e).context(format!(
                        "failed to read {} at line {}",
                        self.path.display(),
                        self.line
                    ))));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_pair(&line, self.line).with_context(|| {
                format!("malformed pair file {} at line {}", self.path.display(), self.line)
            }));
        }
    }
}

fn parse_pair(line: &str, line_no: usize) -> Result<PairSpec> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    ensure!(tokens.len() == 4, "expected 4 fields, found {}: {:?}", tokens.len(), line);
    Ok(PairSpec {
        first: tokens[0].parse().with_context(|| format!("invalid index {:?}", tokens[0]))?,
        second: tokens[1].parse().with_context(|| format!("invalid index {:?}", tokens[1]))?,
        first_label: tokens[2].parse().with_context(|| format!("invalid label {:?}", tokens[2]))?,
        second_label: tokens[3]
            .parse()
            .with_context(|| format!("invalid label {:?}", tokens[3]))?,
        line: line_no,
    })
}
