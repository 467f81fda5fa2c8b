use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, ensure};
use either::Either;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::cifar::CifarBatches;
use crate::config::ImagesetOptions;
use crate::imageset::{ImageLoader, ListEntry, read_list_file};
use crate::kv::{Backend, Mode, open_database};
use crate::pairs::{PairReader, PairSpec};
use crate::record::build_pair;
use crate::utils::progress_bar;
use crate::writer::{RecordWriter, WriteStats, WriterOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CifarSummary {
    pub train: WriteStats,
    pub test: WriteStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub written: usize,
    pub skipped: usize,
    pub commits: usize,
}

/// 将 CIFAR 训练集和测试集转换为两个数据库
///
/// 数据库分别位于 `<output>/cifar10_train_<backend>` 和 `<output>/cifar10_test_<backend>`，
/// 每个数据集只在写完后提交一次。
pub fn convert_cifar(
    input: &Path,
    output: &Path,
    backend: Backend,
    train_pairs: &Path,
    test_pairs: &Path,
) -> Result<CifarSummary> {
    let train_pairs = PairReader::open(train_pairs)?;
    let test_pairs = PairReader::open(test_pairs)?;
    fs::create_dir_all(output)?;

    info!("Writing Training data");
    let batches = CifarBatches::train(input)?;
    let train = convert_cifar_split(
        batches,
        train_pairs,
        backend,
        &output.join(format!("cifar10_train_{}", backend)),
    )?;

    info!("Writing Testing data");
    let batches = CifarBatches::test(input)?;
    let test = convert_cifar_split(
        batches,
        test_pairs,
        backend,
        &output.join(format!("cifar10_test_{}", backend)),
    )?;

    Ok(CifarSummary { train, test })
}

fn convert_cifar_split(
    mut batches: CifarBatches,
    pairs: PairReader,
    backend: Backend,
    db_path: &Path,
) -> Result<WriteStats> {
    ensure!(!batches.is_empty(), "no CIFAR samples found");
    let pairs = pairs.collect::<Result<Vec<_>>>()?;
    info!("{} pairs over {} samples", pairs.len(), batches.len());
    let db = open_database(backend, db_path, Mode::New)?;
    let stats = {
        let mut writer = RecordWriter::new(&*db, WriterOptions::cifar())?;
        let pb = progress_bar(Some(pairs.len()));
        for pair in pairs {
            let a = batches.read_sample(pair.first)?;
            let b = batches.read_sample(pair.second)?;
            pair.check_labels(a.label, b.label)?;
            writer.write(&build_pair(&a, &b)?)?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        writer.finish()?
    };
    db.close()?;
    info!("{} records written to {}", stats.records, db_path.display());
    Ok(stats)
}

/// 根据列表文件和配对文件将图片集转换为数据库
///
/// 配对文件中的下标对应列表文件中的行（从 0 开始，忽略空行）。无法解码的图片对会被跳过，
/// 标签不一致、通道数不一致、尺寸不一致都会中止转换。
pub fn convert_imageset(
    root: &Path,
    list: &Path,
    pairs: &Path,
    db_path: &Path,
    options: &ImagesetOptions,
) -> Result<ConvertSummary> {
    let lines = read_list_file(list)?;
    info!("A total of {} images.", lines.len());
    let reader = PairReader::open(pairs)?;

    if options.is_encoded() && !options.encoded {
        info!("encode_type specified, assuming encoded=true.");
    }

    let pairs = match options.shuffle {
        true => {
            info!("Shuffling pairs");
            let mut pairs = reader.collect::<Result<Vec<_>>>()?;
            let mut rng = match options.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            pairs.shuffle(&mut rng);
            Either::Left(pairs.into_iter().map(Ok::<_, anyhow::Error>))
        }
        false => Either::Right(reader),
    };

    let loader =
        ImageLoader::new(root, options.gray, options.resize_height, options.resize_width);
    let db = open_database(options.backend, db_path, Mode::New)?;
    let mut skipped = 0;
    let stats = {
        let mut writer = RecordWriter::new(&*db, WriterOptions::imageset(options.check_size))?;
        // 打乱后配对数量已知
        let pb = progress_bar(pairs.size_hint().1);
        for pair in pairs {
            let pair = pair?;
            let (first, second) = resolve(&lines, &pair)?;
            pair.check_labels(first.label, second.label)?;
            debug!("Image Pairs: {} & {}", first.path, second.path);

            let encoding = options.encoding(&first.path);
            let a = loader.load(first, encoding.as_deref())?;
            let b = loader.load(second, encoding.as_deref())?;
            let (Some(a), Some(b)) = (a, b) else {
                warn!("skip pair at line {}: {} & {}", pair.line, first.path, second.path);
                skipped += 1;
                pb.inc(1);
                continue;
            };

            ensure!(
                a.channels == b.channels,
                "the two image channels mismatch at pair line {}: {} vs {}",
                pair.line,
                a.channels,
                b.channels
            );
            let record = build_pair(&a, &b).with_context(|| {
                format!(
                    "pair line {} ({} & {}), use --resize-width/--resize-height for images of different sizes",
                    pair.line, first.path, second.path
                )
            })?;
            writer.write(&record)?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        writer.finish()?
    };
    db.close()?;

    info!("Processed {} files, skipped {} pairs.", stats.records, skipped);
    Ok(ConvertSummary { written: stats.records, skipped, commits: stats.commits })
}

fn resolve<'a>(lines: &'a [ListEntry], pair: &PairSpec) -> Result<(&'a ListEntry, &'a ListEntry)> {
    let get = |index: usize| {
        lines.get(index).ok_or_else(|| {
            anyhow!(
                "pair line {}: image index {} out of range, list has {} images",
                pair.line,
                index,
                lines.len()
            )
        })
    };
    Ok((get(pair.first)?, get(pair.second)?))
}
