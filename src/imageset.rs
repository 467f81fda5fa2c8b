use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, ensure};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use log::warn;

use crate::sample::{Layout, Sample};

/// 列表文件中的一行：相对路径和标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub path: String,
    pub label: i32,
}

/// 读取 `path label` 格式的列表文件，标签为每行最后一个字段，因此路径中可以包含空格
pub fn read_list_file<P: AsRef<Path>>(path: P) -> Result<Vec<ListEntry>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to open list file {}", path.display()))?;
    let mut entries = vec![];
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (file, label) = line
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| anyhow!("{}:{}: expected `path label`", path.display(), i + 1))?;
        let label = label
            .parse()
            .with_context(|| format!("{}:{}: invalid label {:?}", path.display(), i + 1, label))?;
        entries.push(ListEntry { path: file.trim_end().to_owned(), label });
    }
    Ok(entries)
}

/// 从根目录读取图片并转换为样本
#[derive(Debug, Clone)]
pub struct ImageLoader {
    root: PathBuf,
    gray: bool,
    resize_height: u32,
    resize_width: u32,
}

impl ImageLoader {
    pub fn new<P: Into<PathBuf>>(root: P, gray: bool, resize_height: u32, resize_width: u32) -> Self {
        Self { root: root.into(), gray, resize_height, resize_width }
    }

    pub fn channels(&self) -> u32 {
        if self.gray { 1 } else { 3 }
    }

    /// 读取并解码图片，解码失败时返回 `Ok(None)`
    ///
    /// 彩色图片的通道顺序为 BGR。指定 `encoding` 时，样本同时携带该格式的压缩数据。
    pub fn load(&self, entry: &ListEntry, encoding: Option<&str>) -> Result<Option<Sample>> {
        let path = self.root.join(&entry.path);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("could not open or find file {}: {}", path.display(), e);
                return Ok(None);
            }
        };
        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!("could not decode file {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let native = image.color().has_color() != self.gray;
        let resize = self.resize_height > 0 && self.resize_width > 0;
        let image = match resize {
            true => image.resize_exact(self.resize_width, self.resize_height, FilterType::Triangle),
            false => image,
        };
        let image = match self.gray {
            true => DynamicImage::ImageLuma8(image.to_luma8()),
            false => DynamicImage::ImageRgb8(image.to_rgb8()),
        };

        let encoded = match encoding {
            Some(encoding) => {
                let format = ImageFormat::from_extension(encoding)
                    .ok_or_else(|| anyhow!("unsupported encode type {:?}", encoding))?;
                let same_format = path
                    .extension()
                    .and_then(ImageFormat::from_extension)
                    .is_some_and(|f| f == format);
                if native && !resize && same_format {
                    Some(bytes)
                } else {
                    Some(encode(&image, format).with_context(|| {
                        format!("failed to encode {} as {:?}", path.display(), format)
                    })?)
                }
            }
            None => None,
        };

        let (width, height) = (image.width(), image.height());
        let data = match image {
            DynamicImage::ImageRgb8(rgb) => {
                let mut data = rgb.into_raw();
                // OpenCV 的通道顺序
                for pixel in data.chunks_exact_mut(3) {
                    pixel.swap(0, 2);
                }
                data
            }
            image => image.into_luma8().into_raw(),
        };

        let mut sample =
            Sample::new(data, height, width, self.channels(), Layout::Interleaved, entry.label);
        sample.encoded = encoded;
        Ok(Some(sample))
    }
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(vec![]);
    image.write_to(&mut buffer, format)?;
    ensure!(!buffer.get_ref().is_empty(), "encoder produced no data");
    Ok(buffer.into_inner())
}
