#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

pub const CIFAR_IMAGE_BYTES: usize = 3072;

/// 写入 CIFAR 格式的 batch 文件，第 i 张图片的像素值均为 `i + 1`
pub fn write_cifar_batch(path: &Path, labels: &[u8]) {
    let mut bytes = Vec::with_capacity(labels.len() * (CIFAR_IMAGE_BYTES + 1));
    for (i, label) in labels.iter().enumerate() {
        bytes.push(*label);
        bytes.extend(std::iter::repeat_n(i as u8 + 1, CIFAR_IMAGE_BYTES));
    }
    fs::write(path, bytes).unwrap();
}

pub fn write_png(path: &Path, size: u32, color: [u8; 3]) {
    RgbImage::from_pixel(size, size, Rgb(color)).save(path).unwrap();
}

/// 创建图片目录和列表文件
///
/// | 下标 | 文件       | 尺寸  | 标签 |
/// |------|------------|-------|------|
/// | 0    | a.png      | 32    | 0    |
/// | 1    | b.png      | 32    | 0    |
/// | 2    | c.png      | 32    | 1    |
/// | 3    | small.png  | 16    | 1    |
/// | 4    | broken.png | -     | 1    |
pub fn write_imageset(root: &Path) {
    fs::create_dir_all(root.join("img")).unwrap();
    write_png(&root.join("img/a.png"), 32, [10, 20, 30]);
    write_png(&root.join("img/b.png"), 32, [40, 50, 60]);
    write_png(&root.join("img/c.png"), 32, [70, 80, 90]);
    write_png(&root.join("img/small.png"), 16, [1, 2, 3]);
    fs::write(root.join("img/broken.png"), b"definitely not a png").unwrap();
    fs::write(
        root.join("list.txt"),
        "img/a.png 0\nimg/b.png 0\nimg/c.png 1\nimg/small.png 1\nimg/broken.png 1\n",
    )
    .unwrap();
}
