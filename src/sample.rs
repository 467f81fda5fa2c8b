use std::borrow::Cow;

/// 像素在缓冲区中的排列方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// C×H×W，通道变化最慢，CIFAR 二进制文件即为此格式
    ChannelMajor,
    /// H×W×C，图片解码后的格式
    Interleaved,
}

/// 从数据集中读取的单个样本
#[derive(Debug, Clone)]
pub struct Sample {
    pub data: Vec<u8>,
    pub height: u32,
    pub width: u32,
    pub channels: u32,
    pub layout: Layout,
    pub label: i32,
    /// 压缩后的原始图片数据，仅在 encoded 模式下存在
    pub encoded: Option<Vec<u8>>,
}

impl Sample {
    pub fn new(
        data: Vec<u8>,
        height: u32,
        width: u32,
        channels: u32,
        layout: Layout,
        label: i32,
    ) -> Self {
        debug_assert_eq!(data.len(), (height * width * channels) as usize);
        Self { data, height, width, channels, layout, label, encoded: None }
    }

    /// 像素总字节数
    pub fn size(&self) -> usize {
        self.channels as usize * self.height as usize * self.width as usize
    }

    /// 以 C×H×W 顺序返回像素数据
    pub fn channel_major(&self) -> Cow<'_, [u8]> {
        match self.layout {
            Layout::ChannelMajor => Cow::Borrowed(&self.data),
            Layout::Interleaved => {
                let (height, width, channels) =
                    (self.height as usize, self.width as usize, self.channels as usize);
                let plane = height * width;
                let mut buffer = vec![0u8; self.size()];
                for (i, pixel) in self.data.chunks_exact(channels).enumerate() {
                    for (c, value) in pixel.iter().enumerate() {
                        buffer[c * plane + i] = *value;
                    }
                }
                Cow::Owned(buffer)
            }
        }
    }
}
