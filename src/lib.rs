pub mod cifar;
pub mod cli;
pub mod config;
pub mod imageset;
pub mod kv;
pub mod pairs;
pub mod pipeline;
pub mod record;
pub mod sample;
pub mod utils;
pub mod writer;

pub use config::ImagesetOptions;
pub use pipeline::{convert_cifar, convert_imageset};
pub use record::{PairedRecord, RecordData, build_pair};
