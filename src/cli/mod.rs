mod cifar;
mod imageset;

pub use cifar::*;
pub use imageset::*;

use anyhow::Result;

pub trait SubCommand {
    fn run(&self) -> Result<()>;
}
