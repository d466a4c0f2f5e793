mod build;
mod info;
mod inspect;

pub use build::cmd_build;
pub use info::cmd_info;
pub use inspect::cmd_inspect;
