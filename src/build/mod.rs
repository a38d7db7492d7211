pub mod cache;
pub mod output;
pub mod pipeline;

pub use cache::{CacheMode, LayerCache};
pub use output::save_livery;
pub use pipeline::{BuildOpts, BuildThreading, LiveryBuilder, build_livery};
