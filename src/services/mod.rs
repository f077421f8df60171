pub mod bundler;
pub mod control_plane;
pub mod dedup;
pub mod pipeline;
pub mod storage;
