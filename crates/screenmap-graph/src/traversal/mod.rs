pub mod executor;
pub mod navigator;
pub mod path;
pub mod trace;
