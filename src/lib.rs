pub mod archive;
pub mod assemble;
pub mod classify;
pub mod cli;
pub mod compile;
pub mod config;
pub mod fetch;
pub mod load_config;
pub mod normalize;
pub mod resolve;
