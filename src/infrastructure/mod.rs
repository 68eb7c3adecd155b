pub mod config;
pub mod demo;
pub mod in_process;
pub mod loader;
pub mod logging;
pub mod output;
