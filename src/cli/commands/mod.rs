pub mod config;
pub mod db;
pub mod init;
pub mod log;
pub mod presence;
pub mod punch;
pub mod queue;
pub mod serve;
pub mod status;
pub mod sync;
