pub mod client;
pub mod clock_state;
pub mod device;
pub mod log;
pub mod presence;
pub mod punch;
pub mod sync;
