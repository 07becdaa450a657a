pub mod intent;
pub mod location;
pub mod presence;
pub mod punch_kind;
pub mod session;
pub mod wire;
