pub mod kv;
pub mod queue;
