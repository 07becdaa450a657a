pub mod connectivity;
pub mod transport;
