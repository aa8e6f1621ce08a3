pub mod deal;
pub mod version;
