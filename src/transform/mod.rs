pub mod error;
pub(crate) mod reader;
pub mod traffic;
pub mod transformer;
pub mod weather;
