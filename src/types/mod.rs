pub mod dataset;
pub mod extracted;
pub mod month;
