pub mod estimate;
pub mod plan;
pub mod status;
