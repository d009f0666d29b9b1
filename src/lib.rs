pub mod cache;
pub mod config;
pub mod consolidate;
pub mod enrich;
pub mod estimate;
pub mod evaluate;
pub mod model;
pub mod pipeline;
pub mod segment;
pub mod text;
pub mod util;
