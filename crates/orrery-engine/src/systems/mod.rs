pub mod generator;
pub mod lighting;
pub mod motion;
pub mod render;
pub mod trails;
