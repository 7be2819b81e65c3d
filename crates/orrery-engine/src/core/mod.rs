pub mod driver;
pub mod starfield;
pub mod time;
