pub mod instance;
pub mod traits;

pub use instance::{CircleInstance, FrameBuffer};
pub use traits::{draw_frame, BlendMode, Canvas};
