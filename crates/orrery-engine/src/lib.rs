pub mod api;
pub mod components;
pub mod core;
pub mod error;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{
    AmbientConfig, CountConfig, FloatRange, OpacityConfig, OrbitConfig, StarfieldConfig, TrailConfig,
    TwinkleConfig,
};
pub use api::info::{ActiveTrailInfo, OrbitalInfo, StarsInfo, TrailInfo, TrailStarCounts};
pub use api::types::{DeviceClass, Rgb, StarId, TrailId, Viewport};
pub use components::star::{Flicker, Star, Twinkle};
pub use core::driver::{AnimationLoop, FrameScheduler};
pub use core::starfield::{OpacityUpdate, Starfield};
pub use core::time::{FpsCounter, FrameClock, MAX_FRAME_DT};
pub use error::OrreryError;
pub use renderer::instance::{CircleInstance, FrameBuffer};
pub use renderer::traits::{draw_frame, BlendMode, Canvas};
pub use systems::generator::{generate, Generation};
pub use systems::lighting::AmbientGradient;
pub use systems::motion::VisibleBounds;
pub use systems::trails::{PoolStats, TrailBuffer, TrailPool};
