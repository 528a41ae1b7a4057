pub mod frame_name;
pub mod frame_rect;

pub use frame_name::{FrameKind, FrameName};
pub use frame_rect::FrameRect;
