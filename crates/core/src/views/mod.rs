pub mod flame;

pub use flame::layout_flame;
