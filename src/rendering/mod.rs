pub mod context;
pub mod nodes;

// Re-export main types
pub use context::{DrawCommand, RenderContext, Rgba};
