pub mod index;

pub use index::{HitCandidate, HitIndex};
