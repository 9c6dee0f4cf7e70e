pub mod node_arena;

pub use node_arena::{NodeArena, NodeId};
