//! Experimental condition assignment.

mod block_randomizer;

pub use block_randomizer::{BlockRandomizer, RandomizerError};
