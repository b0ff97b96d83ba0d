//! Contracts of the external collaborators the engine calls into.

pub mod amm;
pub mod token;

pub use amm::*;
pub use token::*;
