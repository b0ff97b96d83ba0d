//! In-process implementations of the collaborator traits

pub mod constant_product;
pub mod token_ledger;

pub use constant_product::ConstantProductRouter;
pub use token_ledger::TokenLedger;
