//! Transaction building, signing and submission

pub mod gas;
pub mod sender;

pub use sender::TransactionSender;
