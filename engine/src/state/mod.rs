mod account;
mod boost;
mod checkpoint;

pub use account::AccountState;
pub use boost::Boost;
pub use checkpoint::Checkpoint;
