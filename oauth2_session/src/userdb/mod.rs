mod errors;
mod storage;
mod types;

pub use errors::UserError;
pub use storage::AccountStore;
pub use types::{Account, NewAccount};
