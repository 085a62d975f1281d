pub mod errors;
pub mod ledger;
pub mod models;
pub mod pool;
pub mod repo;
pub mod session;
pub mod source;
pub mod stats;

pub use errors::*;
pub use ledger::*;
pub use models::*;
pub use pool::*;
pub use repo::*;
pub use session::*;
pub use source::*;
pub use stats::*;
