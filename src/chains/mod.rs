pub mod bitcoind;
pub mod traits;

pub use bitcoind::BitcoindClient;
pub use traits::{ChainQuery, QueryError};
