//! Client-side cache of server state

mod fetch;
mod mutation;
mod query_cache;

pub use fetch::QueryClient;
pub use mutation::MutationController;
pub use query_cache::{CacheError, FetchTicket, QueryCache};
