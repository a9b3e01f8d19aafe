// Service exports
pub mod cache;
pub mod crm;
pub mod postgres;
pub mod probe;

pub use cache::{signals_fingerprint, CacheError, CacheKey, CacheManager, CacheStats};
pub use crm::{CrmClient, CrmCollections, CrmError};
pub use postgres::{MatchStats, PostgresClient, PostgresError};
pub use probe::ReachabilityProbe;
