pub mod database;
pub mod enrollment;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoStore;
pub use enrollment::join_challenge;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics, record_join};
pub use store::EcoStore;
