// Harvest pipeline components
pub mod models; // Player record, timestamp parsing
pub mod errors; // error enums for source / lag / fetch / publish
pub mod cursor; // fetch cursor: floor, lookback window, daily reset
pub mod filter; // page parse + retention predicates
pub mod source; // upstream HTTP page source (reqwest)
pub mod lag; // consumer lag measurement (rdkafka, read-only)
pub mod relay; // receive -> send channel forwarding
pub mod publisher; // Kafka publish loop, throughput tracking
pub mod fetcher; // adaptive fetch cycle with lag admission control
pub mod telemetry; // atomic counters, JSON snapshot
pub mod pipeline; // job wiring: clients, channels, tasks

// Re-export commonly used types
pub use cursor::{Cursor, PageVerdict};
pub use errors::{FetchTaskError, LagError, PublishError, SourceError};
pub use fetcher::CycleOutcome;
pub use lag::LagProbe;
pub use models::Player;
pub use publisher::{RecordSink, Throughput};
pub use source::PageSource;
pub use telemetry::HarvestMetrics;
