pub mod delivery;
pub mod envelope;
pub mod orchestrator;
pub mod request;
pub mod time_range;

pub use delivery::DeliveryDefaults;
pub use envelope::{QueueEvent, QueueMessage};
pub use orchestrator::{GeneratorSettings, ReportGenerator, ReportOutcome};
pub use request::ReportRequest;
pub use time_range::TimeRange;
