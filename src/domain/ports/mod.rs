mod country_resolver;
mod tracking_recorder;

pub use country_resolver::{CountryResolver, ResolverError};
pub use tracking_recorder::{BoxError, TrackingError, TrackingRecorder};
