mod maxmind_country_resolver;
mod sqlite_tracking_recorder;

pub use maxmind_country_resolver::MaxMindCountryResolver;
pub use sqlite_tracking_recorder::{
    SqliteTrackingRecorder, INSERT_LOGIN_TRACKING, LOGIN_TRACKING_SCHEMA,
};
