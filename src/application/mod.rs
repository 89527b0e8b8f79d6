mod metadata_extractor;

pub use metadata_extractor::{CdnTrustPolicy, MetadataExtractor};
