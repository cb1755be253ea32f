pub mod fetcher;
pub mod source;

pub use fetcher::Fetcher;
pub use source::{BookUrl, Capability, MetadataSource, SourceInfo, TouchedField};
