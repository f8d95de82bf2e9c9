pub mod candidate;
pub mod language_policy;
pub mod tag_policy;

pub use candidate::{Candidate, CandidateMetadata, Entry, NO_RESULT_SOURCE, NO_RESULT_TEXT};
pub use language_policy::LanguagePolicy;
pub use tag_policy::TagPolicy;
