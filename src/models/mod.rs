pub mod context;
pub mod grade;
pub mod loaders;
pub mod paper;
pub mod request;

pub use context::PaperContext;
pub use grade::{Grade, GradeResult, HighlightReference, SectionScore};
pub use loaders::{load_all_requests, load_request};
pub use paper::{session_raw_to_letter, PaperId, SessionCode};
pub use request::GradingRequest;
