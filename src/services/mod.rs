pub mod answer_scan;
pub mod grade_normalizer;
pub mod mark_scheme_resolver;
pub mod prompt_builder;

pub use answer_scan::AnswerScanService;
pub use grade_normalizer::GradeNormalizer;
pub use mark_scheme_resolver::{FallbackReason, MarkSchemeResolver, MarkSchemeText};
pub use prompt_builder::PromptBuilder;
