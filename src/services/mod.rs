pub mod diagnostics_writer;
pub mod llm_service;
pub mod project_store;
pub mod prompt_builder;
pub mod statistics;
pub mod text_extractor;

pub use diagnostics_writer::DiagnosticsWriter;
pub use llm_service::{Generator, LlmService};
pub use project_store::{FsProjectStore, ProjectStore};
pub use prompt_builder::{build_prompt, build_prompt_for};
pub use text_extractor::{extract_file, PlainTextExtractor, TextExtractor};
