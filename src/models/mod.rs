pub mod grade;
pub mod loaders;
pub mod project;
pub mod record;
pub mod summary;

pub use grade::{GradeReport, QuestionGrade, StudentReport};
pub use loaders::{load_all_manifests, load_manifest, ProjectManifest};
pub use project::{GradingMode, ProjectConfig, ProjectRequest, ReferenceMaterial, Submission};
pub use record::{GradingResponse, ProjectRecord, ProjectSummary};
pub use summary::{LetterGrade, StatisticsSummary};
