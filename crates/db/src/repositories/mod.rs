//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod option_draft_repo;
pub mod ordering;
pub mod publish_repo;
pub mod question_draft_repo;
pub mod question_repo;
pub mod restore_repo;
pub mod survey_repo;

pub use option_draft_repo::OptionDraftRepo;
pub use publish_repo::PublishRepo;
pub use question_draft_repo::QuestionDraftRepo;
pub use question_repo::QuestionRepo;
pub use restore_repo::RestoreRepo;
pub use survey_repo::SurveyRepo;
