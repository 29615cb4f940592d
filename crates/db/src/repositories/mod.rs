//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod article_repo;
pub mod banner_repo;
pub mod excel_file_repo;
pub mod section_repo;
pub mod user_repo;
pub mod video_repo;
pub mod workflow_repo;

pub use article_repo::ArticleRepo;
pub use banner_repo::BannerRepo;
pub use excel_file_repo::ExcelFileRepo;
pub use section_repo::SectionRepo;
pub use user_repo::UserRepo;
pub use video_repo::VideoRepo;
pub use workflow_repo::WorkflowRepo;
