//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` as the first argument. Methods that must join a caller's
//! transaction take an executor instead.

pub mod course_content_deployment_repo;
pub mod course_content_repo;
pub mod course_member_repo;
pub mod course_repo;
pub mod deployment_history_repo;
pub mod example_deployment_repo;
pub mod example_repo;
pub mod example_version_repo;
pub mod organization_repo;
pub mod user_repo;

pub use course_content_deployment_repo::{AssignOutcome, ContentRef, CourseContentDeploymentRepo};
pub use course_content_repo::CourseContentRepo;
pub use course_member_repo::CourseMemberRepo;
pub use course_repo::CourseRepo;
pub use deployment_history_repo::DeploymentHistoryRepo;
pub use example_deployment_repo::{DeployOutcome, DeploymentFilter, ExampleDeploymentRepo};
pub use example_repo::{ExampleFilter, ExampleRepo};
pub use example_version_repo::ExampleVersionRepo;
pub use organization_repo::OrganizationRepo;
pub use user_repo::UserRepo;
