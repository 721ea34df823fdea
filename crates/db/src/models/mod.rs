//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO implementing
//!   [`EntityInterface`](coursework_core::dto::EntityInterface)
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod course;
pub mod course_content;
pub mod course_content_deployment;
pub mod course_member;
pub mod deployment_history;
pub mod example;
pub mod example_deployment;
pub mod example_version;
pub mod organization;
pub mod user;

use coursework_core::dto::EntityRegistry;

/// Registry of every create DTO, keyed by entity name.
pub fn entity_registry() -> EntityRegistry {
    EntityRegistry::new()
        .register::<user::CreateUser>()
        .register::<organization::CreateOrganization>()
        .register::<course::CreateCourse>()
        .register::<course_member::CreateCourseMember>()
        .register::<course_content::CreateCourseContent>()
        .register::<example::CreateExample>()
        .register::<example_version::CreateExampleVersion>()
        .register::<example_deployment::DeployExample>()
        .register::<course_content_deployment::AssignExample>()
}
