//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use coursework_core::types::DbId;
use coursework_db::models::course::{Course, CreateCourse};
use coursework_db::models::course_member::CreateCourseMember;
use coursework_db::models::example::{CreateExample, Example};
use coursework_db::models::example_deployment::DeployExample;
use coursework_db::models::example_version::CreateExampleVersion;
use coursework_db::models::organization::CreateOrganization;
use coursework_db::models::user::{CreateUser, User};
use coursework_db::repositories::{
    CourseMemberRepo, CourseRepo, ExampleRepo, ExampleVersionRepo, OrganizationRepo, UserRepo,
};
use sqlx::PgPool;

pub async fn user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: None,
            given_name: None,
            family_name: None,
            role: None,
        },
    )
    .await
    .unwrap()
}

pub async fn course(pool: &PgPool, path: &str) -> Course {
    let org = OrganizationRepo::create(
        pool,
        &CreateOrganization {
            path: format!("org-{path}"),
            title: "Org".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    CourseRepo::create(
        pool,
        &CreateCourse {
            organization_id: org.id,
            path: path.to_string(),
            title: "Course".to_string(),
            description: None,
            repository_url: None,
            repository_branch: None,
        },
    )
    .await
    .unwrap()
}

pub async fn member(pool: &PgPool, course_id: DbId, user_id: DbId, role: &str) {
    CourseMemberRepo::create(
        pool,
        course_id,
        &CreateCourseMember {
            user_id,
            role: role.to_string(),
        },
    )
    .await
    .unwrap();
}

/// An example with one version per tag, created in order.
pub async fn example_with_versions(pool: &PgPool, identifier: &str, tags: &[&str]) -> Example {
    let example = ExampleRepo::create(
        pool,
        &CreateExample {
            identifier: identifier.to_string(),
            title: "Example".to_string(),
            description: None,
            category: None,
            tags: vec![],
        },
        None,
    )
    .await
    .unwrap();
    for tag in tags {
        ExampleVersionRepo::create(pool, example.id, &version(tag), None)
            .await
            .unwrap()
            .unwrap();
    }
    example
}

pub fn version(tag: &str) -> CreateExampleVersion {
    CreateExampleVersion {
        version_tag: tag.to_string(),
        storage_path: None,
        meta: None,
    }
}

pub fn deploy_request(identifier: &str, tag: Option<&str>, path: &str) -> DeployExample {
    DeployExample {
        example_identifier: identifier.to_string(),
        version_tag: tag.map(str::to_string),
        deployment_path: path.to_string(),
        metadata: None,
    }
}
