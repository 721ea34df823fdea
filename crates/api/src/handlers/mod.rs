pub mod access;
pub mod content_deployment;
pub mod course;
pub mod course_content;
pub mod course_member;
pub mod deployment;
pub mod deployment_history;
pub mod example;
pub mod example_version;
pub mod organization;
pub mod repository;
pub mod user;
pub mod validation;
