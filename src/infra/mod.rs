//! Infrastructure layer - aws-sdk adapters behind the application port traits.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod ec2;
pub mod elb;
pub mod route53;
pub mod s3;
