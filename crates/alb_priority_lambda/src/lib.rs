//! AWS-oriented adapters and handlers for ALB rule priority allocation.
//!
//! This crate owns runtime integration details (the CloudFormation callback,
//! the custom-resource lifecycle dispatch and the failure-reporting entry
//! point). Contract types and the allocation algorithm live in
//! `alb_priority_core`; the AWS SDK and HTTP client are wired in the binary.

pub mod adapters;
pub mod handlers;
pub mod logging;
