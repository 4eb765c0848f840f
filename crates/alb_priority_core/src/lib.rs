//! Shared ALB rule priority allocation primitives.
//!
//! This crate owns the CloudFormation custom-resource contract and the
//! priority allocation algorithm. It intentionally excludes AWS SDK and Lambda
//! runtime concerns; the load-balancing service is reached only through the
//! `RulePrioritySource` trait.

pub mod allocator;
pub mod contract;
