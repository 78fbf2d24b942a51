//! Services module
//!
//! Contains the Elastic Beanstalk integration and the naming helpers built
//! on its responses.

pub mod beanstalk;
pub mod naming;

pub use beanstalk::{BeanstalkApi, EnvironmentDescription};
pub use naming::{elb_name_from_endpoint, find_solution_stack, is_matching_solution_stack};
