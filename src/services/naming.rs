//! Name derivation helpers
//!
//! Pure string functions used by the facade. They never touch the network.

use crate::error::{BeanstalkError, Result};

/// Derive a load balancer name from an environment endpoint URL.
///
/// Takes the host label before the first `.`, then drops everything from the
/// last `-` of that label onward. For a classic load-balanced environment the
/// endpoint looks like `awseb-e-abc-AWSEBLoa-1XYZ-123456789.us-east-1.elb.amazonaws.com`
/// and the result is the ELB name `awseb-e-abc-AWSEBLoa-1XYZ`.
///
/// This is tied to the format AWS uses today; any other URL shape is
/// reported as [`BeanstalkError::MalformedEndpoint`].
pub fn elb_name_from_endpoint(endpoint_url: &str) -> Result<&str> {
    let malformed = || BeanstalkError::MalformedEndpoint(endpoint_url.to_string());

    let (host_label, _) = endpoint_url.split_once('.').ok_or_else(malformed)?;
    let (name, _) = host_label.rsplit_once('-').ok_or_else(malformed)?;

    if name.is_empty() {
        return Err(malformed());
    }
    Ok(name)
}

/// Whether `stack` is an `os` image running `platform`.
pub fn is_matching_solution_stack(stack: &str, os: &str, platform: &str) -> bool {
    stack.starts_with(os) && stack.contains(&format!(" running {}", platform))
}

/// First stack, in service order, that matches `os` and `platform`.
pub fn find_solution_stack<'a>(stacks: &'a [String], os: &str, platform: &str) -> Option<&'a str> {
    stacks
        .iter()
        .map(String::as_str)
        .find(|stack| is_matching_solution_stack(stack, os, platform))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elb_name_from_cname_style_endpoint() {
        let name = elb_name_from_endpoint("my-app-1234567890.us-east-1.elasticbeanstalk.com").unwrap();
        assert_eq!(name, "my-app");
    }

    #[test]
    fn test_elb_name_from_elb_endpoint() {
        let name = elb_name_from_endpoint(
            "awseb-e-x-AWSEBLoa-1ABCDEFGH-987654321.eu-west-1.elb.amazonaws.com",
        )
        .unwrap();
        assert_eq!(name, "awseb-e-x-AWSEBLoa-1ABCDEFGH");
    }

    #[test]
    fn test_elb_name_ignores_dashes_after_first_dot() {
        // Only the first host label is inspected
        let name = elb_name_from_endpoint("app-1.us-east-1.example.com").unwrap();
        assert_eq!(name, "app");
    }

    #[test]
    fn test_elb_name_without_dot_is_malformed() {
        let err = elb_name_from_endpoint("my-app-123").unwrap_err();
        assert!(matches!(err, BeanstalkError::MalformedEndpoint(ref u) if u == "my-app-123"));
    }

    #[test]
    fn test_elb_name_without_dash_is_malformed() {
        let err = elb_name_from_endpoint("myapp.us-east-1.elasticbeanstalk.com").unwrap_err();
        assert!(matches!(err, BeanstalkError::MalformedEndpoint(_)));
    }

    #[test]
    fn test_elb_name_leading_dash_is_malformed() {
        assert!(elb_name_from_endpoint("-123.example.com").is_err());
        assert!(elb_name_from_endpoint("").is_err());
    }

    #[test]
    fn test_stack_matching_requires_prefix_and_platform() {
        let stack = "64bit Amazon Linux 2018.03 v2.7.1 running Java 8";
        assert!(is_matching_solution_stack(stack, "64bit Amazon Linux", "Java 8"));
        assert!(!is_matching_solution_stack(stack, "64bit Windows", "Java 8"));
        assert!(!is_matching_solution_stack(stack, "64bit Amazon Linux", "Tomcat 8"));
        // " running " must precede the platform
        assert!(!is_matching_solution_stack(
            "64bit Amazon Linux Java 8",
            "64bit Amazon Linux",
            "Java 8"
        ));
    }

    #[test]
    fn test_find_solution_stack_keeps_service_order() {
        let stacks = vec![
            "64bit Windows Server 2016 v1.2.0 running IIS 10.0".to_string(),
            "64bit Amazon Linux 2018 v2 running Java 8".to_string(),
            "64bit Amazon Linux 2017 v1 running Java 8".to_string(),
        ];
        assert_eq!(
            find_solution_stack(&stacks, "64bit Amazon Linux", "Java 8"),
            Some("64bit Amazon Linux 2018 v2 running Java 8")
        );
        assert_eq!(find_solution_stack(&stacks, "64bit Amazon Linux", "Go 1"), None);
        assert_eq!(find_solution_stack(&[], "64bit Amazon Linux", "Java 8"), None);
    }
}
