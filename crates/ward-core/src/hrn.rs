// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Hierarchical resource names.
//!
//! Every organization, sub-organization, user, policy and action in WARD is
//! addressed by an HRN. Two shapes exist:
//!
//! - **Resource HRN**: `hrn:<org>[:<subOrg>]:<resourceType>[/<instance>]`
//! - **Action HRN**:   `hrn:<org>[:<subOrg>]:<resourceType>$<action>`
//!
//! The sub-organization segment is written only when the HRN carries one, so
//! an absent sub-organization (`hrn:acme:user/alice`) and an empty-string
//! sub-organization (`hrn:acme::user/alice`) are distinct scopes and
//! round-trip losslessly.
//!
//! # Examples
//!
//! ```
//! use ward_core::hrn::{Hrn, ResourceHrn};
//!
//! let hrn = Hrn::parse("hrn:acme:user/alice").unwrap();
//! assert!(hrn.is_resource());
//! assert_eq!(hrn.organization(), "acme");
//! assert_eq!(hrn.to_string(), "hrn:acme:user/alice");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::HrnError;

/// The scheme prefix of every HRN.
pub const HRN_PREFIX: &str = "hrn";

/// The wildcard segment used in policy patterns.
pub const WILDCARD: &str = "*";

/// Resource types for the engine's own entities.
pub mod resources {
    /// A user principal.
    pub const USER: &str = "iam-user";
    /// A policy document.
    pub const POLICY: &str = "iam-policy";
    /// An organization record.
    pub const ORGANIZATION: &str = "iam-organization";
}

// =============================================================================
// Hrn Enum
// =============================================================================

/// A parsed hierarchical resource name.
///
/// Either a [`ResourceHrn`] (addressing an entity) or an [`ActionHrn`]
/// (addressing an operation on a resource type, used in policy statements).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Hrn {
    /// An entity address.
    Resource(ResourceHrn),
    /// An operation address.
    Action(ActionHrn),
}

impl Hrn {
    /// Parses an HRN string.
    ///
    /// Parsing is total and side-effect free; every failure is
    /// [`HrnError::Malformed`].
    pub fn parse(input: &str) -> Result<Self, HrnError> {
        let body = input
            .strip_prefix(HRN_PREFIX)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| HrnError::malformed(input, "missing 'hrn:' prefix"))?;

        let segments: Vec<&str> = body.split(':').collect();
        let (organization, sub_organization, tail) = match segments.as_slice() {
            [org, tail] => (*org, None, *tail),
            [org, sub, tail] => (*org, Some(*sub), *tail),
            _ => {
                return Err(HrnError::malformed(
                    input,
                    "expected 'hrn:<org>[:<subOrg>]:<resource>'",
                ))
            }
        };

        if let Some((resource_type, action)) = tail.split_once('$') {
            Ok(Hrn::Action(ActionHrn::new(
                organization,
                sub_organization,
                resource_type,
                action,
            )?))
        } else {
            let (resource_type, instance) = match tail.split_once('/') {
                Some((rt, inst)) => (rt, Some(inst)),
                None => (tail, None),
            };
            Ok(Hrn::Resource(ResourceHrn::new(
                organization,
                sub_organization,
                resource_type,
                instance,
            )?))
        }
    }

    /// Returns `true` if this is a resource HRN.
    #[inline]
    pub fn is_resource(&self) -> bool {
        matches!(self, Hrn::Resource(_))
    }

    /// Returns `true` if this is an action HRN.
    #[inline]
    pub fn is_action(&self) -> bool {
        matches!(self, Hrn::Action(_))
    }

    /// Attempts to view this as a resource HRN.
    #[inline]
    pub fn as_resource(&self) -> Option<&ResourceHrn> {
        match self {
            Hrn::Resource(hrn) => Some(hrn),
            Hrn::Action(_) => None,
        }
    }

    /// Attempts to view this as an action HRN.
    #[inline]
    pub fn as_action(&self) -> Option<&ActionHrn> {
        match self {
            Hrn::Action(hrn) => Some(hrn),
            Hrn::Resource(_) => None,
        }
    }

    /// Returns the organization segment.
    pub fn organization(&self) -> &str {
        match self {
            Hrn::Resource(hrn) => hrn.organization(),
            Hrn::Action(hrn) => hrn.organization(),
        }
    }

    /// Returns the sub-organization segment, if present.
    pub fn sub_organization(&self) -> Option<&str> {
        match self {
            Hrn::Resource(hrn) => hrn.sub_organization(),
            Hrn::Action(hrn) => hrn.sub_organization(),
        }
    }

    /// Returns the resource type segment.
    pub fn resource_type(&self) -> &str {
        match self {
            Hrn::Resource(hrn) => hrn.resource_type(),
            Hrn::Action(hrn) => hrn.resource_type(),
        }
    }
}

impl fmt::Display for Hrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hrn::Resource(hrn) => hrn.fmt(f),
            Hrn::Action(hrn) => hrn.fmt(f),
        }
    }
}

impl FromStr for Hrn {
    type Err = HrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hrn::parse(s)
    }
}

impl From<ResourceHrn> for Hrn {
    fn from(hrn: ResourceHrn) -> Self {
        Hrn::Resource(hrn)
    }
}

impl From<ActionHrn> for Hrn {
    fn from(hrn: ActionHrn) -> Self {
        Hrn::Action(hrn)
    }
}

// =============================================================================
// ResourceHrn
// =============================================================================

/// An HRN addressing an entity: organization, optional sub-organization,
/// resource type and optional resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHrn {
    organization: String,
    sub_organization: Option<String>,
    resource_type: String,
    resource_instance: Option<String>,
}

impl ResourceHrn {
    /// Creates a resource HRN, validating every segment.
    pub fn new(
        organization: impl Into<String>,
        sub_organization: Option<impl Into<String>>,
        resource_type: impl Into<String>,
        resource_instance: Option<impl Into<String>>,
    ) -> Result<Self, HrnError> {
        let organization = organization.into();
        let sub_organization = sub_organization.map(Into::into);
        let resource_type = resource_type.into();
        let resource_instance = resource_instance.map(Into::into);

        validate_organization(&organization)?;
        if let Some(sub) = &sub_organization {
            validate_segment(sub, "sub-organization", true)?;
        }
        validate_segment(&resource_type, "resource type", false)?;
        if let Some(instance) = &resource_instance {
            validate_segment(instance, "resource instance", false)?;
        }

        Ok(Self {
            organization,
            sub_organization,
            resource_type,
            resource_instance,
        })
    }

    /// Creates the HRN for a user principal in an organization.
    pub fn user(
        organization: impl Into<String>,
        sub_organization: Option<impl Into<String>>,
        username: impl Into<String>,
    ) -> Result<Self, HrnError> {
        Self::new(
            organization,
            sub_organization,
            resources::USER,
            Some(username),
        )
    }

    /// Creates the HRN for a policy in an organization.
    pub fn policy(
        organization: impl Into<String>,
        policy_name: impl Into<String>,
    ) -> Result<Self, HrnError> {
        Self::new(
            organization,
            None::<String>,
            resources::POLICY,
            Some(policy_name),
        )
    }

    /// Parses a resource HRN, rejecting action HRNs.
    pub fn parse(input: &str) -> Result<Self, HrnError> {
        match Hrn::parse(input)? {
            Hrn::Resource(hrn) => Ok(hrn),
            Hrn::Action(_) => Err(HrnError::malformed(input, "expected a resource HRN")),
        }
    }

    /// Returns the organization segment.
    #[inline]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Returns the sub-organization segment, if present.
    #[inline]
    pub fn sub_organization(&self) -> Option<&str> {
        self.sub_organization.as_deref()
    }

    /// Returns the resource type segment.
    #[inline]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the resource instance segment, if present.
    #[inline]
    pub fn resource_instance(&self) -> Option<&str> {
        self.resource_instance.as_deref()
    }
}

impl fmt::Display for ResourceHrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", HRN_PREFIX, self.organization)?;
        if let Some(sub) = &self.sub_organization {
            write!(f, ":{sub}")?;
        }
        write!(f, ":{}", self.resource_type)?;
        if let Some(instance) = &self.resource_instance {
            write!(f, "/{instance}")?;
        }
        Ok(())
    }
}

impl FromStr for ResourceHrn {
    type Err = HrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceHrn::parse(s)
    }
}

// =============================================================================
// ActionHrn
// =============================================================================

/// An HRN addressing an operation on a resource type, used inside policy
/// statements and authorization requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionHrn {
    organization: String,
    sub_organization: Option<String>,
    resource_type: String,
    action: String,
}

impl ActionHrn {
    /// Creates an action HRN, validating every segment.
    pub fn new(
        organization: impl Into<String>,
        sub_organization: Option<impl Into<String>>,
        resource_type: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self, HrnError> {
        let organization = organization.into();
        let sub_organization = sub_organization.map(Into::into);
        let resource_type = resource_type.into();
        let action = action.into();

        validate_organization(&organization)?;
        if let Some(sub) = &sub_organization {
            validate_segment(sub, "sub-organization", true)?;
        }
        validate_segment(&resource_type, "resource type", false)?;
        validate_segment(&action, "action", false)?;

        Ok(Self {
            organization,
            sub_organization,
            resource_type,
            action,
        })
    }

    /// Parses an action HRN, rejecting resource HRNs.
    pub fn parse(input: &str) -> Result<Self, HrnError> {
        match Hrn::parse(input)? {
            Hrn::Action(hrn) => Ok(hrn),
            Hrn::Resource(_) => Err(HrnError::malformed(input, "expected an action HRN")),
        }
    }

    /// Returns the organization segment.
    #[inline]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Returns the sub-organization segment, if present.
    #[inline]
    pub fn sub_organization(&self) -> Option<&str> {
        self.sub_organization.as_deref()
    }

    /// Returns the resource type segment.
    #[inline]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the action segment.
    #[inline]
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl fmt::Display for ActionHrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", HRN_PREFIX, self.organization)?;
        if let Some(sub) = &self.sub_organization {
            write!(f, ":{sub}")?;
        }
        write!(f, ":{}${}", self.resource_type, self.action)
    }
}

impl FromStr for ActionHrn {
    type Err = HrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionHrn::parse(s)
    }
}

// =============================================================================
// Segment Validation
// =============================================================================

const SEGMENT_DELIMITERS: [char; 4] = [':', '/', '$', ','];

fn validate_organization(segment: &str) -> Result<(), HrnError> {
    if segment == WILDCARD {
        // Wildcards never cross organization boundaries, so an organization
        // segment may not be a wildcard even in a pattern.
        return Err(HrnError::malformed(
            segment,
            "organization segment may not be a wildcard",
        ));
    }
    validate_segment(segment, "organization", false)
}

fn validate_segment(segment: &str, name: &str, allow_empty: bool) -> Result<(), HrnError> {
    if segment.is_empty() {
        if allow_empty {
            return Ok(());
        }
        return Err(HrnError::malformed(segment, format!("{name} segment is empty")));
    }
    if segment == WILDCARD {
        return Ok(());
    }
    if segment
        .chars()
        .any(|c| SEGMENT_DELIMITERS.contains(&c) || c.is_whitespace() || c == '*')
    {
        return Err(HrnError::malformed(
            segment,
            format!("{name} segment contains an invalid character"),
        ));
    }
    Ok(())
}

// =============================================================================
// Serde
// =============================================================================

macro_rules! hrn_string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(D::Error::custom)
            }
        }
    };
}

hrn_string_serde!(Hrn);
hrn_string_serde!(ResourceHrn);
hrn_string_serde!(ActionHrn);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_hrn() {
        let hrn = ResourceHrn::parse("hrn:acme:iam-user/alice").unwrap();
        assert_eq!(hrn.organization(), "acme");
        assert_eq!(hrn.sub_organization(), None);
        assert_eq!(hrn.resource_type(), "iam-user");
        assert_eq!(hrn.resource_instance(), Some("alice"));
    }

    #[test]
    fn test_parse_resource_hrn_with_sub_organization() {
        let hrn = ResourceHrn::parse("hrn:acme:emea:iam-user/alice").unwrap();
        assert_eq!(hrn.sub_organization(), Some("emea"));
    }

    #[test]
    fn test_parse_action_hrn() {
        let hrn = ActionHrn::parse("hrn:acme:widget$read").unwrap();
        assert_eq!(hrn.organization(), "acme");
        assert_eq!(hrn.resource_type(), "widget");
        assert_eq!(hrn.action(), "read");
    }

    #[test]
    fn test_round_trip() {
        for input in [
            "hrn:acme:iam-user/alice",
            "hrn:acme::iam-user/alice",
            "hrn:acme:emea:iam-user/alice",
            "hrn:acme:widget",
            "hrn:acme:widget/42",
            "hrn:acme:widget$read",
            "hrn:acme:emea:widget$delete",
            "hrn:acme:widget/*",
            "hrn:acme:widget$*",
        ] {
            let hrn = Hrn::parse(input).unwrap();
            assert_eq!(hrn.to_string(), input);
            assert_eq!(Hrn::parse(&hrn.to_string()).unwrap(), hrn);
        }
    }

    #[test]
    fn test_absent_and_empty_sub_organization_are_distinct() {
        let absent = Hrn::parse("hrn:acme:iam-user/alice").unwrap();
        let empty = Hrn::parse("hrn:acme::iam-user/alice").unwrap();

        assert_ne!(absent, empty);
        assert_eq!(absent.sub_organization(), None);
        assert_eq!(empty.sub_organization(), Some(""));
    }

    #[test]
    fn test_malformed_inputs() {
        for input in [
            "",
            "acme:iam-user/alice",
            "hrn:",
            "hrn:acme",
            "hrn::iam-user/alice",
            "hrn:acme:a:b:c:d",
            "hrn:acme:iam user/alice",
            "hrn:*:iam-user/alice",
            "hrn:acme:wid*get/1",
            "hrn:acme:widget/",
            "hrn:acme:widget$",
        ] {
            assert!(Hrn::parse(input).is_err(), "expected failure for {input:?}");
        }
    }

    #[test]
    fn test_capability_discrimination() {
        let resource = Hrn::parse("hrn:acme:widget/42").unwrap();
        assert!(resource.is_resource());
        assert!(resource.as_action().is_none());

        let action = Hrn::parse("hrn:acme:widget$read").unwrap();
        assert!(action.is_action());
        assert!(action.as_resource().is_none());

        assert!(ResourceHrn::parse("hrn:acme:widget$read").is_err());
        assert!(ActionHrn::parse("hrn:acme:widget/42").is_err());
    }

    #[test]
    fn test_equality_is_case_sensitive() {
        let lower = Hrn::parse("hrn:acme:widget/42").unwrap();
        let upper = Hrn::parse("hrn:Acme:widget/42").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_well_known_constructors() {
        let user = ResourceHrn::user("acme", None::<String>, "alice").unwrap();
        assert_eq!(user.to_string(), "hrn:acme:iam-user/alice");

        let policy = ResourceHrn::policy("acme", "admin-policy").unwrap();
        assert_eq!(policy.to_string(), "hrn:acme:iam-policy/admin-policy");
    }

    #[test]
    fn test_serde_round_trip() {
        let hrn = Hrn::parse("hrn:acme:emea:widget$read").unwrap();
        let json = serde_json::to_string(&hrn).unwrap();
        assert_eq!(json, "\"hrn:acme:emea:widget$read\"");
        let back: Hrn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hrn);
    }
}
