// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Policy model and pattern matcher.
//!
//! A policy is an ordered set of statements, each granting or denying one
//! (resource pattern, action pattern) pair. Statements are parsed from a
//! fixed five-field, comma-separated line grammar:
//!
//! ```text
//! p, <principal>, <resourcePattern>, <actionPattern>, <EFFECT>
//! ```
//!
//! The leading field is the literal `p`; the second field names the policy
//! the line belongs to and is not used for matching. Patterns are HRNs whose
//! segments may be the wildcard `*`, which matches any single value in that
//! position. The organization segment never wildcards: a pattern scoped to
//! one organization can never match a resource or action in another.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::hrn::{ActionHrn, ResourceHrn, WILDCARD};

// =============================================================================
// Effect
// =============================================================================

/// The effect of a policy statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effect {
    /// The statement grants the matched request.
    Allow,
    /// The statement denies the matched request, overriding any allow.
    Deny,
}

impl Effect {
    /// Returns the effect name as it appears in statement lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "ALLOW",
            Effect::Deny => "DENY",
        }
    }

    /// Parses an effect from a statement field.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ALLOW" | "allow" => Some(Effect::Allow),
            "DENY" | "deny" => Some(Effect::Deny),
            _ => None,
        }
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// PolicyStatement
// =============================================================================

/// One rule inside a policy. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// The resource pattern this statement applies to.
    pub resource_pattern: ResourceHrn,
    /// The action pattern this statement applies to.
    pub action_pattern: ActionHrn,
    /// Whether a match grants or denies the request.
    pub effect: Effect,
}

impl PolicyStatement {
    /// Creates a statement from already-parsed patterns.
    pub fn new(resource_pattern: ResourceHrn, action_pattern: ActionHrn, effect: Effect) -> Self {
        Self {
            resource_pattern,
            action_pattern,
            effect,
        }
    }

    /// Parses a single statement line.
    ///
    /// The line must have exactly five comma-separated fields with the
    /// literal `p` first. Anything else is [`PolicyError::MalformedStatement`];
    /// no alternate grammars are accepted.
    pub fn parse(line: &str) -> Result<Self, PolicyError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 5 {
            return Err(PolicyError::malformed(
                line,
                format!("expected 5 fields, found {}", fields.len()),
            ));
        }
        if fields[0] != "p" {
            return Err(PolicyError::malformed(line, "expected leading literal 'p'"));
        }

        let resource_pattern = ResourceHrn::parse(fields[2])
            .map_err(|e| PolicyError::malformed(line, format!("bad resource pattern: {e}")))?;
        let action_pattern = ActionHrn::parse(fields[3])
            .map_err(|e| PolicyError::malformed(line, format!("bad action pattern: {e}")))?;
        let effect = Effect::parse(fields[4])
            .ok_or_else(|| PolicyError::malformed(line, format!("bad effect '{}'", fields[4])))?;

        Ok(Self::new(resource_pattern, action_pattern, effect))
    }

    /// Returns `true` if this statement applies to the given request.
    pub fn matches(&self, resource: &ResourceHrn, action: &ActionHrn) -> bool {
        resource_matches(&self.resource_pattern, resource)
            && action_matches(&self.action_pattern, action)
    }
}

// =============================================================================
// Pattern Matching
// =============================================================================

#[inline]
fn segment_matches(pattern: &str, value: &str) -> bool {
    pattern == WILDCARD || pattern == value
}

#[inline]
fn optional_segment_matches(pattern: Option<&str>, value: Option<&str>) -> bool {
    match (pattern, value) {
        (None, None) => true,
        (Some(p), Some(v)) => segment_matches(p, v),
        // Absent and present segments are distinct states; a wildcard only
        // matches a value that exists.
        _ => false,
    }
}

/// Returns `true` if `value` falls under `pattern`.
///
/// The organization segment must compare exactly even under wildcarding.
pub fn resource_matches(pattern: &ResourceHrn, value: &ResourceHrn) -> bool {
    pattern.organization() == value.organization()
        && optional_segment_matches(pattern.sub_organization(), value.sub_organization())
        && segment_matches(pattern.resource_type(), value.resource_type())
        && optional_segment_matches(pattern.resource_instance(), value.resource_instance())
}

/// Returns `true` if `value` falls under `pattern`.
///
/// The organization segment must compare exactly even under wildcarding.
pub fn action_matches(pattern: &ActionHrn, value: &ActionHrn) -> bool {
    pattern.organization() == value.organization()
        && optional_segment_matches(pattern.sub_organization(), value.sub_organization())
        && segment_matches(pattern.resource_type(), value.resource_type())
        && segment_matches(pattern.action(), value.action())
}

// =============================================================================
// Policy
// =============================================================================

/// A named, versioned set of statements owned by one organization.
///
/// Statement order is preserved for display and audit; it has no effect on
/// evaluation. Any statement-set mutation bumps `version`, which the store
/// uses for optimistic concurrency control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// The policy's own HRN.
    pub hrn: ResourceHrn,
    /// Display name, unique within the owning organization.
    pub name: String,
    /// Monotonic version, bumped on every statement-set change.
    pub version: u64,
    /// Free-form description.
    pub description: String,
    statements: Vec<PolicyStatement>,
}

impl Policy {
    /// Creates a version-1 policy from already-parsed statements.
    pub fn new(
        hrn: ResourceHrn,
        name: impl Into<String>,
        description: impl Into<String>,
        statements: Vec<PolicyStatement>,
    ) -> Self {
        Self {
            hrn,
            name: name.into(),
            version: 1,
            description: description.into(),
            statements,
        }
    }

    /// Parses a policy body where each non-empty line is one statement.
    pub fn from_lines(
        hrn: ResourceHrn,
        name: impl Into<String>,
        description: impl Into<String>,
        body: &str,
    ) -> Result<Self, PolicyError> {
        let statements = parse_statements(body)?;
        Ok(Self::new(hrn, name, description, statements))
    }

    /// Returns the statements in declaration order.
    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    /// Returns a copy with a replaced statement set and a bumped version.
    pub fn with_statements(&self, statements: Vec<PolicyStatement>) -> Self {
        Self {
            hrn: self.hrn.clone(),
            name: self.name.clone(),
            version: self.version + 1,
            description: self.description.clone(),
            statements,
        }
    }
}

/// Parses a raw policy body into statements, one per non-empty line.
pub fn parse_statements(body: &str) -> Result<Vec<PolicyStatement>, PolicyError> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PolicyStatement::parse)
        .collect()
}

// =============================================================================
// PrincipalPolicyAttachment
// =============================================================================

/// A many-to-many edge between a principal and a policy.
///
/// Attachment and detachment are the only mutations on this relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalPolicyAttachment {
    /// The principal side of the edge.
    pub principal_hrn: ResourceHrn,
    /// The policy side of the edge.
    pub policy_hrn: ResourceHrn,
}

impl PrincipalPolicyAttachment {
    /// Creates an attachment edge.
    pub fn new(principal_hrn: ResourceHrn, policy_hrn: ResourceHrn) -> Self {
        Self {
            principal_hrn,
            policy_hrn,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(s: &str) -> ResourceHrn {
        ResourceHrn::parse(s).unwrap()
    }

    fn action(s: &str) -> ActionHrn {
        ActionHrn::parse(s).unwrap()
    }

    #[test]
    fn test_parse_statement() {
        let stmt =
            PolicyStatement::parse("p, hrn:acme:iam-policy/admin, hrn:acme:widget/*, hrn:acme:widget$read, ALLOW")
                .unwrap();
        assert_eq!(stmt.effect, Effect::Allow);
        assert_eq!(stmt.resource_pattern.resource_instance(), Some("*"));
        assert_eq!(stmt.action_pattern.action(), "read");
    }

    #[test]
    fn test_malformed_statements() {
        for line in [
            "",
            "p, a, b, c",
            "p, a, b, c, d, e",
            "q, x, hrn:acme:widget/*, hrn:acme:widget$read, ALLOW",
            "p, x, not-an-hrn, hrn:acme:widget$read, ALLOW",
            "p, x, hrn:acme:widget/*, not-an-hrn, ALLOW",
            "p, x, hrn:acme:widget/*, hrn:acme:widget$read, MAYBE",
            // Patterns must be the right HRN shape on each side.
            "p, x, hrn:acme:widget$read, hrn:acme:widget$read, ALLOW",
            "p, x, hrn:acme:widget/*, hrn:acme:widget/1, DENY",
        ] {
            assert!(
                PolicyStatement::parse(line).is_err(),
                "expected failure for {line:?}"
            );
        }
    }

    #[test]
    fn test_wildcard_matches_single_segment() {
        let pattern = resource("hrn:acme:widget/*");
        assert!(resource_matches(&pattern, &resource("hrn:acme:widget/42")));
        assert!(resource_matches(&pattern, &resource("hrn:acme:widget/43")));
        // Wildcard matches a value, not the absence of one.
        assert!(!resource_matches(&pattern, &resource("hrn:acme:widget")));
        // Other segments still compare exactly.
        assert!(!resource_matches(&pattern, &resource("hrn:acme:gadget/42")));
    }

    #[test]
    fn test_wildcard_never_crosses_organizations() {
        let pattern = resource("hrn:org1:widget/*");
        assert!(!resource_matches(&pattern, &resource("hrn:org2:widget/42")));

        let action_pattern = action("hrn:org1:widget$*");
        assert!(!action_matches(&action_pattern, &action("hrn:org2:widget$read")));
    }

    #[test]
    fn test_sub_organization_scoping() {
        let scoped = resource("hrn:acme:emea:widget/*");
        assert!(resource_matches(&scoped, &resource("hrn:acme:emea:widget/1")));
        assert!(!resource_matches(&scoped, &resource("hrn:acme:widget/1")));
        assert!(!resource_matches(&scoped, &resource("hrn:acme:apac:widget/1")));

        // A sub-organization wildcard requires a sub-organization to exist.
        let any_sub = resource("hrn:acme:*:widget/1");
        assert!(resource_matches(&any_sub, &resource("hrn:acme:emea:widget/1")));
        assert!(resource_matches(&any_sub, &resource("hrn:acme::widget/1")));
        assert!(!resource_matches(&any_sub, &resource("hrn:acme:widget/1")));
    }

    #[test]
    fn test_statement_matching_requires_both_patterns() {
        let stmt = PolicyStatement::parse(
            "p, x, hrn:acme:widget/*, hrn:acme:widget$read, ALLOW",
        )
        .unwrap();

        assert!(stmt.matches(&resource("hrn:acme:widget/42"), &action("hrn:acme:widget$read")));
        assert!(!stmt.matches(&resource("hrn:acme:widget/42"), &action("hrn:acme:widget$delete")));
        assert!(!stmt.matches(&resource("hrn:acme:gadget/42"), &action("hrn:acme:widget$read")));
    }

    #[test]
    fn test_policy_from_lines() {
        let body = "\
            p, x, hrn:acme:widget/*, hrn:acme:widget$read, ALLOW\n\
            \n\
            p, x, hrn:acme:widget/13, hrn:acme:widget$read, DENY\n";
        let policy = Policy::from_lines(
            ResourceHrn::policy("acme", "widget-readers").unwrap(),
            "widget-readers",
            "read access to widgets",
            body,
        )
        .unwrap();

        assert_eq!(policy.version, 1);
        assert_eq!(policy.statements().len(), 2);
        assert_eq!(policy.statements()[1].effect, Effect::Deny);
    }

    #[test]
    fn test_policy_version_bumps_on_statement_change() {
        let policy = Policy::new(
            ResourceHrn::policy("acme", "empty").unwrap(),
            "empty",
            "",
            vec![],
        );
        let updated = policy.with_statements(vec![PolicyStatement::parse(
            "p, x, hrn:acme:widget/*, hrn:acme:widget$read, ALLOW",
        )
        .unwrap()]);

        assert_eq!(policy.version, 1);
        assert_eq!(updated.version, 2);
        assert_eq!(updated.statements().len(), 1);
    }
}
