// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # HRN Integration Tests
//!
//! Parse/format round-trips, segment validation, wildcard placement and
//! sub-organization scoping.
//!
//! ## Test Categories
//!
//! - `test_roundtrip_*`: parse → format → parse stability
//! - `test_reject_*`: malformed inputs
//! - `test_scope_*`: organization and sub-organization semantics

use ward_core::hrn::{ActionHrn, Hrn, ResourceHrn};

use ward_tests::common::fixtures::HrnFixtures;
use ward_tests::common::init_test_logging;

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_roundtrip_every_shape() {
    init_test_logging();

    let inputs = [
        "hrn:acme:widget",
        "hrn:acme:widget/42",
        "hrn:acme:widget/*",
        "hrn:acme:engineering:widget/42",
        "hrn:acme::widget/42",
        "hrn:acme:widget$read",
        "hrn:acme:widget$*",
        "hrn:acme:engineering:widget$read",
        "hrn:acme:iam-user/alice",
    ];

    for input in inputs {
        let parsed = Hrn::parse(input).unwrap();
        assert_eq!(parsed.to_string(), input, "round trip failed for {input}");
        // A second pass over the formatted form must agree.
        assert_eq!(Hrn::parse(&parsed.to_string()).unwrap(), parsed);
    }
}

#[test]
fn test_roundtrip_distinguishes_absent_and_empty_sub_organization() {
    let absent = Hrn::parse("hrn:acme:widget/42").unwrap();
    let empty = Hrn::parse("hrn:acme::widget/42").unwrap();

    assert_ne!(absent, empty);
    assert_eq!(absent.sub_organization(), None);
    assert_eq!(empty.sub_organization(), Some(""));
    assert_eq!(absent.to_string(), "hrn:acme:widget/42");
    assert_eq!(empty.to_string(), "hrn:acme::widget/42");
}

#[test]
fn test_serde_uses_the_string_form() {
    let hrn = HrnFixtures::widget_42();
    let json = serde_json::to_string(&hrn).unwrap();
    assert_eq!(json, "\"hrn:acme:widget/42\"");

    let back: ResourceHrn = serde_json::from_str(&json).unwrap();
    assert_eq!(back, hrn);
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_reject_malformed_inputs() {
    let inputs = [
        "",
        "acme:widget/42",
        "hrn",
        "hrn:",
        "hrn:acme",
        "hrn:acme:a:b:widget/42",
        "hrn:*:widget/42",
        "hrn:acme:wid get/42",
        "hrn:acme:widget/4*2",
        "hrn:acme:widget$",
        "hrn:acme:$read",
    ];

    for input in inputs {
        assert!(Hrn::parse(input).is_err(), "expected rejection of {input:?}");
    }
}

#[test]
fn test_wildcard_is_a_whole_segment_only() {
    // Whole-segment wildcards are pattern syntax and parse fine.
    assert!(Hrn::parse("hrn:acme:widget/*").unwrap().is_resource());
    assert!(Hrn::parse("hrn:acme:*$*").unwrap().is_action());

    // Embedded wildcards are not.
    assert!(Hrn::parse("hrn:acme:wid*get/42").is_err());
    assert!(Hrn::parse("hrn:acme:widget/id-*").is_err());
    // And the organization can never be a wildcard.
    assert!(Hrn::parse("hrn:*:widget/42").is_err());
}

// =============================================================================
// Scoping and discrimination
// =============================================================================

#[test]
fn test_scope_accessors() {
    let carol = HrnFixtures::carol();
    assert_eq!(carol.organization(), "acme");
    assert_eq!(carol.sub_organization(), Some("engineering"));
    assert_eq!(carol.resource_type(), "iam-user");
    assert_eq!(carol.resource_instance(), Some("carol"));
}

#[test]
fn test_resource_and_action_shapes_are_distinct() {
    let resource = Hrn::parse("hrn:acme:widget/42").unwrap();
    assert!(resource.is_resource());
    assert!(resource.as_action().is_none());

    let action = Hrn::parse("hrn:acme:widget$read").unwrap();
    assert!(action.is_action());
    assert!(action.as_resource().is_none());

    // Typed parsers reject the other shape.
    assert!(ResourceHrn::parse("hrn:acme:widget$read").is_err());
    assert!(ActionHrn::parse("hrn:acme:widget/42").is_err());
}

#[test]
fn test_hrns_are_case_sensitive() {
    let lower = Hrn::parse("hrn:acme:widget/42").unwrap();
    let upper = Hrn::parse("hrn:ACME:widget/42").unwrap();
    assert_ne!(lower, upper);
}
