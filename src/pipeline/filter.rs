// src/pipeline/filter.rs

//! Author filter engine.
//!
//! Evaluates a candidate post against the effective filter rules for one
//! channel (global rules with per-channel overrides already resolved, see
//! [`FilterRules::merged`]). Rules run in a fixed order and any failure
//! short-circuits to reject:
//!
//! 1. `min_followers` — follower count must be >= the threshold.
//! 2. `only_verified` — if set, the author must be verified.
//! 3. `blacklist_usernames` — exact, case-sensitive match rejects. The
//!    blacklist beats the whitelist: a username on both lists is rejected.
//! 4. `whitelist_usernames` — if non-empty, the author must appear. The
//!    whitelist adds a membership requirement; it never bypasses rules 1-3.
//!
//! Purely a function of its inputs; no text-based filtering happens here.

use crate::config::FilterRules;
use crate::models::Post;

/// Outcome of evaluating one post against the filter rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accept,
    Reject(RejectReason),
}

impl FilterDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, FilterDecision::Accept)
    }
}

/// Reason tag for a rejected post. Logged for observability, not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    BelowFollowerThreshold,
    NotVerified,
    Blacklisted,
    NotWhitelisted,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::BelowFollowerThreshold => "below_follower_threshold",
            RejectReason::NotVerified => "not_verified",
            RejectReason::Blacklisted => "blacklisted",
            RejectReason::NotWhitelisted => "not_whitelisted",
        }
    }
}

/// Evaluate a post against the effective rules for its channel.
pub fn evaluate(post: &Post, rules: &FilterRules) -> FilterDecision {
    let author = &post.author;

    if author.followers < rules.min_followers {
        return FilterDecision::Reject(RejectReason::BelowFollowerThreshold);
    }

    if rules.only_verified && !author.verified {
        return FilterDecision::Reject(RejectReason::NotVerified);
    }

    if rules
        .blacklist_usernames
        .iter()
        .any(|u| u == &author.username)
    {
        return FilterDecision::Reject(RejectReason::Blacklisted);
    }

    if !rules.whitelist_usernames.is_empty()
        && !rules
            .whitelist_usernames
            .iter()
            .any(|u| u == &author.username)
    {
        return FilterDecision::Reject(RejectReason::NotWhitelisted);
    }

    FilterDecision::Accept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterOverrides;
    use crate::models::Author;
    use chrono::Utc;

    fn make_post(username: &str, followers: u64, verified: bool) -> Post {
        Post {
            id: "1".to_string(),
            text: "body".to_string(),
            author: Author {
                id: "10".to_string(),
                name: username.to_string(),
                username: username.to_string(),
                followers,
                verified,
            },
            media_urls: vec![],
            created_at: Utc::now(),
            like_count: 0,
            retweet_count: 0,
        }
    }

    fn rules() -> FilterRules {
        FilterRules::default()
    }

    #[test]
    fn accepts_by_default() {
        let post = make_post("anyone", 0, false);
        assert_eq!(evaluate(&post, &rules()), FilterDecision::Accept);
    }

    #[test]
    fn rejects_below_follower_threshold_regardless_of_other_fields() {
        let rules = FilterRules {
            min_followers: 100,
            whitelist_usernames: vec!["vip".into()],
            ..rules()
        };
        let post = make_post("vip", 99, true);
        assert_eq!(
            evaluate(&post, &rules),
            FilterDecision::Reject(RejectReason::BelowFollowerThreshold)
        );
    }

    #[test]
    fn rejects_unverified_when_required() {
        let rules = FilterRules {
            only_verified: true,
            ..rules()
        };
        assert_eq!(
            evaluate(&make_post("user", 1000, false), &rules),
            FilterDecision::Reject(RejectReason::NotVerified)
        );
        assert_eq!(
            evaluate(&make_post("user", 1000, true), &rules),
            FilterDecision::Accept
        );
    }

    #[test]
    fn blacklist_beats_whitelist() {
        let rules = FilterRules {
            blacklist_usernames: vec!["both".into()],
            whitelist_usernames: vec!["both".into()],
            ..rules()
        };
        assert_eq!(
            evaluate(&make_post("both", 1000, true), &rules),
            FilterDecision::Reject(RejectReason::Blacklisted)
        );
    }

    #[test]
    fn blacklist_match_is_case_sensitive() {
        let rules = FilterRules {
            blacklist_usernames: vec!["BadActor".into()],
            ..rules()
        };
        assert_eq!(
            evaluate(&make_post("BadActor", 10, false), &rules),
            FilterDecision::Reject(RejectReason::Blacklisted)
        );
        // Different case is a different username
        assert_eq!(
            evaluate(&make_post("badactor", 10, false), &rules),
            FilterDecision::Accept
        );
    }

    #[test]
    fn nonempty_whitelist_requires_membership() {
        let rules = FilterRules {
            whitelist_usernames: vec!["vip".into()],
            ..rules()
        };
        assert_eq!(
            evaluate(&make_post("vip", 0, false), &rules),
            FilterDecision::Accept
        );
        assert_eq!(
            evaluate(&make_post("other", 0, false), &rules),
            FilterDecision::Reject(RejectReason::NotWhitelisted)
        );
    }

    #[test]
    fn whitelisted_author_still_subject_to_verified_rule() {
        let rules = FilterRules {
            only_verified: true,
            whitelist_usernames: vec!["vip".into()],
            ..rules()
        };
        assert_eq!(
            evaluate(&make_post("vip", 1000, false), &rules),
            FilterDecision::Reject(RejectReason::NotVerified)
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let rules = FilterRules {
            min_followers: 10,
            only_verified: true,
            blacklist_usernames: vec!["x".into()],
            whitelist_usernames: vec!["y".into()],
        };
        let post = make_post("y", 50, true);
        let first = evaluate(&post, &rules);
        for _ in 0..10 {
            assert_eq!(evaluate(&post, &rules), first);
        }
    }

    // Global defaults with a per-channel override of
    // {min_followers: 500, only_verified: true}.
    #[test]
    fn override_scenario_verified_1000_accepted_unverified_rejected() {
        let global = FilterRules {
            min_followers: 0,
            only_verified: false,
            ..FilterRules::default()
        };
        let overrides = FilterOverrides {
            min_followers: Some(500),
            only_verified: Some(true),
            ..FilterOverrides::default()
        };
        let effective = global.merged(&overrides);

        assert_eq!(
            evaluate(&make_post("verified_author", 1000, true), &effective),
            FilterDecision::Accept
        );
        assert_eq!(
            evaluate(&make_post("plain_author", 1000, false), &effective),
            FilterDecision::Reject(RejectReason::NotVerified)
        );
    }
}
