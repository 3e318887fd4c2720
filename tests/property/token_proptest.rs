//! Token authority properties

use proptest::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use community_identity::backend::auth::tokens::{
    InvalidToken, TokenAuthority, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS,
};
use community_identity::shared::clock::ManualClock;

const SECRET: &str = "property-test-secret-0123456789abcdef";

fn authority(start: i64) -> (TokenAuthority, ManualClock) {
    let clock = ManualClock::at_secs(start);
    let tokens = TokenAuthority::new(SECRET, Arc::new(clock.clone())).expect("authority");
    (tokens, clock)
}

proptest! {
    #[test]
    fn prop_access_token_valid_until_ttl(
        seed in any::<u128>(),
        start in 1_600_000_000i64..2_000_000_000,
        elapsed in 0i64..ACCESS_TOKEN_TTL_SECS,
    ) {
        let (tokens, clock) = authority(start);
        let user_id = Uuid::from_u128(seed);
        let issued = tokens.issue_access(user_id, "prop@example.com").expect("issue");
        prop_assert_eq!(issued.expires_at.timestamp(), start + ACCESS_TOKEN_TTL_SECS);

        clock.advance_secs(elapsed);
        let claims = tokens.verify_access(&issued.token).expect("verify");
        prop_assert_eq!(claims.user_id().expect("subject"), user_id);
        prop_assert_eq!(claims.email.as_deref(), Some("prop@example.com"));

        clock.set_secs(start + ACCESS_TOKEN_TTL_SECS);
        prop_assert_eq!(tokens.verify_access(&issued.token), Err(InvalidToken::Expired));
    }

    #[test]
    fn prop_refresh_token_lives_seven_days(
        seed in any::<u128>(),
        elapsed in 0i64..REFRESH_TOKEN_TTL_SECS,
    ) {
        let (tokens, clock) = authority(1_704_067_200);
        let issued = tokens.issue_refresh(Uuid::from_u128(seed)).expect("issue");

        clock.advance_secs(elapsed);
        prop_assert!(tokens.verify_refresh(&issued.token).is_ok());
        prop_assert_eq!(tokens.verify_access(&issued.token), Err(InvalidToken::WrongKind));
    }

    #[test]
    fn prop_any_byte_flip_is_rejected(seed in any::<u128>(), index in any::<prop::sample::Index>()) {
        let (tokens, _) = authority(1_704_067_200);
        let issued = tokens.issue_access(Uuid::from_u128(seed), "flip@example.com").expect("issue");

        let mut bytes = issued.token.into_bytes();
        let i = index.index(bytes.len());
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("ascii token");

        prop_assert!(tokens.verify_access(&tampered).is_err());
    }
}

#[test]
fn test_other_secret_is_rejected() {
    let (tokens, clock) = authority(1_704_067_200);
    let other = TokenAuthority::new("another-secret-another-secret-another", Arc::new(clock))
        .expect("authority");
    let issued = other.issue_access(Uuid::new_v4(), "x@example.com").expect("issue");
    assert_eq!(tokens.verify_access(&issued.token), Err(InvalidToken::BadSignature));
}
