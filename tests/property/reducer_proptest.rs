//! Auth state invariants over arbitrary event sequences

use chrono::DateTime;
use proptest::prelude::*;

use community_identity::client::{reduce, AuthEvent, AuthState, PersistedSession, SessionPreload};
use community_identity::shared::identity::{IdentityUpdate, PublicIdentity, UserType};
use uuid::Uuid;

fn preload(seed: u128, expires: i64) -> SessionPreload {
    let epoch = DateTime::from_timestamp(0, 0).expect("epoch");
    SessionPreload {
        user: PublicIdentity {
            id: Uuid::from_u128(seed),
            email: format!("user{}@example.com", seed),
            username: format!("user{}", seed),
            display_name: None,
            avatar: None,
            user_type: UserType::Player,
            is_verified: false,
            is_active: true,
            is_banned: false,
            created_at: epoch,
            updated_at: epoch,
            last_login_at: None,
        },
        expires_at: DateTime::from_timestamp(expires, 0).expect("expiry"),
    }
}

fn event_strategy() -> impl Strategy<Value = AuthEvent> {
    let expiry = 1i64..4_000_000_000;
    prop_oneof![
        Just(AuthEvent::SignInPending),
        (any::<u128>(), expiry.clone()).prop_map(|(seed, exp)| AuthEvent::SignInFulfilled(preload(seed, exp))),
        "[a-z ]{0,12}".prop_map(AuthEvent::SignInRejected),
        Just(AuthEvent::RefreshPending),
        expiry.clone().prop_map(|exp| AuthEvent::RefreshFulfilled {
            expires_at: DateTime::from_timestamp(exp, 0).expect("expiry"),
        }),
        "[a-z ]{0,12}".prop_map(AuthEvent::RefreshRejected),
        Just(AuthEvent::SignOutPending),
        Just(AuthEvent::SignOutSettled),
        Just(AuthEvent::OptimisticLogout),
        proptest::option::of((any::<u128>(), expiry.clone()))
            .prop_map(|p| AuthEvent::SetCurrentUser(p.map(|(seed, exp)| preload(seed, exp)))),
        (any::<u128>(), expiry).prop_map(|(seed, exp)| {
            let payload = preload(seed, exp);
            AuthEvent::Restored(PersistedSession {
                user: payload.user.to_current_user(),
                expires_at: payload.expires_at,
            })
        }),
        Just(AuthEvent::Superseded),
        proptest::option::of("[a-z]{3,10}").prop_map(|username| AuthEvent::UpdateIdentity(IdentityUpdate {
            username,
            ..Default::default()
        })),
        Just(AuthEvent::ClearError),
    ]
}

fn assert_consistent(state: &AuthState) {
    assert_eq!(state.is_authenticated, state.current_user.is_some());
    assert_eq!(state.is_authenticated, state.session_expires_at.is_some());
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_every_event(events in prop::collection::vec(event_strategy(), 0..40)) {
        let mut state = AuthState::anonymous();
        for event in events {
            state = reduce(state, event);
            assert_consistent(&state);
        }
    }

    #[test]
    fn prop_logout_always_leaves_anonymous(events in prop::collection::vec(event_strategy(), 0..40)) {
        let state = events.into_iter().fold(AuthState::anonymous(), reduce);
        let state = reduce(state, AuthEvent::OptimisticLogout);
        prop_assert!(!state.is_authenticated);
        prop_assert!(state.current_user.is_none());
        prop_assert!(state.session_expires_at.is_none());

        let settled = reduce(reduce(state, AuthEvent::SignOutPending), AuthEvent::SignOutSettled);
        prop_assert!(!settled.is_loading);
        prop_assert!(settled.error.is_none());
    }

    #[test]
    fn prop_refresh_never_changes_identity(
        events in prop::collection::vec(event_strategy(), 0..20),
        exp in 1i64..4_000_000_000,
    ) {
        let state = events.into_iter().fold(AuthState::anonymous(), reduce);
        let refreshed = reduce(
            state.clone(),
            AuthEvent::RefreshFulfilled { expires_at: DateTime::from_timestamp(exp, 0).expect("expiry") },
        );
        prop_assert_eq!(&refreshed.current_user, &state.current_user);
        prop_assert_eq!(refreshed.is_authenticated, state.is_authenticated);
    }
}
