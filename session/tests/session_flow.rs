//! End-to-end session aggregation tests.
//!
//! Drives a live watcher with the mock providers and checks the published
//! state across sign-in/sign-out transitions, feed interleavings, feed
//! errors, stale-identity supersession, and teardown.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code can unwrap

use std::sync::Arc;
use std::time::Duration;
use taskfair_core::clock::SystemClock;
use taskfair_session::mocks::{MockAdminMarkerFeed, MockIdentityStream, MockProfileFeed};
use taskfair_session::{
    Identity, Profile, Role, SessionConfig, SessionEnvironment, SessionError, SessionHandle,
    SessionPhase, SessionState, SessionWatcher, UserId,
};

type TestEnv = SessionEnvironment<MockIdentityStream, MockProfileFeed, MockAdminMarkerFeed>;

struct Harness {
    handle: SessionHandle,
    identity: MockIdentityStream,
    profiles: MockProfileFeed,
    markers: MockAdminMarkerFeed,
}

fn test_env() -> (TestEnv, MockIdentityStream, MockProfileFeed, MockAdminMarkerFeed) {
    let config = SessionConfig::default();
    let identity = MockIdentityStream::new();
    let profiles = MockProfileFeed::deferred(&config);
    let markers = MockAdminMarkerFeed::deferred(&config);
    let env = SessionEnvironment::new(
        identity.clone(),
        profiles.clone(),
        markers.clone(),
        Arc::new(SystemClock),
    );
    (env, identity, profiles, markers)
}

fn spawn_harness() -> Harness {
    // Repeated init across tests in one binary is fine; only the first wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (env, identity, profiles, markers) = test_env();
    Harness {
        handle: SessionWatcher::spawn(env),
        identity,
        profiles,
        markers,
    }
}

fn identity_for(id: &str) -> Identity {
    Identity::new(id).with_email(format!("{id}@example.com"))
}

fn profile_for(id: &str, role: Role) -> Profile {
    Profile {
        id: UserId::new(id),
        display_name: id.to_string(),
        email: format!("{id}@example.com"),
        phone: None,
        role,
        created_at: chrono::Utc::now(),
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}

async fn wait_for(
    handle: &SessionHandle,
    predicate: impl Fn(&SessionState) -> bool,
) -> SessionState {
    tokio::time::timeout(Duration::from_secs(2), handle.wait_for(predicate))
        .await
        .unwrap()
        .unwrap()
}

impl Harness {
    /// Sign `id` in and wait until both document feeds are subscribed.
    async fn sign_in_and_subscribe(&self, id: &str) {
        self.identity.sign_in(identity_for(id));
        let user = UserId::new(id);
        let profiles = self.profiles.clone();
        let markers = self.markers.clone();
        eventually(move || {
            profiles.subscriber_count(&user) >= 1
                && markers.subscriber_count(&UserId::new(id)) >= 1
        })
        .await;
    }
}

#[tokio::test]
async fn initial_signed_out_event_resolves_loading() {
    let harness = spawn_harness();

    let state = wait_for(&harness.handle, |s| !s.is_loading).await;
    assert!(state.identity.is_none());
    assert!(state.profile.is_none());
    assert!(!state.is_admin);
    assert!(state.error.is_none());
    assert_eq!(state.phase(), SessionPhase::NoIdentity);
}

#[tokio::test]
async fn provider_without_marker_resolves_non_admin() {
    // Scenario: profile exists with role "provider", admin marker missing.
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("user123").await;

    let user = UserId::new("user123");
    harness.profiles.set(profile_for("user123", Role::Provider));
    harness.markers.revoke(&user);

    let state = wait_for(&harness.handle, |s| !s.is_loading).await;
    assert_eq!(state.identity.unwrap().id, user);
    assert_eq!(state.profile.unwrap().role, Role::Provider);
    assert!(!state.is_admin);
    assert!(state.error.is_none());
    assert!(state.resolved_at.is_some());
}

#[tokio::test]
async fn marker_before_profile_resolves_admin() {
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("admin1").await;

    let user = UserId::new("admin1");
    harness.markers.grant(&user);

    // One delivery is not enough to resolve.
    let state = wait_for(&harness.handle, |s| s.admin_delivered).await;
    assert!(state.is_loading);

    harness.profiles.set(profile_for("admin1", Role::Customer));
    let state = wait_for(&harness.handle, |s| !s.is_loading).await;
    assert!(state.is_admin);
    assert_eq!(state.phase(), SessionPhase::Ready);
}

#[tokio::test]
async fn superseded_identity_events_never_leak() {
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("alice").await;

    harness.sign_in_and_subscribe("bob").await;

    // Emissions for alice target torn-down subscriptions; nothing of hers
    // may surface in bob's session.
    let alice = UserId::new("alice");
    harness.profiles.set(profile_for("alice", Role::Admin));
    harness.markers.grant(&alice);

    let bob = UserId::new("bob");
    harness.profiles.set(profile_for("bob", Role::Customer));
    harness.markers.revoke(&bob);

    let state = wait_for(&harness.handle, |s| !s.is_loading).await;
    assert_eq!(state.identity.unwrap().id, bob);
    assert_eq!(state.profile.as_ref().unwrap().id, bob);
    assert!(!state.is_admin);
}

#[tokio::test]
async fn sign_out_resets_despite_in_flight_feeds() {
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("user123").await;

    // Only the profile feed delivers; the session is still resolving.
    harness.profiles.set(profile_for("user123", Role::Customer));
    let state = wait_for(&harness.handle, |s| s.profile_delivered).await;
    assert!(state.is_loading);

    harness.identity.sign_out();
    let state = wait_for(&harness.handle, |s| s.identity.is_none() && !s.is_loading).await;
    assert!(state.profile.is_none());
    assert!(!state.is_admin);
    assert!(state.error.is_none());

    // A late emission for the signed-out subject changes nothing.
    harness.markers.grant(&UserId::new("user123"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    let state = harness.handle.snapshot();
    assert!(state.identity.is_none());
    assert!(!state.is_admin);
}

#[tokio::test]
async fn admin_feed_permission_error_degrades_to_non_admin() {
    let harness = spawn_harness();
    let user = UserId::new("user123");

    // Security rules reject the marker read for non-admins.
    harness.markers.deny(&user);
    harness.sign_in_and_subscribe("user123").await;

    harness.profiles.set(profile_for("user123", Role::Customer));

    let state = wait_for(&harness.handle, |s| !s.is_loading).await;
    assert!(!state.is_admin);
    assert!(state.profile.is_some());
    assert_eq!(
        state.error,
        Some(SessionError::PermissionDenied {
            path: "roles_admin/user123".to_string(),
        })
    );
}

#[tokio::test]
async fn identity_stream_failure_resets_with_error() {
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("user123").await;

    harness.identity.fail(SessionError::IdentityStream {
        message: "token revoked".to_string(),
    });

    let state = wait_for(&harness.handle, |s| s.error.is_some()).await;
    assert!(state.identity.is_none());
    assert!(!state.is_loading);
    assert!(matches!(
        state.error,
        Some(SessionError::IdentityStream { .. })
    ));
}

#[tokio::test]
async fn same_subject_refresh_keeps_resolved_state() {
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("user123").await;

    let user = UserId::new("user123");
    harness.profiles.set(profile_for("user123", Role::Customer));
    harness.markers.revoke(&user);
    let resolved = wait_for(&harness.handle, |s| !s.is_loading).await;

    // Token refresh re-emits the same subject with new attributes.
    harness
        .identity
        .sign_in(identity_for("user123").with_display_name("Renamed"));

    let state = wait_for(&harness.handle, |s| {
        s.identity
            .as_ref()
            .is_some_and(|i| i.display_name.as_deref() == Some("Renamed"))
    })
    .await;
    assert!(!state.is_loading);
    assert_eq!(state.profile, resolved.profile);
    assert_eq!(state.resolved_at, resolved.resolved_at);
}

#[tokio::test]
async fn profile_updates_after_resolution_apply_live() {
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("user123").await;

    let user = UserId::new("user123");
    harness.profiles.set(profile_for("user123", Role::Customer));
    harness.markers.revoke(&user);
    wait_for(&harness.handle, |s| !s.is_loading).await;

    harness.profiles.set(profile_for("user123", Role::Provider));
    let state = wait_for(&harness.handle, |s| {
        s.profile.as_ref().is_some_and(|p| p.role == Role::Provider)
    })
    .await;
    assert!(!state.is_loading);

    // Live admin grant after resolution applies as well.
    harness.markers.grant(&user);
    let state = wait_for(&harness.handle, |s| s.is_admin).await;
    assert!(!state.is_loading);
}

#[tokio::test]
async fn shutdown_releases_all_subscriptions() {
    let harness = spawn_harness();
    harness.sign_in_and_subscribe("user123").await;
    assert_eq!(harness.identity.subscriber_count(), 1);

    harness.handle.shutdown();

    let user = UserId::new("user123");
    let identity = harness.identity.clone();
    let profiles = harness.profiles.clone();
    let markers = harness.markers.clone();
    eventually(move || {
        identity.subscriber_count() == 0
            && profiles.subscriber_count(&user) == 0
            && markers.subscriber_count(&UserId::new("user123")) == 0
    })
    .await;

    // Nothing mutates state after teardown.
    let before = harness.handle.snapshot();
    harness.identity.sign_in(identity_for("someone-else"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(harness.handle.snapshot(), before);
}
