//! Pure presence resolution over an event log snapshot.
//!
//! This is deliberately a function, not a stateful cache: callers fetch a
//! snapshot of activity and revocation events and recompute from scratch on
//! every query, so there is no invalidation logic anywhere in the system.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use opsdeck_entity::auth_event::{AuthAction, AuthEvent};

/// Placeholder shown when an event recorded no user agent or IP.
const UNKNOWN_DEVICE: &str = "Unknown";

/// A derived view of one logical session.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionView {
    /// Grouping key: the session id, or `user_agent|ip` for legacy events
    /// without a parseable session tag.
    pub key: String,
    /// The session identifier, when the group's events carried one.
    pub session_id: Option<Uuid>,
    /// User agent of the device.
    pub device: String,
    /// Origin IP address.
    pub ip: String,
    /// Resolved IP location; enriched after resolution.
    pub location: String,
    /// Timestamp of the earliest `login` event in the group, if any.
    pub login_time: Option<DateTime<Utc>>,
    /// Timestamp of the most recent activity in the group.
    pub last_active: DateTime<Utc>,
    /// Whether the session counts as online right now.
    pub is_online: bool,
}

/// Derives session views from a snapshot of the event log.
///
/// `activity` must contain only `login`/`heartbeat` events for one user,
/// newest first; `revocations` only `force_logout`/`force_logout_session`
/// events for the same user. A session is online iff its last activity is
/// within `inactive_ms` of `now` and no applicable revocation was appended
/// at or after that activity; ties resolve toward revocation.
pub fn resolve_sessions(
    activity: &[AuthEvent],
    revocations: &[AuthEvent],
    now: DateTime<Utc>,
    inactive_ms: u64,
) -> Vec<SessionView> {
    let mut views: Vec<SessionView> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in activity {
        let session_id = event.session_ref();
        let key = match session_id {
            Some(sid) => sid.to_string(),
            None => format!("{}|{}", event.user_agent, event.ip_address),
        };

        let idx = match index.get(&key) {
            Some(&i) => i,
            None => {
                views.push(SessionView {
                    key: key.clone(),
                    session_id,
                    device: if event.user_agent.is_empty() {
                        UNKNOWN_DEVICE.to_string()
                    } else {
                        event.user_agent.clone()
                    },
                    ip: event.ip_address.clone(),
                    location: event.ip_location.clone().unwrap_or_default(),
                    login_time: None,
                    last_active: event.created_at,
                    is_online: false,
                });
                index.insert(key, views.len() - 1);
                views.len() - 1
            }
        };

        let view = &mut views[idx];
        if event.created_at > view.last_active {
            view.last_active = event.created_at;
        }
        if event.action == AuthAction::Login {
            view.login_time = Some(match view.login_time {
                Some(existing) if existing <= event.created_at => existing,
                _ => event.created_at,
            });
        }
    }

    // Latest account-level revocation plus latest session-level revocation
    // per session identifier.
    let mut account_revoked_at: Option<DateTime<Utc>> = None;
    let mut session_revoked_at: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
    for event in revocations {
        match event.action {
            AuthAction::ForceLogout => {
                if account_revoked_at.is_none_or(|t| event.created_at > t) {
                    account_revoked_at = Some(event.created_at);
                }
            }
            AuthAction::ForceLogoutSession => {
                if let Some(sid) = event.session_ref() {
                    session_revoked_at
                        .entry(sid)
                        .and_modify(|t| {
                            if event.created_at > *t {
                                *t = event.created_at;
                            }
                        })
                        .or_insert(event.created_at);
                }
            }
            _ => {}
        }
    }

    for view in &mut views {
        let idle_ms = (now - view.last_active).num_milliseconds();
        let mut online = idle_ms >= 0 && (idle_ms as u64) < inactive_ms;

        if let Some(revoked_at) = account_revoked_at {
            if revoked_at >= view.last_active {
                online = false;
            }
        }
        if let Some(sid) = view.session_id {
            if let Some(&revoked_at) = session_revoked_at.get(&sid) {
                if revoked_at >= view.last_active {
                    online = false;
                }
            }
        }

        view.is_online = online;
    }

    views
}

/// Counts the online sessions in a resolved view list, optionally skipping
/// one session identifier.
pub fn count_online(views: &[SessionView], exclude: Option<Uuid>) -> usize {
    views
        .iter()
        .filter(|v| v.is_online)
        .filter(|v| match (exclude, v.session_id) {
            (Some(excluded), Some(sid)) => sid != excluded,
            _ => true,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use opsdeck_entity::auth_event::session_tag;

    const INACTIVE_MS: u64 = 300_000;

    fn event(
        action: AuthAction,
        description: String,
        created_at: DateTime<Utc>,
    ) -> AuthEvent {
        AuthEvent {
            id: 0,
            user_id: Some(1),
            action,
            module: "auth".to_string(),
            description,
            ip_address: "203.0.113.9".to_string(),
            user_agent: "TestBrowser/1.0".to_string(),
            ip_location: None,
            created_at,
        }
    }

    fn login(sid: Uuid, at: DateTime<Utc>) -> AuthEvent {
        event(AuthAction::Login, session_tag(sid), at)
    }

    fn heartbeat(sid: Uuid, at: DateTime<Utc>) -> AuthEvent {
        event(AuthAction::Heartbeat, session_tag(sid), at)
    }

    #[test]
    fn test_groups_by_session_id() {
        let now = Utc::now();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let activity = vec![
            heartbeat(a, now - Duration::seconds(10)),
            heartbeat(b, now - Duration::seconds(20)),
            login(b, now - Duration::seconds(60)),
            login(a, now - Duration::seconds(90)),
        ];

        let views = resolve_sessions(&activity, &[], now, INACTIVE_MS);
        assert_eq!(views.len(), 2);

        let va = views.iter().find(|v| v.session_id == Some(a)).unwrap();
        assert_eq!(va.login_time, Some(now - Duration::seconds(90)));
        assert_eq!(va.last_active, now - Duration::seconds(10));
        assert!(va.is_online);
        assert!(views.iter().all(|v| v.is_online));
    }

    #[test]
    fn test_untagged_events_group_by_device() {
        let now = Utc::now();
        let activity = vec![
            event(AuthAction::Heartbeat, String::new(), now - Duration::seconds(5)),
            event(AuthAction::Login, String::new(), now - Duration::seconds(30)),
        ];

        let views = resolve_sessions(&activity, &[], now, INACTIVE_MS);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].session_id, None);
        assert_eq!(views[0].key, "TestBrowser/1.0|203.0.113.9");
    }

    #[test]
    fn test_offline_at_exact_inactivity_threshold() {
        let now = Utc::now();
        let sid = Uuid::new_v4();

        let just_inside = vec![login(
            sid,
            now - Duration::milliseconds(INACTIVE_MS as i64 - 1),
        )];
        assert!(resolve_sessions(&just_inside, &[], now, INACTIVE_MS)[0].is_online);

        let at_threshold = vec![login(sid, now - Duration::milliseconds(INACTIVE_MS as i64))];
        assert!(!resolve_sessions(&at_threshold, &[], now, INACTIVE_MS)[0].is_online);
    }

    #[test]
    fn test_account_revocation_ties_go_offline() {
        let now = Utc::now();
        let sid = Uuid::new_v4();
        let active_at = now - Duration::seconds(10);

        let activity = vec![login(sid, active_at)];
        // Revocation at exactly last_active: offline
        let revocations = vec![event(AuthAction::ForceLogout, String::new(), active_at)];
        assert!(!resolve_sessions(&activity, &revocations, now, INACTIVE_MS)[0].is_online);

        // Revocation strictly before last_active: activity postdates it, so
        // the session stays online
        let earlier = vec![event(
            AuthAction::ForceLogout,
            String::new(),
            active_at - Duration::seconds(1),
        )];
        assert!(resolve_sessions(&activity, &earlier, now, INACTIVE_MS)[0].is_online);
    }

    #[test]
    fn test_session_revocation_only_hits_matching_session() {
        let now = Utc::now();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let activity = vec![
            heartbeat(a, now - Duration::seconds(10)),
            heartbeat(b, now - Duration::seconds(10)),
        ];
        let revocations = vec![event(
            AuthAction::ForceLogoutSession,
            session_tag(a),
            now - Duration::seconds(5),
        )];

        let views = resolve_sessions(&activity, &revocations, now, INACTIVE_MS);
        let va = views.iter().find(|v| v.session_id == Some(a)).unwrap();
        let vb = views.iter().find(|v| v.session_id == Some(b)).unwrap();
        assert!(!va.is_online);
        assert!(vb.is_online);
    }

    #[test]
    fn test_activity_after_account_revocation_stays_online() {
        let now = Utc::now();
        let sid = Uuid::new_v4();

        let activity = vec![heartbeat(sid, now - Duration::seconds(10))];
        let revocations = vec![event(
            AuthAction::ForceLogout,
            String::new(),
            now - Duration::seconds(120),
        )];

        // Heartbeat postdates the revocation, so this session is a new
        // login generation and stays online.
        assert!(resolve_sessions(&activity, &revocations, now, INACTIVE_MS)[0].is_online);
    }

    #[test]
    fn test_count_online_with_exclusion() {
        let now = Utc::now();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let activity = vec![
            heartbeat(a, now - Duration::seconds(10)),
            heartbeat(b, now - Duration::seconds(10)),
        ];
        let views = resolve_sessions(&activity, &[], now, INACTIVE_MS);
        assert_eq!(count_online(&views, None), 2);
        assert_eq!(count_online(&views, Some(a)), 1);
    }
}
