//! Caller-facing use-case API for the goal tracker.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions over plain scalar inputs.
//! - Turn every core outcome into one response envelope with a status class.
//!
//! # Invariants
//! - Exported functions never panic and never return `Err`; failures are
//!   reported as `ok=false` envelopes.
//! - `status_code` is 200 on success, otherwise 400, 404, 409 or 500.
//! - Each call opens its own connection to the configured database file.

use chrono::{DateTime, Utc};
use goaltracker_core::config::DB_PATH_VAR;
use goaltracker_core::db::open_db;
use goaltracker_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Character, Goal, GoalId, GoalTracker, NotificationChannel, ServiceError, ServiceResult,
    validate_goal, TrackedGoal, User, UserAggregate,
};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const ENTRY_DB_FILE_NAME: &str = "goaltracker_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Fields a goal creation event must carry, in reporting order.
const GOAL_EVENT_REQUIRED_FIELDS: [&str; 9] = [
    "userId",
    "characterName",
    "targetAttribute",
    "targetType",
    "targetValue",
    "currentValue",
    "targetDate",
    "notificationChannelType",
    "frequency",
];

/// Minimal health-check API.
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes the core crate version.
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// Returns an empty string on success and the error message on failure.
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), Path::new(log_dir.trim())) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Response envelope shared by every use-case call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// HTTP-style status class of the outcome.
    pub status_code: u16,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// Result payload, present only on success.
    pub payload: Option<T>,
}

impl<T> ApiResponse<T> {
    fn success(message: impl Into<String>, payload: T) -> Self {
        Self {
            ok: true,
            status_code: 200,
            message: message.into(),
            payload: Some(payload),
        }
    }

    fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status_code,
            message: message.into(),
            payload: None,
        }
    }

    fn bad_request(operation: &str, message: impl std::fmt::Display) -> Self {
        Self::failure(400, format!("{operation} failed: {message}"))
    }
}

/// Scalar inputs of a goal creation request.
///
/// `target_date` is RFC 3339 text; blank text is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub user_id: String,
    pub character_name: String,
    pub target_attribute: String,
    pub target_type: String,
    pub target_value: i64,
    pub current_value: i64,
    pub target_date: String,
    pub notification_channel_type: String,
    pub frequency: String,
}

/// Goal creation event body. Present-but-null fields are kept as empty values
/// so the goal validation rules report them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalCreationEvent {
    user_id: Option<String>,
    character_name: Option<String>,
    target_attribute: Option<String>,
    target_type: Option<String>,
    target_value: Option<i64>,
    current_value: Option<i64>,
    target_date: Option<String>,
    notification_channel_type: Option<String>,
    frequency: Option<String>,
}

impl From<GoalCreationEvent> for CreateGoalRequest {
    fn from(event: GoalCreationEvent) -> Self {
        Self {
            user_id: event.user_id.unwrap_or_default(),
            character_name: event.character_name.unwrap_or_default(),
            target_attribute: event.target_attribute.unwrap_or_default(),
            target_type: event.target_type.unwrap_or_default(),
            target_value: event.target_value.unwrap_or_default(),
            current_value: event.current_value.unwrap_or_default(),
            target_date: event.target_date.unwrap_or_default(),
            notification_channel_type: event.notification_channel_type.unwrap_or_default(),
            frequency: event.frequency.unwrap_or_default(),
        }
    }
}

/// Registers a user and returns it with its generated id.
pub fn create_user(email: String) -> ApiResponse<User> {
    with_tracker("create_user", "User created.", |tracker| {
        tracker.users.create_user(&email)
    })
}

/// Gets one user by id.
pub fn get_user(user_id: String) -> ApiResponse<User> {
    with_tracker("get_user", "User found.", |tracker| {
        tracker.users.get_user(&user_id)
    })
}

/// Loads a user together with every character, goal and channel it owns.
pub fn get_user_aggregate(user_id: String) -> ApiResponse<UserAggregate> {
    with_tracker("get_user_aggregate", "User loaded.", |tracker| {
        tracker.users.get_user_aggregate(&user_id)
    })
}

/// Links a character name to a user.
pub fn add_character(user_id: String, character_name: String) -> ApiResponse<Character> {
    with_tracker("add_character", "Character added.", |tracker| {
        tracker
            .characters
            .add_character_to_user(&user_id, &character_name)
    })
}

/// Lists characters of a user; an unknown user yields an empty list.
pub fn get_characters(user_id: String) -> ApiResponse<Vec<Character>> {
    with_tracker("get_characters", "Characters listed.", |tracker| {
        tracker.characters.get_characters_for_user(&user_id)
    })
}

/// Creates a goal with its initial progress.
///
/// A malformed `targetDate` is reported only when every earlier goal rule
/// passes, matching the order of the goal validation checks.
pub fn create_goal(request: CreateGoalRequest) -> ApiResponse<TrackedGoal> {
    const OPERATION: &str = "create_goal";

    let (target_date, date_error) = match parse_target_date(&request.target_date) {
        Ok(target_date) => (target_date, None),
        Err(message) => (None, Some(message)),
    };
    let goal = Goal {
        user_id: request.user_id,
        character_name: request.character_name,
        target_attribute: request.target_attribute,
        target_type: request.target_type,
        target_value: request.target_value,
        target_date,
        notification_channel_type: request.notification_channel_type,
        frequency: request.frequency,
        ..Goal::default()
    };

    if let Some(date_error) = date_error {
        // targetDate is the last rule; a placeholder date surfaces earlier failures.
        let dated = Goal {
            target_date: Some(Utc::now()),
            ..goal
        };
        let message = match validate_goal(Some(&dated), request.current_value) {
            Err(err) => err.to_string(),
            Ok(()) => date_error,
        };
        return ApiResponse::bad_request(OPERATION, message);
    }

    with_tracker(OPERATION, "Goal created.", |tracker| {
        tracker.goals.create_goal(&goal, request.current_value)
    })
}

/// Creates a goal from a goal creation event body.
///
/// The body must be present and carry every field of a goal creation
/// request; all absent fields are reported together.
pub fn create_goal_from_event_detail(detail: Option<&Value>) -> ApiResponse<TrackedGoal> {
    const OPERATION: &str = "create_goal_from_event";

    let fields = match detail {
        None | Some(Value::Null) => {
            return ApiResponse::bad_request(OPERATION, "Event or event detail cannot be null");
        }
        Some(Value::Object(fields)) => fields,
        Some(_) => {
            return ApiResponse::bad_request(OPERATION, "Event detail must be a JSON object");
        }
    };

    let missing = GOAL_EVENT_REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !fields.contains_key(*field))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        warn!(
            "event=goal_event module=api status=rejected missing_fields={}",
            missing.len()
        );
        return ApiResponse::bad_request(
            OPERATION,
            format!(
                "Event detail is missing required fields: {}",
                missing.join(", ")
            ),
        );
    }

    let event = match GoalCreationEvent::deserialize(Value::Object(fields.clone())) {
        Ok(event) => event,
        Err(err) => {
            return ApiResponse::bad_request(OPERATION, format!("Event detail is malformed: {err}"));
        }
    };
    create_goal(event.into())
}

/// Gets one goal of a user with its progress.
pub fn get_goal(user_id: String, goal_id: String) -> ApiResponse<TrackedGoal> {
    const OPERATION: &str = "get_goal";

    let goal_id = match GoalId::parse_str(goal_id.trim()) {
        Ok(goal_id) => goal_id,
        Err(_) => return ApiResponse::bad_request(OPERATION, "goalId must be a UUID"),
    };
    with_tracker(OPERATION, "Goal found.", |tracker| {
        tracker.goals.get_goal(&user_id, goal_id)
    })
}

/// Lists goals of a user with their progress.
pub fn get_goals(user_id: String) -> ApiResponse<Vec<TrackedGoal>> {
    with_tracker("get_goals", "Goals listed.", |tracker| {
        tracker.goals.get_goals_for_user(&user_id)
    })
}

/// Registers a notification channel for a user.
pub fn create_notification_channel(
    user_id: String,
    channel_type: String,
    identifier: String,
    is_active: bool,
) -> ApiResponse<NotificationChannel> {
    with_tracker(
        "create_notification_channel",
        "Notification channel created.",
        |tracker| {
            tracker.notification_channels.create_notification_channel(
                &user_id,
                &channel_type,
                &identifier,
                is_active,
            )
        },
    )
}

/// Lists notification channels of a user.
pub fn get_notification_channels(user_id: String) -> ApiResponse<Vec<NotificationChannel>> {
    with_tracker(
        "get_notification_channels",
        "Notification channels listed.",
        |tracker| {
            tracker
                .notification_channels
                .get_notification_channels(&user_id)
        },
    )
}

fn parse_target_date(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| Some(parsed.with_timezone(&Utc)))
        .map_err(|_| format!("targetDate must be an RFC 3339 timestamp, got `{trimmed}`"))
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_VAR) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_tracker<T>(
    operation: &'static str,
    success_message: &str,
    f: impl FnOnce(&GoalTracker<'_>) -> ServiceResult<T>,
) -> ApiResponse<T> {
    let db_path = resolve_entry_db_path();
    let outcome = open_db(&db_path)
        .map_err(|err| ServiceError::Storage(err.into()))
        .and_then(|conn| {
            let tracker = GoalTracker::compose(&conn)?;
            f(&tracker)
        });

    match outcome {
        Ok(payload) => ApiResponse::success(success_message, payload),
        Err(err) => {
            warn!(
                "event=api_call module=api status=error operation={operation} error_code={} status_code={}",
                err.code(),
                err.status_code()
            );
            ApiResponse::failure(err.status_code(), format!("{operation} failed: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        add_character, core_version, create_goal, create_goal_from_event_detail,
        create_notification_channel, create_user, get_characters, get_goal, get_goals,
        get_notification_channels, get_user, get_user_aggregate, init_logging, ping,
        CreateGoalRequest,
    };
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn goal_request(user_id: &str) -> CreateGoalRequest {
        CreateGoalRequest {
            user_id: user_id.to_string(),
            character_name: "Zezima".to_string(),
            target_attribute: "WOODCUTTING".to_string(),
            target_type: "xp".to_string(),
            target_value: 1_000_000,
            current_value: 50_000,
            target_date: (Utc::now() + Duration::days(90)).to_rfc3339(),
            notification_channel_type: "DISCORD".to_string(),
            frequency: "DAILY".to_string(),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(error.contains("verbose"));
    }

    #[test]
    fn created_user_can_be_read_back() {
        let created = create_user("zezima@example.com".to_string());
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.status_code, 200);
        let user = created.payload.expect("created user is returned");

        let loaded = get_user(user.user_id.clone());
        assert!(loaded.ok, "{}", loaded.message);
        assert_eq!(loaded.payload, Some(user));
    }

    #[test]
    fn missing_user_is_reported_as_not_found() {
        let response = get_user(unique_token("nonexistent"));
        assert!(!response.ok);
        assert_eq!(response.status_code, 404);
        assert!(response.payload.is_none());
    }

    #[test]
    fn blank_email_is_a_bad_request() {
        let response = create_user("   ".to_string());
        assert_eq!(response.status_code, 400);
        assert!(response.message.contains("email"));
    }

    #[test]
    fn characters_are_trimmed_and_listed() {
        let user_id = unique_token("characters");
        assert!(get_characters(user_id.clone())
            .payload
            .expect("listing succeeds")
            .is_empty());

        let added = add_character(user_id.clone(), "  Zezima  ".to_string());
        assert!(added.ok, "{}", added.message);
        assert_eq!(added.payload.map(|character| character.name).as_deref(), Some("Zezima"));

        let duplicate = add_character(user_id.clone(), "Zezima".to_string());
        assert_eq!(duplicate.status_code, 409);

        let listed = get_characters(user_id).payload.expect("listing succeeds");
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn goal_is_created_and_read_back() {
        let user_id = unique_token("goal");
        let created = create_goal(goal_request(&user_id));
        assert!(created.ok, "{}", created.message);
        let tracked = created.payload.expect("created goal is returned");
        assert_eq!(tracked.goal.target_value, 1_000_000);
        assert_eq!(tracked.progress.current_value, 50_000);

        let goal_id = tracked.goal.goal_id.expect("goal id assigned").to_string();
        let loaded = get_goal(user_id.clone(), goal_id);
        assert_eq!(loaded.payload, Some(tracked.clone()));

        let listed = get_goals(user_id);
        assert_eq!(listed.payload, Some(vec![tracked]));
    }

    #[test]
    fn invalid_goals_are_bad_requests() {
        let user_id = unique_token("invalid-goal");

        let zero_target = create_goal(CreateGoalRequest {
            target_value: 0,
            ..goal_request(&user_id)
        });
        assert_eq!(zero_target.status_code, 400);
        assert!(zero_target.message.contains("targetValue"));

        let negative_progress = create_goal(CreateGoalRequest {
            current_value: -1,
            ..goal_request(&user_id)
        });
        assert_eq!(negative_progress.status_code, 400);
        assert!(negative_progress.message.contains("currentProgress"));

        let bad_date = create_goal(CreateGoalRequest {
            target_date: "next tuesday".to_string(),
            ..goal_request(&user_id)
        });
        assert_eq!(bad_date.status_code, 400);
        assert!(bad_date.message.contains("targetDate"));

        let listed = get_goals(user_id).payload.expect("listing succeeds");
        assert!(listed.is_empty());
    }

    #[test]
    fn malformed_target_date_does_not_mask_earlier_rules() {
        let user_id = unique_token("date-order");

        let blank_user = create_goal(CreateGoalRequest {
            user_id: "  ".to_string(),
            target_date: "next tuesday".to_string(),
            ..goal_request(&user_id)
        });
        assert_eq!(blank_user.status_code, 400);
        assert!(blank_user.message.contains("userId"), "{}", blank_user.message);

        let negative_progress = create_goal(CreateGoalRequest {
            current_value: -1,
            target_date: "next tuesday".to_string(),
            ..goal_request(&user_id)
        });
        assert!(negative_progress.message.contains("currentProgress"));

        let only_date = create_goal(CreateGoalRequest {
            target_date: "next tuesday".to_string(),
            ..goal_request(&user_id)
        });
        assert!(only_date.message.contains("RFC 3339"), "{}", only_date.message);
    }

    #[test]
    fn malformed_goal_id_is_a_bad_request() {
        let response = get_goal("u1".to_string(), "not-a-uuid".to_string());
        assert_eq!(response.status_code, 400);
        assert!(response.message.contains("goalId"));
    }

    #[test]
    fn event_detail_creates_goal() {
        let user_id = unique_token("event");
        let detail = json!({
            "userId": user_id,
            "characterName": "testChar",
            "targetAttribute": "ATTACK",
            "targetType": "LEVEL",
            "targetValue": 99,
            "currentValue": 1,
            "targetDate": (Utc::now() + Duration::days(30)).to_rfc3339(),
            "notificationChannelType": "DISCORD",
            "frequency": "DAILY"
        });

        let response = create_goal_from_event_detail(Some(&detail));
        assert!(response.ok, "{}", response.message);
        let tracked = response.payload.expect("created goal is returned");
        assert_eq!(tracked.goal.target_attribute, "ATTACK");
        assert_eq!(tracked.progress.current_value, 1);
    }

    #[test]
    fn absent_event_detail_is_rejected() {
        let null = serde_json::Value::Null;
        for detail in [None, Some(&null)] {
            let response = create_goal_from_event_detail(detail);
            assert_eq!(response.status_code, 400);
            assert!(response.message.contains("cannot be null"));
        }
    }

    #[test]
    fn event_detail_lists_every_missing_field() {
        let detail = json!({
            "userId": "u1",
            "characterName": "testChar",
            "targetAttribute": "ATTACK",
            "targetValue": 99,
            "currentValue": 1,
            "notificationChannelType": "DISCORD"
        });

        let response = create_goal_from_event_detail(Some(&detail));
        assert_eq!(response.status_code, 400);
        assert!(response.message.ends_with(
            "Event detail is missing required fields: targetType, targetDate, frequency"
        ));
    }

    #[test]
    fn null_event_field_is_reported_by_goal_validation() {
        let detail = json!({
            "userId": unique_token("null-field"),
            "characterName": null,
            "targetAttribute": "ATTACK",
            "targetType": "LEVEL",
            "targetValue": 99,
            "currentValue": 1,
            "targetDate": (Utc::now() + Duration::days(30)).to_rfc3339(),
            "notificationChannelType": "DISCORD",
            "frequency": "DAILY"
        });

        let response = create_goal_from_event_detail(Some(&detail));
        assert_eq!(response.status_code, 400);
        assert!(response.message.contains("characterName cannot be null or empty"));
    }

    #[test]
    fn notification_channels_and_aggregate() {
        let created_user = create_user("channels@example.com".to_string());
        let user_id = created_user.payload.expect("user created").user_id;

        let channel = create_notification_channel(
            user_id.clone(),
            "DISCORD".to_string(),
            "zezima#0001".to_string(),
            true,
        );
        assert!(channel.ok, "{}", channel.message);

        let duplicate = create_notification_channel(
            user_id.clone(),
            "DISCORD".to_string(),
            "zezima#0001".to_string(),
            true,
        );
        assert_eq!(duplicate.status_code, 409);

        let listed = get_notification_channels(user_id.clone());
        assert_eq!(listed.payload.map(|channels| channels.len()), Some(1));

        let aggregate = get_user_aggregate(user_id)
            .payload
            .expect("aggregate loads");
        assert_eq!(aggregate.notification_channels.len(), 1);
        assert!(aggregate.goals.is_empty());
    }

    #[test]
    fn envelope_serializes_with_camel_case_keys() {
        let response = get_user(unique_token("serialize"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["ok"], false);
        assert_eq!(json["statusCode"], 404);
        assert!(json["payload"].is_null());
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
