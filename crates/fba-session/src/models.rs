//! Backend request and response bodies

use chrono::{DateTime, NaiveDateTime};
use fba_access::{Principal, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

fn default_token_type() -> String {
    "bearer".to_string()
}

fn default_limit() -> u32 {
    FeedbackFilter::DEFAULT_LIMIT
}

/// Tokens issued by `/auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent calls
    pub access_token: String,
    /// Long-lived refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token scheme, always `bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

/// User record as returned by `/users/me` and the admin listings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    /// Identity and role fields
    #[serde(flatten)]
    pub principal: Principal,
    /// Creation timestamp as sent by the backend
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserRecord {
    /// Parsed creation time
    ///
    /// Accepts RFC 3339 and offset-less ISO timestamps.
    #[must_use]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .or_else(|_| raw.parse::<NaiveDateTime>())
            .ok()
    }

    /// Drop the record metadata
    #[inline]
    #[must_use]
    pub fn into_principal(self) -> Principal {
        self.principal
    }
}

/// Body of `/auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Login name
    pub username: String,
    /// Password, at least 8 characters
    pub password: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Role asked for; admin requests start pending
    pub role: Role,
}

impl RegisterRequest {
    /// Create a viewer registration
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            full_name: None,
            role: Role::Viewer,
        }
    }

    /// Ask for a role
    #[inline]
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }
}

/// Body of `PATCH /users/me`; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    /// New email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New login name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Body of `/admin/approve-role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApproveRoleRequest {
    /// User whose request is resolved
    pub user_id: Uuid,
    /// Grant (`true`) or reject (`false`)
    pub approved: bool,
}

/// Envelope of admin mutations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminActionResponse<U> {
    /// Whether the change was applied
    pub success: bool,
    /// Human readable outcome
    pub message: String,
    /// Affected user, abbreviated
    pub user: U,
}

/// User summary after a role decision
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleDecisionUser {
    /// User id
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// Role after the decision
    pub role: Role,
    /// Always true once resolved
    pub role_approved: bool,
}

/// User summary after a status change
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserStatusUser {
    /// User id
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// Account enabled flag after the change
    pub is_active: bool,
}

/// Sentiment label
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// Urgency label
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Query of `GET /feedback/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackFilter {
    /// Rows to skip
    #[serde(default)]
    pub skip: u32,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Only this sentiment
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    /// Only this urgency
    #[serde(default)]
    pub urgency_level: Option<UrgencyLevel>,
    /// Only this workflow status
    #[serde(default)]
    pub status: Option<String>,
}

impl FeedbackFilter {
    /// Backend page size when none is given
    pub const DEFAULT_LIMIT: u32 = 50;

    /// First page, unfiltered
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page window
    #[must_use]
    pub fn with_page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }

    /// Filter by sentiment
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Filter by urgency
    #[must_use]
    pub fn with_urgency(mut self, urgency: UrgencyLevel) -> Self {
        self.urgency_level = Some(urgency);
        self
    }

    /// Filter by status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Query string pairs, unset filters omitted
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("skip", self.skip.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(s) = self.sentiment {
            pairs.push(("sentiment", s.as_str().to_string()));
        }
        if let Some(u) = self.urgency_level {
            pairs.push(("urgency_level", u.as_str().to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        pairs
    }
}

impl Default for FeedbackFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
            sentiment: None,
            urgency_level: None,
            status: None,
        }
    }
}

/// One analyzed feedback entry
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedbackItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub urgency_level: Option<UrgencyLevel>,
    #[serde(default)]
    pub urgency_score: Option<i32>,
    #[serde(default)]
    pub main_category: Option<String>,
    #[serde(default)]
    pub sub_categories: Option<Vec<String>>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub priority_score: Option<f64>,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub analyzed_at: Option<String>,
}

/// Topic share on the dashboard
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicDistribution {
    pub topic: String,
    pub count: u64,
    pub percentage: f64,
    pub avg_sentiment: f64,
}

/// Daily sentiment counts
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SentimentTrend {
    pub date: String,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub avg_score: f64,
}

/// Body of `GET /analytics/dashboard`
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardStats {
    pub total_feedback: u64,
    pub avg_sentiment: f64,
    #[serde(default)]
    pub sentiment_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub urgency_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub top_topics: Vec<TopicDistribution>,
    #[serde(default)]
    pub sentiment_trend: Vec<SentimentTrend>,
    #[serde(default)]
    pub feature_requests: u64,
    #[serde(default)]
    pub bug_reports: u64,
}

/// Body of `GET /clustering/info`
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClusteringInfo {
    pub total_feedback: u64,
    pub clustered_feedback: u64,
    #[serde(default)]
    pub clusters: BTreeMap<String, u64>,
}

impl ClusteringInfo {
    /// Share of feedback assigned to a cluster, 0 when there is none
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage(&self) -> f64 {
        if self.total_feedback == 0 {
            0.0
        } else {
            self.clustered_feedback as f64 / self.total_feedback as f64
        }
    }
}
