use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use webmvc_core::convert::date::lenient;

webmvc_core::ordinal_enum! {
    /// Bound from its ordinal: `0` = male, `1` = female, `2` = unknown.
    pub enum Gender {
        Male,
        Female,
        Unknown,
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleQuery {
    pub user_name: Option<String>,
    pub page_size: Option<u32>,
    pub gender: Option<Gender>,
    #[serde(default, with = "lenient")]
    pub created_after: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleBody {
    pub user_name: String,
    pub gender: Gender,
    #[serde(default, with = "lenient")]
    pub birthday: Option<NaiveDateTime>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DateEcho {
    #[serde(with = "lenient")]
    pub value: Option<NaiveDateTime>,
    pub gender: Option<Gender>,
}
