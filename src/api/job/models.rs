use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Group whose members may create, update and delete jobs
pub const RECRUITER_GROUP: &str = "Recruiters";

/// Status given to every new job; listing returns only jobs in this status
pub const OPEN_STATUS: &str = "open";

/// Payload for creating a job
///
/// Fields are passed to storage as text and cast there, so a value is only
/// rejected if Postgres rejects it. Any `status` in the body is ignored; new
/// jobs are always `open`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewJob {
    #[serde(default, deserialize_with = "sql_text")]
    pub company_id: Option<String>,
    #[serde(default, deserialize_with = "sql_text")]
    pub recruiter_id: Option<String>,
    #[serde(default, deserialize_with = "sql_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "sql_text")]
    pub description: Option<String>,
}

/// Payload for updating a job
///
/// Absent and `null` fields both keep the stored value.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct JobChanges {
    #[serde(default, deserialize_with = "sql_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "sql_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "sql_text")]
    pub status: Option<String>,
}

/// Any JSON value as the text parameter Postgres receives; `null` stays NULL
fn sql_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Identity of the caller as established by the upstream authorizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caller {
    pub groups: Vec<String>,
}

impl Caller {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_recruiter(&self) -> bool {
        self.groups.iter().any(|group| group == RECRUITER_GROUP)
    }
}

/// One inbound request, stripped of platform event structure
#[derive(Debug, Clone, Default)]
pub struct JobRequest {
    pub method: String,
    pub job_id: Option<String>,
    pub body: Option<String>,
}
