use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::extraction::normalize::{normalize_date, normalize_number};

/// Fields read out of an offer email. Every value is either normalized or empty.
///
/// Deserializing runs each field through its normalizer, so a record built
/// from model output already satisfies the date and number formats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedFields {
    #[serde(deserialize_with = "trimmed_string")]
    pub intern_name: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub intern_position: String,
    #[serde(deserialize_with = "date_string")]
    pub start_date: String,
    #[serde(deserialize_with = "date_string")]
    pub end_date: String,
    #[serde(deserialize_with = "number_string")]
    pub daily_allowance: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub supervisor: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub work_location: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub work_time: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub email: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub school: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub phone: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub id_number: String,
}

/// Body of a contract generation request: reviewed fields plus the sign date.
///
/// Values are taken as the operator left them; only type coercion applies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractRequest {
    #[serde(deserialize_with = "trimmed_string")]
    pub intern_name: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub intern_position: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub start_date: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub end_date: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub daily_allowance: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub supervisor: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub work_location: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub work_time: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub email: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub school: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub phone: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub id_number: String,
    #[serde(deserialize_with = "trimmed_string")]
    pub sign_date: String,
}

impl ContractRequest {
    /// The fields a contract cannot be issued without, in the order they are checked.
    pub fn required_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("internName", &self.intern_name),
            ("internPosition", &self.intern_position),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("dailyAllowance", &self.daily_allowance),
        ]
    }

    /// Name of the first required field that is empty, if any.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        self.required_fields()
            .into_iter()
            .find(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
    }
}

/// Coerces a JSON scalar to text: strings as-is, numbers as written, `true`
/// as "true". Zero, `null`, `false`, arrays and objects count as absent.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn trimmed_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value).trim().to_string())
}

fn date_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_date(&value_to_text(&value)))
}

fn number_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_number(&value_to_text(&value)))
}
