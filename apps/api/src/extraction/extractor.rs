//! Extractor: one model round trip from offer email to normalized fields.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::extraction::parser::parse_extraction;
use crate::extraction::request::ExtractionRequest;
use crate::llm_client::ChatCompletion;
use crate::models::offer::ExtractedFields;

/// Sends the prepared request to the model and parses its answer.
pub async fn extract_offer_fields(
    request: &ExtractionRequest,
    llm: &dyn ChatCompletion,
) -> Result<ExtractedFields, AppError> {
    info!(
        "Extracting offer fields from {} characters of email text",
        request.user.chars().count()
    );

    let raw = llm.complete(&request.system, &request.user).await?;
    debug!("Model answered with {} bytes", raw.len());

    let fields = parse_extraction(&raw)?;
    info!(
        start_date = %fields.start_date,
        end_date = %fields.end_date,
        "Offer fields extracted"
    );
    Ok(fields)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::extraction::request::build_extraction_request;
    use crate::llm_client::LlmError;

    pub const SAMPLE_EMAIL: &str = "主题：实习录用通知\n\
        实习生：王舒惠同学，你好！\n\
        很高兴通知你已通过我司面试。岗位：软件工程实习生。\n\
        实习期间为2025年12月1日至2026年2月28日，实习补贴250元/天，\n\
        导师：@李明，工作地点：线下+线上，工作时间：每周一至周五 10:00-19:00。";

    /// Returns a fixed answer and records the instructions it was sent.
    pub struct CannedCompletion {
        pub answer: Result<String, u16>,
        pub seen: Mutex<Vec<(String, String)>>,
    }

    impl CannedCompletion {
        pub fn answering(answer: &str) -> Self {
            Self {
                answer: Ok(answer.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                answer: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatCompletion for CannedCompletion {
        async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            match &self.answer {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "service unavailable".to_string(),
                }),
            }
        }
    }

    pub fn sample_answer() -> String {
        format!(
            "```json\n{}\n```",
            json!({
                "internName": "王舒惠",
                "internPosition": "软件工程实习生",
                "startDate": "2025年12月1日",
                "endDate": "2026年2月28日",
                "dailyAllowance": "250元/天",
                "supervisor": "李明",
                "workLocation": "线下+线上",
                "workTime": "每周一至周五 10:00-19:00"
            })
        )
    }

    #[tokio::test]
    async fn test_sample_email_end_to_end() {
        let llm = CannedCompletion::answering(&sample_answer());
        let request = build_extraction_request(Some(&json!(SAMPLE_EMAIL))).unwrap();

        let fields = extract_offer_fields(&request, &llm).await.unwrap();

        assert_eq!(fields.intern_name, "王舒惠");
        assert_eq!(fields.intern_position, "软件工程实习生");
        assert_eq!(fields.start_date, "2025-12-01");
        assert_eq!(fields.end_date, "2026-02-28");
        assert_eq!(fields.daily_allowance, "250");
        assert_eq!(fields.email, "");

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].1.contains(SAMPLE_EMAIL));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_upstream_error() {
        let llm = CannedCompletion::failing(503);
        let request = build_extraction_request(Some(&json!(SAMPLE_EMAIL))).unwrap();

        let err = extract_offer_fields(&request, &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_prose_answer_is_parse_error() {
        let llm = CannedCompletion::answering("邮件中没有找到实习信息。");
        let request = build_extraction_request(Some(&json!(SAMPLE_EMAIL))).unwrap();

        let err = extract_offer_fields(&request, &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
