// Offer-email extraction prompt templates.
// The schema listed here must stay in sync with `models::offer::ExtractedFields`.

use lazy_static::lazy_static;

use crate::llm_client::prompts::{JSON_ONLY_RULES, NO_FABRICATION_RULES};

const EXTRACTION_SYSTEM_HEAD: &str = r#"你是一个专业的信息提取助手。你的任务是从实习录用通知邮件中提取关键信息。

请严格按照以下JSON格式返回提取的信息：

{
  "internName": "实习生姓名（去掉'同学'、'女士'、'先生'等称谓后缀）",
  "internPosition": "实习岗位名称",
  "startDate": "实习开始日期（格式：YYYY-MM-DD）",
  "endDate": "实习结束日期（格式：YYYY-MM-DD）",
  "dailyAllowance": "每日补贴金额（只填数字）",
  "supervisor": "实习导师姓名（去掉@符号）",
  "workLocation": "工作地点描述（如'线下+线上'）",
  "workTime": "工作时间描述",
  "email": "实习生电子邮箱",
  "school": "实习生就读学校",
  "phone": "实习生联系电话",
  "idNumber": "实习生身份证号"
}

注意事项：
1. 日期必须转换为 YYYY-MM-DD 格式，例如"2025年12月1日"应转为"2025-12-01"
2. 补贴金额只提取数字，例如"250元/天"只填"250"
3. 姓名去掉所有称谓后缀，只保留姓名本身
4. 导师姓名去掉@符号"#;

/// Lead-in placed before the verbatim email text in the user instruction.
pub const EXTRACTION_USER_PREFIX: &str = "请从以下实习录用通知邮件中提取信息：\n\n";

lazy_static! {
    /// Full system instruction: schema, field rules and the shared output rules.
    pub static ref EXTRACTION_SYSTEM: String = format!(
        "{EXTRACTION_SYSTEM_HEAD}\n\n输出要求：\n{NO_FABRICATION_RULES}\n{JSON_ONLY_RULES}"
    );
}
