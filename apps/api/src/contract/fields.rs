//! Maps a contract request onto the template's placeholder names.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::CompanyProfile;
use crate::extraction::normalize::CJK_DATE;
use crate::models::offer::ContractRequest;

lazy_static! {
    static ref ISO_DATE_PARTS: Regex = Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})").unwrap();
}

/// Year, month and day as printed on the contract: numeric text without
/// leading zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl DateParts {
    /// Splits `YYYY-MM-DD` or `YYYY年M月D日`. Anything else lands in `year`
    /// verbatim with empty month and day, so the operator sees what was typed.
    pub fn parse(input: &str) -> Self {
        if let Some(caps) = ISO_DATE_PARTS
            .captures(input)
            .or_else(|| CJK_DATE.captures(input))
        {
            return Self {
                year: caps[1].to_string(),
                month: unpadded(&caps[2]),
                day: unpadded(&caps[3]),
            };
        }

        Self {
            year: input.to_string(),
            month: String::new(),
            day: String::new(),
        }
    }

    /// Like [`DateParts::parse`], but an empty input means `today`.
    pub fn parse_or(input: &str, today: NaiveDate) -> Self {
        if input.is_empty() {
            Self::from_date(today)
        } else {
            Self::parse(input)
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().to_string(),
            month: date.month().to_string(),
            day: date.day().to_string(),
        }
    }
}

fn unpadded(digits: &str) -> String {
    digits
        .parse::<u32>()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| digits.to_string())
}

/// Builds the placeholder map for one contract.
///
/// Every placeholder the template knows about gets an entry, empty when the
/// request left the field blank.
pub fn placeholder_values(
    request: &ContractRequest,
    company: &CompanyProfile,
    today: NaiveDate,
) -> BTreeMap<String, String> {
    let sign = DateParts::parse_or(&request.sign_date, today);
    let start = DateParts::parse_or(&request.start_date, today);
    let end = DateParts::parse_or(&request.end_date, today);

    let pairs: [(&str, &str); 23] = [
        ("签订年", &sign.year),
        ("签订月", &sign.month),
        ("签订日", &sign.day),
        ("姓名", &request.intern_name),
        ("学校", &request.school),
        ("电话", &request.phone),
        ("邮箱", &request.email),
        ("身份证号", &request.id_number),
        ("岗位", &request.intern_position),
        ("开始年", &start.year),
        ("开始月", &start.month),
        ("开始日", &start.day),
        ("结束年", &end.year),
        ("结束月", &end.month),
        ("结束日", &end.day),
        ("补贴", &request.daily_allowance),
        ("导师", &request.supervisor),
        ("工作地点", &request.work_location),
        ("工作时间", &request.work_time),
        ("甲方名称", &company.name),
        ("甲方地址", &company.address),
        ("甲方法定代表人", &company.legal_representative),
        ("甲方邮箱", &company.email),
    ];

    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
