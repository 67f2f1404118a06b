//! Contract generator: validate the reviewed fields, fill the template.

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, info};

use crate::config::Config;
use crate::contract::docx::DocxTemplate;
use crate::contract::fields::placeholder_values;
use crate::errors::AppError;
use crate::models::offer::ContractRequest;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// RFC 5987 `attr-char` minus the characters browsers mishandle.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A rendered contract ready to be sent.
#[derive(Debug)]
pub struct GeneratedContract {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl GeneratedContract {
    /// `Content-Disposition` value carrying the UTF-8 filename.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename*=UTF-8''{}",
            utf8_percent_encode(&self.filename, FILENAME_ENCODE_SET)
        )
    }
}

/// Produces the contract document for `request`.
///
/// Required fields are checked before the template is touched; the template
/// is loaded fresh for every call.
pub async fn generate_contract(
    request: &ContractRequest,
    config: &Config,
    today: NaiveDate,
) -> Result<GeneratedContract, AppError> {
    if let Some(field) = request.first_missing_field() {
        return Err(AppError::Validation(format!(
            "Missing required field: {field}"
        )));
    }

    let template = DocxTemplate::load(&config.template_path).await?;
    let values = placeholder_values(request, &config.company, today);
    let bytes = template.render(&values)?;

    let filename = format!(
        "{}-{}-{}.docx",
        config.filename_prefix, request.intern_name, request.start_date
    );
    info!("Generated contract ({} bytes)", bytes.len());
    debug!("Contract filename: {filename}");

    Ok(GeneratedContract { filename, bytes })
}
