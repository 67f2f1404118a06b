// Offer email extraction: validate the pasted text, ask the model for the
// contract fields, then parse and normalize its answer.

pub mod extractor;
pub mod handlers;
pub mod normalize;
pub mod parser;
pub mod prompts;
pub mod request;
