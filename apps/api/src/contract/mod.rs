// Contract generation: map reviewed offer fields onto the .docx template
// placeholders and hand back the filled document.

pub mod docx;
pub mod fields;
pub mod generator;
pub mod handlers;
