// Shared prompt fragments.
// Each feature that calls the model defines its own prompts.rs alongside it
// and composes these cross-cutting rules into its system instruction.

/// Rule block that enforces a bare JSON answer.
pub const JSON_ONLY_RULES: &str = "\
只返回一个 JSON 对象，不要包含任何其他文字。
不要使用 markdown 代码块包裹，不要添加解释或道歉。";

/// Rule block that forbids invented values.
pub const NO_FABRICATION_RULES: &str = "\
如果某个字段在原文中找不到，填空字符串\"\"，不要推测或编造。";
