//! Pulls an AIR source candidate out of a raw LLM response.

/// Extract the AIR source from `response`. Models are asked to return a
/// fenced code block; this strips the fence if present, and falls back
/// to the whole trimmed response otherwise.
#[must_use]
pub fn extract_air_source(response: &str) -> String {
    let trimmed = response.trim();
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let after_lang = after_fence.strip_prefix("air").unwrap_or(after_fence);
        let after_lang = after_lang.strip_prefix('\n').unwrap_or(after_lang);
        if let Some(end) = after_lang.find("```") {
            return after_lang[..end].trim().to_string();
        }
        return after_lang.trim().to_string();
    }
    trimmed.to_string()
}
