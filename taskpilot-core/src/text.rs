use regex::Regex;
use std::sync::OnceLock;

fn leading_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```json\s*").expect("valid leading fence regex"))
}

fn trailing_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*```$").expect("valid trailing fence regex"))
}

/// Strips a leading ```` ```json ```` marker and a trailing ```` ``` ```` marker.
///
/// Unfenced input comes back unchanged, so applying this twice is the same as once.
pub fn strip_code_fence(text: &str) -> String {
    let out = leading_fence_re().replace(text, "");
    trailing_fence_re().replace(&out, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let input = "```json\n{\"tasks\":[]}\n```";
        assert_eq!(strip_code_fence(input), "{\"tasks\":[]}");
    }

    #[test]
    fn unfenced_text_is_unchanged() {
        let input = "{\"tasks\":[{\"task_name\":\"x\"}]}";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn stripping_is_idempotent() {
        for input in [
            "```json\n{\"a\":1}\n```",
            "{\"a\":1}",
            "```json {\"a\":1}```",
            "",
        ] {
            let once = strip_code_fence(input);
            assert_eq!(strip_code_fence(&once), once);
        }
    }
}
