use crate::context::BusinessContext;
use serde::{Deserialize, Serialize};

pub const FALLBACK_CODES: [(&str, &str); 3] = [
    ("SYS", "system, internal or automation work"),
    ("OPS", "general agency operations"),
    ("BIZDEV", "business development with no client mentioned"),
];

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime_type", &self.mime_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// What the user typed and/or attached for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInput {
    pub text: Option<String>,
    pub image: Option<ImageAttachment>,
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    /// Non-blank text, if any.
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.text_content().is_none() && self.image.is_none()
    }
}

pub fn format_company_list(ctx: &BusinessContext) -> String {
    if ctx.companies.is_empty() {
        return "No companies loaded!".into();
    }

    ctx.companies
        .iter()
        .map(|c| format!("{} (Code: {})", c.name, c.code))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the generation prompt. Pure: same context and input, same string.
pub fn build_task_prompt(ctx: &BusinessContext, input: &UserInput) -> String {
    let mut out = String::new();

    out.push_str(
        "You are an assistant for a digital agency that tracks its work on a project board.\n\
Read the user's request (text and/or screenshot) and decide which client company it belongs to, \
using only the company list below.\n\n",
    );

    out.push_str(
        "IMPORTANT: if any part of a company name from the list appears in the request, \
even partially, with different case or with typos, use that company's code. \
Never shorten or invent codes.\n\n",
    );

    out.push_str("COMPANIES:\n");
    out.push_str(&format_company_list(ctx));
    out.push_str("\n\n");

    out.push_str("Rules:\n");
    out.push_str(
        "1. If an image is attached, read its visible text, especially company or sender names.\n",
    );
    out.push_str(
        "2. Look for a company from the list in the request. On a match, prefix the task name with its code.\n",
    );
    out.push_str("3. Without a match, use one of these prefixes:\n");
    for (code, meaning) in FALLBACK_CODES {
        out.push_str(&format!("   - {code} for {meaning}\n"));
    }
    out.push_str("4. Never use OPS when the request comes from or is about a client.\n");
    out.push_str(
        "5. Keep the task name short and write a concise description instead of copying the request.\n",
    );

    if let Some(labels) = ctx.status_labels.as_ref().filter(|v| !v.is_empty()) {
        out.push_str(&format!("6. status must be one of: {}\n", labels.join(", ")));
    }
    if let Some(labels) = ctx.priority_labels.as_ref().filter(|v| !v.is_empty()) {
        out.push_str(&format!("7. priority must be one of: {}\n", labels.join(", ")));
    }

    out.push_str(
        "\nAnswer with JSON only, shaped like {\"tasks\": [{\"task_name\": \"CODE > short task summary\", \
\"description\": \"short explanation or question for the team\", \"status\": \"Needs Action\", \
\"priority\": \"Medium\"}]}\n",
    );

    out.push_str("---\nUser Input:\n");
    if let Some(text) = input.text_content() {
        out.push_str(&format!("Text: \"{text}\"\n"));
    }
    if input.image.is_some() {
        out.push_str("Image: attached (read it and extract a company name if present)\n");
    }

    out
}
