//! Slot pattern extraction and keyword vocabularies.
//!
//! Patterns are compiled once into [`SlotPatterns`] at engine construction
//! rather than per call. Keyword matching is plain substring containment,
//! mirroring how users actually type short Chinese affirmatives and
//! negatives into the chat.

use regex::Regex;

use crate::{AppError, Result};

/// Phrase that aborts the current flow regardless of state.
pub const EXIT_KEYWORD: &str = "退出当前流程";

/// Negative replies recognised while awaiting confirmation.
pub const DENY_KEYWORDS: &[&str] = &["不", "不是", "不对", "错误", "不正确"];

/// Affirmative replies recognised while awaiting confirmation.
pub const CONFIRM_KEYWORDS: &[&str] = &["是", "确认", "对", "没错", "正确", "嗯"];

/// Referential phrases meaning "the one from before", which trigger a
/// memory-store lookup for still-missing slots.
pub const RECALL_KEYWORDS: &[&str] = &[
    "刚刚", "刚才", "上次", "上一个", "上一次", "之前", "前边", "前面", "先前", "刚才的",
    "上次的", "之前的", "前边的", "前面的", "方才", "适才", "刚才能", "方才的", "适才的",
    "最近一次", "上回", "上回的",
];

const URL_PATTERN: &str = r"https?://\S+\.release\.git";
const TAG_PATTERN: &str = r"[a-zA-Z0-9]+-v\d+\.\d+|v\d+\.\d+";

/// Slots extracted from one user turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSlots {
    /// Repository URL found in the text, if any.
    pub repo_url: Option<String>,
    /// Tag found in the text outside the URL, if any.
    pub tag: Option<String>,
}

/// Compiled slot extraction patterns, built once per engine.
#[derive(Debug)]
pub struct SlotPatterns {
    url: Regex,
    tag: Regex,
}

impl SlotPatterns {
    /// Compile the URL and tag patterns.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if a pattern fails to compile, which
    /// indicates a build-time defect rather than a runtime condition.
    pub fn compile() -> Result<Self> {
        let url = Regex::new(URL_PATTERN)
            .map_err(|err| AppError::Config(format!("url pattern: {err}")))?;
        let tag = Regex::new(TAG_PATTERN)
            .map_err(|err| AppError::Config(format!("tag pattern: {err}")))?;
        Ok(Self { url, tag })
    }

    /// Run both independent extractions against `content`.
    ///
    /// The tag is searched only in the text remaining after removing the
    /// matched URL, so a tag-like substring inside the URL cannot be
    /// mis-captured.
    #[must_use]
    pub fn extract(&self, content: &str) -> ExtractedSlots {
        let repo_url = self
            .url
            .find(content)
            .map(|m| m.as_str().to_owned());

        let remainder = self.url.replace(content, "");
        let tag = self
            .tag
            .find(&remainder)
            .map(|m| m.as_str().to_owned());

        ExtractedSlots { repo_url, tag }
    }
}

/// Whether `content` asks to abort the current flow.
#[must_use]
pub fn is_exit_request(content: &str) -> bool {
    content.contains(EXIT_KEYWORD)
}

/// Whether `content` refers back to a previous query.
#[must_use]
pub fn refers_to_previous(content: &str) -> bool {
    RECALL_KEYWORDS.iter().any(|kw| content.contains(kw))
}

/// Interpret a reply given while awaiting confirmation.
///
/// Confirmed only when at least one confirm keyword matches and no deny
/// keyword matches. Explicit denial, ambiguous text, and unrelated text are
/// all treated as not-confirmed.
#[must_use]
pub fn is_confirmed(content: &str) -> bool {
    let denied = DENY_KEYWORDS.iter().any(|kw| content.contains(kw));
    let confirmed = CONFIRM_KEYWORDS.iter().any(|kw| content.contains(kw));
    confirmed && !denied
}
