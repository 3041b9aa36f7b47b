//! Unit tests for slot extraction and keyword vocabularies.

use auto_status_skill::dialog::extract::{
    is_confirmed, is_exit_request, refers_to_previous, SlotPatterns,
};

fn patterns() -> SlotPatterns {
    SlotPatterns::compile().expect("patterns must compile")
}

/// Text carrying both a release-repo URL and a tag yields both slots.
#[test]
fn extracts_url_and_tag_together() {
    let slots = patterns().extract(
        "帮我查一下 https://git.ipanel.cn/git/playcube/playcube.release.git 的 alpha-v1.0",
    );
    assert_eq!(
        slots.repo_url.as_deref(),
        Some("https://git.ipanel.cn/git/playcube/playcube.release.git")
    );
    assert_eq!(slots.tag.as_deref(), Some("alpha-v1.0"));
}

/// A bare `v<major>.<minor>` tag is accepted.
#[test]
fn extracts_bare_version_tag() {
    let slots = patterns().extract("check status for v2.3");
    assert_eq!(slots.repo_url, None);
    assert_eq!(slots.tag.as_deref(), Some("v2.3"));
}

/// Only URLs ending in the release-repo suffix match.
#[test]
fn ignores_non_release_urls() {
    let slots = patterns().extract("https://git.ipanel.cn/git/playcube/playcube.git v1.0");
    assert_eq!(slots.repo_url, None);
    assert_eq!(slots.tag.as_deref(), Some("v1.0"));
}

/// A tag-like substring inside the URL is not captured as the tag, because
/// the tag search runs on the text with the URL removed.
#[test]
fn tag_inside_url_is_not_captured() {
    let slots =
        patterns().extract("看看 https://git.example.com/playcube-v1.2/playcube.release.git");
    assert_eq!(
        slots.repo_url.as_deref(),
        Some("https://git.example.com/playcube-v1.2/playcube.release.git")
    );
    assert_eq!(slots.tag, None, "the v1.2 inside the URL must not leak out");
}

/// A tag outside the URL is still found when the URL also contains one.
#[test]
fn tag_outside_url_wins_over_tag_inside_url() {
    let slots = patterns()
        .extract("https://git.example.com/playcube-v1.2/playcube.release.git 用 beta-v3.4");
    assert_eq!(slots.tag.as_deref(), Some("beta-v3.4"));
}

/// Plain chatter yields neither slot.
#[test]
fn chatter_extracts_nothing() {
    let slots = patterns().extract("你好，今天天气怎么样");
    assert_eq!(slots.repo_url, None);
    assert_eq!(slots.tag, None);
}

/// Confirmation policy: confirmed only with a confirm keyword and no deny
/// keyword.
#[test]
fn confirmation_policy() {
    assert!(is_confirmed("是的"));
    assert!(is_confirmed("确认"));
    assert!(is_confirmed("嗯"));
    // "不对" contains both a confirm keyword (对) and a deny keyword — the
    // deny keyword wins.
    assert!(!is_confirmed("不对"));
    assert!(!is_confirmed("不是这个"));
    // Ambiguous or unrelated text is not a confirmation.
    assert!(!is_confirmed("哈哈"));
    assert!(!is_confirmed(""));
}

/// Exit phrasing is recognised anywhere in the text.
#[test]
fn exit_request_detection() {
    assert!(is_exit_request("退出当前流程"));
    assert!(is_exit_request("我想退出当前流程，谢谢"));
    assert!(!is_exit_request("退出"));
}

/// Referential phrases trigger the previous-query path.
#[test]
fn referential_keyword_detection() {
    assert!(refers_to_previous("查一下上次的"));
    assert!(refers_to_previous("刚才那个仓库"));
    assert!(refers_to_previous("最近一次的构建"));
    assert!(!refers_to_previous("查一下这个仓库"));
}
