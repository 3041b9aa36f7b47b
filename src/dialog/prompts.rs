//! User-visible reply text.
//!
//! Strings are kept verbatim from the shipped skill; extending the embedded
//! language variants is a non-goal.

use crate::clients::status::AutoBuildInfo;

/// Prompt when both slots are missing.
pub const ASK_BOTH: &str =
    "请提供发布仓的地址和发布tag，例如: https://git.ipanel.cn/git/playcube/playcube.release.git   alpha-v1.0";

/// Prompt when only the repository URL is missing.
pub const ASK_REPO_URL: &str =
    "请提供发布仓的地址，例如: https://git.ipanel.cn/git/playcube/playcube.release.git";

/// Prompt when only the tag is missing.
pub const ASK_TAG: &str = "请提供发布tag，例如: develop-v1.0";

/// Reply when a referential lookup found nothing in memory.
pub const NO_HISTORY: &str = "未找到历史查询记录，请提供发布仓地址和tag";

/// Re-prompt after the user denied (or failed to confirm) staged values.
pub const RESUPPLY_AFTER_DENIAL: &str =
    "好的，请提供新的发布仓地址和tag，例如: https://git.ipanel.cn/git/playcube/playcube.release.git   alpha-v1.0";

/// Acknowledgement after the user exits the flow.
pub const EXIT_ACK: &str = "好的，已退出当前流程。";

/// Interim reply sent before the status backend call.
pub const QUERY_STARTED: &str = "马上帮你查询，请稍候";

/// Confirmation prompt echoing memory-sourced values verbatim.
#[must_use]
pub fn confirm_values(repo_url: &str, tag: &str) -> String {
    format!(
        "请确认发布仓地址和tag是否正确：\n{repo_url}\n{tag}\n请回复\"是\"或\"确认\"继续，或直接输入新的地址和tag进行修改"
    )
}

/// Multi-line summary for a successful status query.
#[must_use]
pub fn query_success(repo_url: &str, tag: &str, info: &AutoBuildInfo) -> String {
    format!(
        "查询 {repo_url} 的 {tag} 成功:\n- Auto名称: {}\n- Buildee名称: {}\n- Auto启动时间: {}\n- 健康状况: {}\n- 健康持续时长: {}\n- 健康开始时间: {}",
        info.auto_name,
        info.buildee_name,
        info.auto_started_at,
        info.health_state,
        info.health_duration,
        info.health_since,
    )
}

/// Reply when the backend answered with a non-zero `error_code`.
#[must_use]
pub fn query_failed(repo_url: &str, tag: &str, result: &str) -> String {
    format!("查询 {repo_url} {tag} 的自动构建状态完成: {result}")
}

/// Reply when the backend call itself failed.
#[must_use]
pub fn query_errored(repo_url: &str, tag: &str, err: &str) -> String {
    format!("调用接口查询 {repo_url} {tag} 的自动构建状态时出错: {err}")
}
