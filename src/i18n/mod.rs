//! Internationalization (i18n) module.
//!
//! Provides localized strings for the terminal UI and CLI output.
//! English is the default language; Simplified Chinese is available as an
//! alternative.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// English (default)
    En,
    /// Simplified Chinese
    Zh,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "zh", "en_US", "zh_CN.UTF-8").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "zh" | "cn" => Some(Self::Zh),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `TGDL_LANG`, then `LC_MESSAGES` / `LANG`.
pub fn detect_system_lang() -> Lang {
    std::env::var("TGDL_LANG")
        .ok()
        .and_then(|v| Lang::from_code(&v))
        .or_else(|| {
            std::env::var("LC_MESSAGES")
                .ok()
                .and_then(|v| Lang::from_code(&v))
        })
        .or_else(|| std::env::var("LANG").ok().and_then(|v| Lang::from_code(&v)))
        .unwrap_or(Lang::En)
}

/// Macro for defining translatable message functions.
/// Each function returns a `&'static str` based on the current language.
macro_rules! msg {
    ($name:ident, $en:expr, $zh:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Zh => $zh,
            }
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(app_name, "tgdl", "tgdl");
msg!(
    app_about,
    "tgdl \u{2014} Bulk download attachments from your Telegram groups and channels.",
    "tgdl \u{2014} 从 Telegram 群组和频道批量下载附件。"
);
msg!(
    app_long_about,
    "tgdl \u{2014} Bulk download attachments from your Telegram groups and channels.\nLog in once, browse chats in a terminal UI, filter files by type and date,\nand download them in parallel to a folder of your choice.",
    "tgdl \u{2014} 从 Telegram 群组和频道批量下载附件。\n只需登录一次，即可在终端界面中浏览聊天、按类型和日期筛选文件，\n并将其并发下载到指定文件夹。"
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_verbose,
    "Verbose logging (-v info, -vv debug, -vvv trace)",
    "详细日志 (-v info, -vv debug, -vvv trace)"
);
msg!(
    help_lang,
    "Language (en, zh). Defaults to system locale",
    "界面语言 (en, zh)。默认跟随系统"
);
msg!(help_config, "Path of the config file", "配置文件路径");
msg!(help_session, "Path of the session file", "Session 文件路径");
msg!(
    help_cmd_open,
    "Open the terminal UI (default if no subcommand given)",
    "打开终端界面（未指定子命令时的默认操作）"
);
msg!(
    help_cmd_login,
    "Log in to Telegram and create the session file",
    "登录 Telegram 并生成 session 文件"
);
msg!(
    help_cmd_dialogs,
    "List your groups and channels",
    "列出群组和频道"
);
msg!(
    help_cmd_files,
    "List the downloadable files of a chat",
    "列出某个聊天中可下载的文件"
);
msg!(
    help_cmd_download,
    "Download files of a chat without the UI",
    "不打开界面，直接下载某个聊天中的文件"
);
msg!(
    help_cmd_config,
    "Show or change the configuration",
    "查看或修改配置"
);
msg!(
    help_cmd_completions,
    "Generate shell completions",
    "生成 shell 自动补全脚本"
);
msg!(help_cmd_manpage, "Generate man page", "生成 man 手册页");
msg!(
    help_chat_arg,
    "Chat id, exact name, or a unique part of the name",
    "聊天 ID、完整名称或名称中唯一的一部分"
);
msg!(
    help_since,
    "Only files posted on or after this date (YYYY-MM-DD)",
    "仅包含该日期（YYYY-MM-DD）及之后发布的文件"
);
msg!(
    help_category,
    "File category: images, videos, audio, documents, archives (repeatable)",
    "文件类型：images、videos、audio、documents、archives（可重复）"
);
msg!(
    help_limit,
    "How many recent messages to scan",
    "扫描最近多少条消息"
);
msg!(
    help_output_dir,
    "Download folder (defaults to the configured one)",
    "保存文件夹（默认使用配置中的路径）"
);
msg!(
    help_concurrency,
    "Maximum parallel downloads",
    "最大并发下载数"
);
msg!(
    help_ids,
    "Only these message ids (comma separated)",
    "仅下载这些消息 ID（逗号分隔）"
);
msg!(help_output_json, "Output as JSON", "以 JSON 格式输出");
msg!(
    help_set_download_dir,
    "Set the default download folder",
    "设置默认保存文件夹"
);
msg!(
    app_after_help,
    "Examples:\n  tgdl login\n  tgdl\n  tgdl files \"My Channel\" --since 2024-01-01 --category images\n  tgdl download \"My Channel\" --category videos --output ./videos",
    "示例:\n  tgdl login\n  tgdl\n  tgdl files \"我的频道\" --since 2024-01-01 --category images\n  tgdl download \"我的频道\" --category videos --output ./videos"
);

// ── Login ────────────────────────────────────────────────────────

msg!(prompt_api_id, "API ID", "请输入 API ID");
msg!(prompt_api_hash, "API Hash", "请输入 API Hash");
msg!(prompt_phone, "Phone number", "请输入手机号");
msg!(prompt_code, "Telegram login code", "请输入 Telegram 验证码");
msg!(
    prompt_password,
    "Two-step verification password",
    "请输入二步验证密码"
);
msg!(prompt_open_tui, "Open tgdl now?", "现在打开 tgdl 吗？");
msg!(
    login_success,
    "Logged in, session file created:",
    "登录成功，session 文件已生成："
);
msg!(login_config_saved, "Config saved to", "配置已保存到");

// ── File categories ──────────────────────────────────────────────

msg!(cat_images, "Images", "图片");
msg!(cat_videos, "Videos", "视频");
msg!(cat_audio, "Audio", "音频");
msg!(cat_documents, "Documents", "文档");
msg!(cat_archives, "Archives", "压缩包");

// ── Column headers ──────────────────────────────────────────────

msg!(col_id, "ID", "ID");
msg!(col_kind, "Type", "类型");
msg!(col_name, "Name", "名称");
msg!(col_date, "Date", "日期");
msg!(col_size, "Size", "大小");
msg!(col_category, "Category", "分类");

// ── CLI strings ─────────────────────────────────────────────────

msg!(cli_no_dialogs, "No groups or channels found.", "没有找到群组或频道。");
msg!(
    cli_no_files,
    "No matching files in this chat.",
    "该聊天中没有符合条件的文件。"
);
msg!(cli_config_file, "Config file", "配置文件");
msg!(cli_session_file, "Session file", "Session 文件");
msg!(cli_download_dir, "Download folder", "保存路径");
msg!(cli_not_set, "(not set)", "（未设置）");
msg!(cli_logged_in, "logged in", "已登录");
msg!(cli_not_logged_in, "not logged in", "未登录");
msg!(cli_config_updated, "Config updated", "配置已更新");
msg!(cli_downloading, "Downloading", "正在下载");
msg!(
    cli_cancelling,
    "Cancelling, waiting for running downloads...",
    "正在取消，等待进行中的下载完成…"
);
msg!(cli_failed_items, "Failed:", "失败：");
msg!(cli_files_saved_in, "Files saved in", "文件保存在");

// ── TUI widget titles and labels ────────────────────────────────

msg!(tui_chats, "Chats", "群组/频道");
msg!(tui_files, "Files", "文件");
msg!(tui_progress, "Progress", "进度");
msg!(tui_help_title, "Help", "帮助");
msg!(tui_categories_title, "File types", "文件类型");
msg!(
    tui_categories_footer,
    "Space/Enter: toggle  a: all  Esc: close",
    "空格/回车: 切换  a: 全选  Esc: 关闭"
);
msg!(tui_any_date, "any date", "不限日期");
msg!(tui_since, "since", "起始");
msg!(tui_save_to, "Save to", "保存路径");
msg!(tui_marked, "marked", "已选");
msg!(tui_all_files, "all files", "全部文件");
msg!(tui_not_connected, "not connected", "未连接");
msg!(tui_connected, "connected", "已连接");
msg!(
    tui_select_chat,
    "Select a chat and press Enter",
    "请选择群组/频道并按回车"
);
msg!(tui_no_dialogs, "No chats loaded, press r", "尚未加载群组，按 r 刷新");
msg!(tui_no_files, "No matching files", "没有符合条件的文件");
msg!(tui_loading, "Loading...", "加载中…");
msg!(tui_input_min_date, "Minimum date (YYYY-MM-DD, empty = any)", "起始日期 (YYYY-MM-DD，留空为不限)");
msg!(tui_input_download_dir, "Download folder", "选择保存文件夹");

// ── Help popup ──────────────────────────────────────────────────

msg!(tui_help_navigation, "Navigation", "导航");
msg!(tui_help_files, "Files", "文件");
msg!(tui_help_general, "General", "通用");
msg!(tui_help_move, "Move selection", "移动光标");
msg!(tui_help_switch_panel, "Switch panel", "切换面板");
msg!(tui_help_open_chat, "Open chat", "打开聊天");
msg!(tui_help_refresh, "Refresh chat list", "刷新群组/频道列表");
msg!(tui_help_mark, "Mark / unmark file", "选中 / 取消选中文件");
msg!(tui_help_mark_all, "Mark all / none", "全选 / 全不选");
msg!(tui_help_categories, "File types", "文件类型");
msg!(tui_help_min_date, "Minimum date", "起始日期");
msg!(tui_help_folder, "Download folder", "保存文件夹");
msg!(
    tui_help_download,
    "Download marked (or all shown)",
    "下载选中文件（未选中则全部下载）"
);
msg!(tui_help_cancel, "Cancel download", "取消下载");
msg!(tui_help_help, "This help", "显示帮助");
msg!(tui_help_quit, "Quit", "退出");
msg!(tui_help_close, "Press any key to close", "按任意键关闭");

// ── Status bar hints ────────────────────────────────────────────

msg!(
    tui_hints_dialogs,
    "Enter:open  r:refresh  Tab:files  o:folder  ?:help  q:quit",
    "回车:打开  r:刷新  Tab:文件  o:文件夹  ?:帮助  q:退出"
);
msg!(
    tui_hints_files,
    "Space:mark  *:all  f:types  t:date  d:download  Tab:chats  ?:help",
    "空格:选中  *:全选  f:类型  t:日期  d:下载  Tab:群组  ?:帮助"
);
msg!(
    tui_hints_batch,
    "x:cancel download  ?:help",
    "x:取消下载  ?:帮助"
);
msg!(
    tui_hints_input,
    "Enter:confirm  Esc:cancel",
    "回车:确认  Esc:取消"
);

// ── Status / event messages ─────────────────────────────────────

msg!(tui_status_idle, "Status: waiting", "状态: 等待操作");
msg!(tui_status_connecting, "Connecting...", "正在连接…");
msg!(tui_status_connected, "Status: connected", "状态: 已连接");
msg!(tui_status_loading_dialogs, "Loading chats...", "正在加载群组/频道…");
msg!(tui_status_loading_files, "Loading files...", "正在加载文件…");
msg!(tui_status_batch_start, "Status: starting download...", "状态: 开始下载…");
msg!(tui_status_cancelling, "Cancelling...", "正在取消…");
msg!(
    tui_status_batch_running,
    "A download is already running",
    "已有下载正在进行"
);
msg!(tui_status_not_connected, "Connect to Telegram first", "请先连接 Telegram！");
msg!(tui_status_waiting_quit, "Waiting for running downloads before quitting...", "等待进行中的下载完成后退出…");
msg!(tui_folder_set, "Download folder set to", "保存路径已设置为");
msg!(tui_error, "Error", "错误");

// ── Formatted messages ──────────────────────────────────────────

/// "Loaded N chats"
pub fn dialogs_loaded(count: usize) -> String {
    match lang() {
        Lang::En => format!("Status: loaded {count} chat(s)"),
        Lang::Zh => format!("状态: 已加载 {count} 个群组/频道"),
    }
}

/// "N of M files shown"
pub fn files_shown(shown: usize, total: usize) -> String {
    match lang() {
        Lang::En => format!("{shown} of {total} file(s) shown"),
        Lang::Zh => format!("显示 {shown}/{total} 个文件"),
    }
}

/// Status line while one file is transferring.
pub fn status_downloading(file_name: &str) -> String {
    match lang() {
        Lang::En => format!("Downloading: {file_name}"),
        Lang::Zh => format!("正在下载: {file_name}"),
    }
}

/// Aggregate progress line.
pub fn status_downloaded(completed: usize, total: usize) -> String {
    match lang() {
        Lang::En => format!("Downloaded {completed}/{total} file(s)"),
        Lang::Zh => format!("已下载 {completed}/{total} 个文件"),
    }
}

/// Terminal summary of a batch.
pub fn batch_summary(succeeded: usize, attempted: usize, failed: usize, skipped: usize) -> String {
    let mut text = match lang() {
        Lang::En => format!("Download finished: {succeeded}/{attempted} file(s)"),
        Lang::Zh => format!("下载完成！成功 {succeeded}/{attempted} 个文件"),
    };
    if failed > 0 {
        text.push_str(&match lang() {
            Lang::En => format!(", {failed} failed"),
            Lang::Zh => format!("，失败 {failed} 个"),
        });
    }
    if skipped > 0 {
        text.push_str(&match lang() {
            Lang::En => format!(", {skipped} skipped"),
            Lang::Zh => format!("，跳过 {skipped} 个"),
        });
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_code() {
        assert_eq!(Lang::from_code("en"), Some(Lang::En));
        assert_eq!(Lang::from_code("zh"), Some(Lang::Zh));
        assert_eq!(Lang::from_code("en_US"), Some(Lang::En));
        assert_eq!(Lang::from_code("zh_CN.UTF-8"), Some(Lang::Zh));
        assert_eq!(Lang::from_code("zh-TW"), Some(Lang::Zh));
        assert_eq!(Lang::from_code("fr"), None);
    }

    #[test]
    fn test_lang_code_roundtrip() {
        assert_eq!(Lang::from_code(Lang::En.code()), Some(Lang::En));
        assert_eq!(Lang::from_code(Lang::Zh.code()), Some(Lang::Zh));
    }

    #[test]
    fn test_messages_return_strings() {
        assert!(!app_name().is_empty());
        assert!(!app_about().is_empty());
        assert!(!cat_images().is_empty());
        assert!(!tui_hints_files().is_empty());
    }

    #[test]
    fn test_batch_summary_lists_only_nonzero_extras() {
        let plain = batch_summary(3, 3, 0, 0);
        assert!(plain.contains("3/3"));
        let mixed = batch_summary(1, 4, 2, 1);
        assert!(mixed.contains("1/4"));
        assert!(mixed.contains('2'));
    }
}
