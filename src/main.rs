//! CLI entry point for `tgdl`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Runtime;

use tgdl::client::session::SessionFile;
use tgdl::client::{self, ChatClient, LoginPrompt};
use tgdl::config::{Config, ConfigStore, Credentials};
use tgdl::download::{self, BatchOptions, BatchResult, CancelToken, ProgressEvent};
use tgdl::error::TgdlError;
use tgdl::filter::{parse_date, FilterCriteria};
use tgdl::i18n;
use tgdl::model::attachment::AttachmentMessage;
use tgdl::model::category::FileCategory;
use tgdl::model::dialog::{find_dialog, Dialog};

#[derive(Parser)]
#[command(name = "tgdl", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Language (en, zh). Defaults to system locale.
    #[arg(long, value_name = "LANG", global = true)]
    lang: Option<String>,

    /// Path of the config file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Path of the session file
    #[arg(long, value_name = "PATH", global = true)]
    session: Option<PathBuf>,
}

/// Options shared by the listing and download commands.
#[derive(clap::Args)]
struct ChatFilter {
    /// Chat id, exact name, or a unique part of the name
    chat: String,

    /// Only files posted on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    since: Option<chrono::NaiveDate>,

    /// File category (repeatable)
    #[arg(short, long = "category", value_name = "CATEGORY")]
    categories: Vec<FileCategory>,

    /// How many recent messages to scan
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

impl ChatFilter {
    fn criteria(&self) -> FilterCriteria {
        if self.categories.is_empty() {
            FilterCriteria {
                min_date: self.since,
                ..FilterCriteria::default()
            }
        } else {
            FilterCriteria::new(self.since, self.categories.iter().copied())
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open the terminal UI
    Open,
    /// Log in and create the session file
    Login,
    /// List groups and channels
    Dialogs {
        #[arg(long)]
        json: bool,
    },
    /// List the downloadable files of a chat
    Files {
        #[command(flatten)]
        filter: ChatFilter,
        #[arg(long)]
        json: bool,
    },
    /// Download files of a chat
    Download {
        #[command(flatten)]
        filter: ChatFilter,
        /// Download folder
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Maximum parallel downloads
        #[arg(short = 'j', long, value_name = "N")]
        concurrency: Option<usize>,
        /// Only these message ids
        #[arg(long, value_name = "ID", value_delimiter = ',')]
        ids: Vec<i32>,
        #[arg(long)]
        json: bool,
    },
    /// Show or change the configuration
    Config {
        /// Set the default download folder
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

/// Detect language early from --lang, the config file or the environment,
/// before clap processes --help.
fn detect_lang_early() -> i18n::Lang {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--lang" {
            if let Some(lang) = args.get(i + 1).and_then(|c| i18n::Lang::from_code(c)) {
                return lang;
            }
        }
        if let Some(lang) = args[i]
            .strip_prefix("--lang=")
            .and_then(i18n::Lang::from_code)
        {
            return lang;
        }
    }

    let from_config = ConfigStore::locate(None)
        .ok()
        .and_then(|store| store.load().ok().flatten())
        .and_then(|cfg| cfg.lang)
        .and_then(|code| i18n::Lang::from_code(&code));

    from_config.unwrap_or_else(i18n::detect_system_lang)
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    let mut cmd = Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about())
        .after_help(i18n::app_after_help())
        .mut_arg("verbose", |a| a.help(i18n::help_verbose()))
        .mut_arg("lang", |a| a.help(i18n::help_lang()))
        .mut_arg("config", |a| a.help(i18n::help_config()))
        .mut_arg("session", |a| a.help(i18n::help_session()));

    let names: Vec<String> = cmd
        .get_subcommands()
        .map(|s| s.get_name().to_string())
        .collect();

    for name in names {
        cmd = cmd.mut_subcommand(&name, |s| {
            let s = match s.get_name() {
                "open" => s.about(i18n::help_cmd_open()),
                "login" => s.about(i18n::help_cmd_login()),
                "dialogs" => s.about(i18n::help_cmd_dialogs()),
                "files" => s.about(i18n::help_cmd_files()),
                "download" => s
                    .about(i18n::help_cmd_download())
                    .mut_arg("output", |a| a.help(i18n::help_output_dir()))
                    .mut_arg("concurrency", |a| a.help(i18n::help_concurrency()))
                    .mut_arg("ids", |a| a.help(i18n::help_ids())),
                "config" => s
                    .about(i18n::help_cmd_config())
                    .mut_arg("download_dir", |a| a.help(i18n::help_set_download_dir())),
                "completions" => s.about(i18n::help_cmd_completions()),
                "manpage" => s.about(i18n::help_cmd_manpage()),
                _ => s,
            };
            localize_common_args(s)
        });
    }

    cmd
}

fn localize_common_args(mut cmd: clap::Command) -> clap::Command {
    let ids: Vec<String> = cmd.get_arguments().map(|a| a.get_id().to_string()).collect();
    for id in ids {
        let help = match id.as_str() {
            "chat" => i18n::help_chat_arg(),
            "since" => i18n::help_since(),
            "categories" => i18n::help_category(),
            "limit" => i18n::help_limit(),
            "json" => i18n::help_output_json(),
            _ => continue,
        };
        cmd = cmd.mut_arg(id, |a| a.help(help));
    }
    cmd
}

fn main() -> anyhow::Result<()> {
    // Detect language BEFORE clap parsing so --help is localized
    i18n::set_lang(detect_lang_early());

    let matches = build_localized_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let store = ConfigStore::locate(cli.config.clone())?;
    let config = store.load_or_default()?;
    let session = SessionFile::locate(cli.session.clone())?;

    let log_level = match cli.verbose {
        0 => config.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    // The TUI owns the terminal, so it only logs to the file.
    let in_tui = matches!(cli.command, None | Some(Commands::Open));
    setup_logging(&log_level, !in_tui);

    match cli.command {
        None | Some(Commands::Open) => cmd_open(config, store, session),
        Some(Commands::Login) => cmd_login(config, store, session),
        Some(Commands::Dialogs { json }) => cmd_dialogs(&config, &session, json),
        Some(Commands::Files { filter, json }) => cmd_files(&config, &session, &filter, json),
        Some(Commands::Download {
            filter,
            output,
            concurrency,
            ids,
            json,
        }) => cmd_download(&config, &session, &filter, output, concurrency, &ids, json),
        Some(Commands::Config { download_dir, json }) => {
            cmd_config(config, &store, &session, download_dir, json)
        }
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
    }
}

/// Set up tracing with optional stderr output and file logging.
fn setup_logging(level: &str, to_stderr: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = to_stderr
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    // Try to set up file logging
    let log_dir = tgdl::config::cache_dir();
    let file_layer = std::fs::create_dir_all(&log_dir).is_ok().then(|| {
        let file_appender = tracing_appender::rolling::never(&log_dir, "tgdl.log");
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn runtime() -> anyhow::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn cmd_open(config: Config, store: ConfigStore, session: SessionFile) -> anyhow::Result<()> {
    let rt = runtime()?;
    tgdl::tui::run_tui(config, Some(store), session, rt.handle().clone())
}

// ── Login ───────────────────────────────────────────────────────

struct TerminalPrompt;

fn prompt_err(e: dialoguer::Error) -> TgdlError {
    TgdlError::Prompt(e.to_string())
}

impl LoginPrompt for TerminalPrompt {
    fn phone(&self) -> tgdl::error::Result<String> {
        Input::<String>::new()
            .with_prompt(i18n::prompt_phone())
            .interact_text()
            .map_err(prompt_err)
    }

    fn code(&self) -> tgdl::error::Result<String> {
        Input::<String>::new()
            .with_prompt(i18n::prompt_code())
            .interact_text()
            .map_err(prompt_err)
    }

    fn password(&self, hint: Option<&str>) -> tgdl::error::Result<String> {
        let prompt = match hint {
            Some(h) if !h.is_empty() => format!("{} ({h})", i18n::prompt_password()),
            _ => i18n::prompt_password().to_string(),
        };
        Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(prompt_err)
    }
}

fn cmd_login(config: Config, store: ConfigStore, session: SessionFile) -> anyhow::Result<()> {
    if !cfg!(feature = "telegram") {
        return Err(TgdlError::BackendUnavailable.into());
    }

    let mut api_id_input = Input::<i32>::new().with_prompt(i18n::prompt_api_id());
    if let Some(id) = config.api_id {
        api_id_input = api_id_input.default(id);
    }
    let api_id = api_id_input.interact_text()?;

    let mut api_hash_input = Input::<String>::new().with_prompt(i18n::prompt_api_hash());
    if let Some(hash) = &config.api_hash {
        api_hash_input = api_hash_input.default(hash.clone());
    }
    let api_hash = api_hash_input.interact_text()?.trim().to_string();

    let mut config = Config {
        api_id: Some(api_id),
        api_hash: Some(api_hash),
        ..config
    };
    if config.download_dir.is_none() {
        config.download_dir = Some(std::env::current_dir()?);
    }
    let credentials: Credentials = config.credentials()?;

    session.prepare_dir()?;
    let rt = runtime()?;
    let user = rt.block_on(client::login(&credentials, &session, &TerminalPrompt))?;

    store.save(&config)?;
    println!("  {} {}", i18n::login_success(), session.path().display());
    println!("  {} {}", i18n::login_config_saved(), store.path().display());
    tracing::info!(user = %user, "Login complete");

    let open = Confirm::new()
        .with_prompt(i18n::prompt_open_tui())
        .default(true)
        .interact()?;
    if open {
        tgdl::tui::run_tui(config, Some(store), session, rt.handle().clone())?;
    }
    Ok(())
}

// ── Listing ─────────────────────────────────────────────────────

async fn open_chat(
    config: &Config,
    session: &SessionFile,
    filter: &ChatFilter,
) -> anyhow::Result<(Arc<dyn ChatClient>, Dialog, Vec<AttachmentMessage>)> {
    let client = client::connect(config, session).await?;
    let dialogs = client.list_dialogs().await?;
    let dialog = find_dialog(&dialogs, &filter.chat)?.clone();

    let limit = filter.limit.unwrap_or(config.message_limit);
    let listed = client.list_attachment_messages(&dialog, limit).await?;
    let filtered = filter.criteria().apply(&listed);
    tracing::info!(
        chat = %dialog.name,
        listed = listed.len(),
        kept = filtered.len(),
        "Filtered attachments"
    );
    Ok((client, dialog, filtered))
}

fn cmd_dialogs(config: &Config, session: &SessionFile, json: bool) -> anyhow::Result<()> {
    let rt = runtime()?;
    let dialogs = rt.block_on(async {
        let client = client::connect(config, session).await?;
        client.list_dialogs().await
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dialogs)?);
        return Ok(());
    }

    if dialogs.is_empty() {
        println!("  {}", i18n::cli_no_dialogs());
        return Ok(());
    }

    println!();
    println!(
        "  {:<16} {:<8} {}",
        i18n::col_id(),
        i18n::col_kind(),
        i18n::col_name()
    );
    println!("  {}", "-".repeat(60));
    for d in &dialogs {
        println!("  {:<16} {:<8} {}", d.id, d.kind.as_str(), d.name);
    }
    println!();
    Ok(())
}

fn cmd_files(
    config: &Config,
    session: &SessionFile,
    filter: &ChatFilter,
    json: bool,
) -> anyhow::Result<()> {
    let rt = runtime()?;
    let (_, dialog, files) = rt.block_on(open_chat(config, session, filter))?;

    if json {
        let output = serde_json::json!({
            "chat": dialog,
            "file_count": files.len(),
            "files": files,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_files_table(&dialog, &files);
    Ok(())
}

fn print_files_table(dialog: &Dialog, files: &[AttachmentMessage]) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {}  ({})", dialog.name, files.len());
    println!();

    if files.is_empty() {
        println!("  {}", i18n::cli_no_files());
        return;
    }

    println!(
        "  {:<10} {:<17} {:<10} {:>10}  {}",
        i18n::col_id(),
        i18n::col_date(),
        i18n::col_category(),
        i18n::col_size(),
        i18n::col_name()
    );
    println!("  {}", "-".repeat(90));

    for m in files {
        let date = m.date.format("%Y-%m-%d %H:%M").to_string();
        let category = m.category().map(FileCategory::name).unwrap_or_default();
        let size = m.size.map(|s| format_size(s, BINARY)).unwrap_or_default();
        println!(
            "  {:<10} {:<17} {:<10} {:>10}  {}",
            m.id,
            date,
            category,
            size,
            m.display_name()
        );
    }
    println!();
}

// ── Download ────────────────────────────────────────────────────

fn cmd_download(
    config: &Config,
    session: &SessionFile,
    filter: &ChatFilter,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
    ids: &[i32],
    json: bool,
) -> anyhow::Result<()> {
    let rt = runtime()?;
    let dir = output.unwrap_or_else(|| config.download_dir());
    let marked: HashSet<i32> = ids.iter().copied().collect();

    let result = rt.block_on(async {
        let (client, dialog, files) = open_chat(config, session, filter).await?;
        let tasks = download::plan_batch(&files, &marked, &dir)?;

        let pb = ProgressBar::new(tasks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {{msg}}",
                    i18n::cli_downloading()
                ))?
                .progress_chars("#>-"),
        );
        if json {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }

        let cancel = CancelToken::new();
        let watcher = {
            let cancel = cancel.clone();
            let pb = pb.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    pb.println(format!("  {}", i18n::cli_cancelling()));
                    cancel.cancel();
                }
            })
        };

        let options = BatchOptions {
            concurrency: concurrency.unwrap_or_else(|| config.concurrency()),
            cancel: Some(cancel),
        };
        let progress = pb.clone();
        let on_progress = move |event: ProgressEvent| match event {
            ProgressEvent::Started { file_name, .. } => progress.set_message(file_name),
            ProgressEvent::Completed { completed, .. } => progress.set_position(completed as u64),
            ProgressEvent::Failed { file_name, error } => {
                progress.println(format!("  {} {file_name}: {error}", i18n::cli_failed_items()));
            }
        };

        tracing::info!(chat = %dialog.name, tasks = tasks.len(), "Downloading");
        let result = download::run_batch(client.as_ref(), tasks, &dir, &options, &on_progress).await;
        watcher.abort();
        pb.finish_and_clear();
        anyhow::Ok(result)
    })?;

    report_batch(&result, json)
}

fn report_batch(result: &BatchResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!();
        println!("  {}", result.summary());
        println!("  {} {}", i18n::cli_files_saved_in(), result.destination_dir.display());
        if !result.failures.is_empty() {
            println!();
            println!("  {}", i18n::cli_failed_items());
            for f in &result.failures {
                println!("    {}: {}", f.file_name, f.error);
            }
        }
        println!();
    }

    if result.skipped > 0 {
        return Err(TgdlError::Cancelled.into());
    }
    if !result.failures.is_empty() {
        anyhow::bail!(result.summary());
    }
    Ok(())
}

// ── Config ──────────────────────────────────────────────────────

fn cmd_config(
    mut config: Config,
    store: &ConfigStore,
    session: &SessionFile,
    download_dir: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(dir) = download_dir {
        config.download_dir = Some(dir);
        store.save(&config)?;
        if !json {
            println!("  {}: {}", i18n::cli_config_updated(), store.path().display());
        }
    }

    let masked_hash = config.api_hash.as_deref().map(mask_secret);

    if json {
        let output = serde_json::json!({
            "config_file": store.path(),
            "session_file": session.path(),
            "log_file": tgdl::config::log_file_path(),
            "logged_in": session.exists(),
            "api_id": config.api_id,
            "api_hash": masked_hash,
            "download_dir": config.download_dir(),
            "concurrency": config.concurrency(),
            "message_limit": config.message_limit,
            "log_level": config.log_level,
            "lang": config.lang,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let not_set = i18n::cli_not_set();
    let login_state = if session.exists() {
        i18n::cli_logged_in()
    } else {
        i18n::cli_not_logged_in()
    };
    println!();
    println!("  {:<16} {}", i18n::cli_config_file(), store.path().display());
    println!(
        "  {:<16} {} ({login_state})",
        i18n::cli_session_file(),
        session.path().display()
    );
    println!(
        "  {:<16} {}",
        "api_id",
        config.api_id.map(|id| id.to_string()).unwrap_or_else(|| not_set.to_string())
    );
    println!("  {:<16} {}", "api_hash", masked_hash.as_deref().unwrap_or(not_set));
    println!("  {:<16} {}", i18n::cli_download_dir(), config.download_dir().display());
    println!("  {:<16} {}", "concurrency", config.concurrency());
    println!("  {:<16} {}", "message_limit", config.message_limit);
    println!("  {:<16} {}", "log_file", tgdl::config::log_file_path().display());
    println!();
    Ok(())
}

/// Show only the first and last two characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

// ── Completions / manpage ───────────────────────────────────────

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "tgdl", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_localized_command_keeps_subcommands() {
        let cmd = build_localized_command();
        let names: BTreeSet<&str> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for expected in ["open", "login", "dialogs", "files", "download", "config"] {
            assert!(names.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn test_download_args_parse() {
        let cli = Cli::try_parse_from([
            "tgdl", "download", "News", "--since", "2024-01-01", "-c", "images", "-c", "videos",
            "--ids", "3,5", "-j", "2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Download {
                filter,
                ids,
                concurrency,
                ..
            }) => {
                assert_eq!(filter.chat, "News");
                assert_eq!(filter.categories, vec![FileCategory::Images, FileCategory::Videos]);
                assert_eq!(ids, vec![3, 5]);
                assert_eq!(concurrency, Some(2));
                assert_eq!(filter.criteria().categories.len(), 2);
            }
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn test_no_category_means_all() {
        let cli = Cli::try_parse_from(["tgdl", "files", "News"]).unwrap();
        match cli.command {
            Some(Commands::Files { filter, .. }) => {
                assert_eq!(filter.criteria().categories.len(), FileCategory::ALL.len());
            }
            _ => panic!("expected files"),
        }
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["tgdl", "files", "News", "--since", "01/02/2024"]).is_err());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdef0123"), "ab******23");
        assert_eq!(mask_secret("abc"), "***");
    }
}
