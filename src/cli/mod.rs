use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::config::EffectiveConfig;
use crate::exit::ExitCode;
use crate::hooks::Decision;
use crate::ui::UiConfig;
use crate::validate::TargetOutcome;

#[derive(Debug, Parser)]
#[command(
    name = "ccaudit",
    version,
    about = "AI 编码助手插件包的配置安全审计与结构验证工具"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// 插件根目录（默认: 配置项 audit.root 或当前目录）
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 执行 8 类配置安全检查并给出评级
    Audit(AuditArgs),
    /// 验证插件组件的结构完整性
    Validate(ValidateArgs),
    /// 以生命周期 hook 的身份运行（stdin 读取 JSON 事件）
    Hook(HookArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct AuditArgs {}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(value_enum)]
    pub target: ValidateTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateTarget {
    Agents,
    Commands,
    Skills,
    Hooks,
    All,
}

#[derive(Debug, Args)]
pub struct HookArgs {
    #[arg(value_enum)]
    pub name: HookName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum HookName {
    ValidateCommand,
    ProtectFiles,
    CheckSecrets,
    SuggestCompact,
    AutoArchive,
    SessionStart,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let stdout_is_tty = std::io::stdout().is_terminal();

    let home_dir = crate::platform::effective_home_dir()?;
    let cfg = crate::config::load(cli.config.as_deref(), &home_dir)
        .map_err(crate::exit::invalid_args_err)?;

    let ui_cfg = UiConfig {
        color: stdout_is_tty && cfg.ui.color && !cli.no_color,
        quiet: cli.quiet,
        verbose: cli.verbose,
        max_findings: cfg.ui.max_findings,
    };

    match cli.command {
        Commands::Audit(_args) => {
            let plugin_root = resolve_plugin_root(cli.root, &cfg)?;
            let ctx = crate::audit::AuditContext::new(plugin_root);
            let report = crate::audit::run_audit(&ctx, ui_cfg.verbose);

            if cli.json {
                write_json(&report)?;
            } else {
                crate::ui::print_audit(&report, &ui_cfg);
            }

            if report.counts.critical > 0 {
                Ok(ExitCode::ValidationFailed)
            } else {
                Ok(ExitCode::Success)
            }
        }
        Commands::Validate(args) => {
            if cli.json {
                return Err(crate::exit::invalid_args("validate 不支持 --json"));
            }
            let plugin_root = resolve_plugin_root(cli.root, &cfg)?;

            let outcomes: Vec<TargetOutcome> = match args.target {
                ValidateTarget::Agents => vec![crate::validate::validate_agents(&plugin_root)],
                ValidateTarget::Commands => vec![crate::validate::validate_commands(&plugin_root)],
                ValidateTarget::Skills => vec![crate::validate::validate_skills(&plugin_root)],
                ValidateTarget::Hooks => vec![crate::validate::validate_hooks(&plugin_root)],
                ValidateTarget::All => vec![
                    crate::validate::validate_agents(&plugin_root),
                    crate::validate::validate_skills(&plugin_root),
                    crate::validate::validate_commands(&plugin_root),
                    crate::validate::validate_hooks(&plugin_root),
                ],
            };

            crate::ui::print_validation(&outcomes, &ui_cfg);
            if args.target == ValidateTarget::All {
                crate::ui::print_validation_summary(&outcomes, &ui_cfg);
            }

            if outcomes.iter().any(TargetOutcome::has_errors) {
                Ok(ExitCode::ValidationFailed)
            } else {
                Ok(ExitCode::Success)
            }
        }
        Commands::Hook(args) => Ok(run_hook(args.name, &cfg)),
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "ccaudit", &mut out);
            Ok(ExitCode::Success)
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: 请使用 `ccaudit config --show`");
            }
            Ok(ExitCode::Success)
        }
    }
}

fn resolve_plugin_root(flag: Option<PathBuf>, cfg: &EffectiveConfig) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root);
    }
    if let Some(root) = &cfg.audit.root {
        return Ok(PathBuf::from(root));
    }
    std::env::current_dir().map_err(|e| anyhow::anyhow!("无法确定当前目录: {e}"))
}

/// Fail-open boundary: malformed input or a handler error always maps
/// to Allow so a broken hook never blocks the assistant.
fn run_hook(name: HookName, cfg: &EffectiveConfig) -> ExitCode {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        return ExitCode::Success;
    }
    let Some(event) = crate::hooks::HookEvent::parse(&input) else {
        return ExitCode::Success;
    };

    let decision = match name {
        HookName::ValidateCommand => crate::hooks::validate_command::run(&event),
        HookName::ProtectFiles => crate::hooks::protect_files::run(&event),
        HookName::CheckSecrets => crate::hooks::check_secrets::run(&event),
        HookName::SuggestCompact => crate::hooks::suggest_compact::run(&event, &cfg.hooks),
        HookName::AutoArchive => crate::hooks::auto_archive::run(&event, &cfg.hooks),
        HookName::SessionStart => crate::hooks::session_start::run(&event),
    }
    .unwrap_or(Decision::Allow);

    match decision {
        Decision::Allow => ExitCode::Success,
        Decision::Block { .. } => ExitCode::Blocked,
        Decision::AllowWithContext { context } => {
            let payload = serde_json::json!({
                "hookSpecificOutput": { "additionalContext": context }
            });
            println!("{payload}");
            ExitCode::Success
        }
    }
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "不支持的 shell: {other}（请指定 bash|zsh|fish）"
        ))),
    }
}
