//! # popctl
//!
//! 无界面弹窗场景驱动器：在模拟宿主上执行 JSON 场景，逐步输出容器的几何轨迹。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p pop-cli -- run scenarios/bottom-sheet.json
//! cargo run -p pop-cli -- run scenarios/dialog.json --step 0.008 -v
//! cargo run -p pop-cli -- demo navigation
//! cargo run -p pop-cli -- demo dialog --json
//! ```

mod scenario;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use scenario::{Runner, Scenario, TraceRow};

#[derive(Parser)]
#[command(name = "popctl")]
#[command(about = "弹窗场景驱动器 - 在模拟宿主上执行场景并输出几何轨迹")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 每帧时长（秒）
    #[arg(long, default_value = "0.016", global = true)]
    step: f32,

    /// 以 JSON 输出轨迹
    #[arg(long, global = true)]
    json: bool,

    /// 输出调试日志（-vv 输出全部）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行场景文件
    Run {
        /// 场景文件路径
        scenario: PathBuf,
    },

    /// 执行内置演示场景
    Demo {
        #[arg(value_enum)]
        name: Demo,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    /// 贴底弹簧弹出 + 键盘避让
    BottomSheet,
    /// 顶部横幅
    TopBar,
    /// 居中对话框 + 旋转
    Dialog,
    /// 内容尺寸变化后自动重新布局
    AutoSize,
    /// 弹窗内导航栈
    Navigation,
}

impl Demo {
    fn source(self) -> &'static str {
        match self {
            Self::BottomSheet => include_str!("../../scenarios/bottom-sheet.json"),
            Self::TopBar => include_str!("../../scenarios/top-bar.json"),
            Self::Dialog => include_str!("../../scenarios/dialog.json"),
            Self::AutoSize => include_str!("../../scenarios/auto-size.json"),
            Self::Navigation => include_str!("../../scenarios/navigation.json"),
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_trace(rows: &[TraceRow], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        for row in rows {
            println!("{row}");
        }
    }
    Ok(())
}

fn execute(scenario: &Scenario, step: f32, json: bool) -> Result<()> {
    if !json && let Some(name) = &scenario.name {
        println!("# {name}");
    }
    let mut runner = Runner::new(scenario, step)?;
    let rows = runner.run(scenario)?;
    print_trace(&rows, json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let scenario = match &cli.command {
        Commands::Run { scenario } => Scenario::load(scenario)?,
        Commands::Demo { name } => Scenario::from_json(name.source())?,
    };
    execute(&scenario, cli.step, cli.json)
}
