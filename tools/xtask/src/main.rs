//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 pop-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `scenario-check`: 检查场景文件（JSON 结构、弹窗配置、步骤）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use pop_runtime::{HostConfig, PopConfig};
use serde_json::Value;
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "pop-runtime", "--html"]);
            run("cargo llvm-cov -p pop-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 xtask，避免稀释信号
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scenario-check" => {
            let path = args.next();
            scenario_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all        运行 fmt、clippy、test 门禁检查
  cov-runtime      运行 pop-runtime 覆盖率报告
  cov-workspace    运行 workspace 覆盖率报告
  scenario-check   检查场景文件

SCENARIO-CHECK:
  cargo xtask scenario-check [path]

  不带参数：检查 scenarios/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 语法错误
    - host / popup 配置能否解析，popup 数值是否合法
    - content 尺寸是否为零
    - 未知的步骤 action、缺少的步骤参数
"#
    );
}

//=============================================================================
// scenario-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const SCENARIOS_DIR: &str = "scenarios";

/// 已知的步骤及其必需参数
const STEPS: &[(&str, &[&str])] = &[
    ("present", &[]),
    ("dismiss", &[]),
    ("wait", &["seconds"]),
    ("settle", &[]),
    ("rotate", &["orientation"]),
    ("resize", &["width", "height"]),
    ("keyboard_show", &["height"]),
    ("keyboard_hide", &[]),
    ("tap_backdrop", &[]),
    ("focus_input", &[]),
    ("content_size", &["width", "height"]),
    ("push", &["width", "height"]),
    ("pop", &[]),
];

/// 单个文件的问题
struct Problem {
    file: String,
    message: String,
}

/// 执行场景检查
fn scenario_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scenario_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(SCENARIOS_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scenario_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut problems = Vec::new();
    for file in &files {
        let file_id = file.display().to_string();
        for message in check_scenario_file(file) {
            problems.push(Problem {
                file: file_id.clone(),
                message,
            });
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个场景", files.len());
    eprintln!();
    for problem in &problems {
        eprintln!("[ERROR] {}: {}", problem.file, problem.message);
    }

    eprintln!();
    if problems.is_empty() {
        eprintln!("✅ 检查通过，无错误");
        Ok(())
    } else {
        eprintln!("❌ {} 个错误", problems.len());
        anyhow::bail!("场景检查发现错误");
    }
}

/// 收集目录下的所有场景文件
fn collect_scenario_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个场景文件，返回发现的问题
fn check_scenario_file(file: &Path) -> Vec<String> {
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => return vec![format!("无法读取文件 - {e}")],
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => check_scenario(&value),
        Err(e) => vec![format!("JSON 解析失败 - {e}")],
    }
}

fn check_scenario(value: &Value) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some(host) = value.get("host")
        && let Err(e) = serde_json::from_value::<HostConfig>(host.clone())
    {
        problems.push(format!("host 配置无效 - {e}"));
    }

    if let Some(popup) = value.get("popup") {
        match serde_json::from_value::<PopConfig>(popup.clone()) {
            Ok(config) => {
                if let Err(e) = config.validate() {
                    problems.push(format!("popup 配置无效 - {e}"));
                }
            }
            Err(e) => problems.push(format!("popup 配置无效 - {e}")),
        }
    }

    let navigation = match value.get("content") {
        Some(content) => {
            let width = content.get("width").and_then(Value::as_f64);
            let height = content.get("height").and_then(Value::as_f64);
            match (width, height) {
                (Some(w), Some(h)) if w == 0.0 && h == 0.0 => {
                    problems.push("content 尺寸为零".to_string());
                }
                (Some(_), Some(_)) => {}
                _ => problems.push("content 缺少 width / height".to_string()),
            }
            content
                .get("navigation")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        }
        None => {
            problems.push("缺少 content".to_string());
            false
        }
    };

    match value.get("steps").and_then(Value::as_array) {
        Some(steps) if steps.is_empty() => problems.push("steps 为空".to_string()),
        Some(steps) => {
            for (index, step) in steps.iter().enumerate() {
                if let Err(message) = check_step(step, navigation) {
                    problems.push(format!("steps[{index}]: {message}"));
                }
            }
        }
        None => problems.push("缺少 steps 数组".to_string()),
    }

    problems
}

fn check_step(step: &Value, navigation: bool) -> Result<(), String> {
    let action = step
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| "缺少 action".to_string())?;
    let (_, required) = STEPS
        .iter()
        .find(|(name, _)| *name == action)
        .ok_or_else(|| format!("未知的 action '{action}'"))?;
    for key in *required {
        if step.get(*key).is_none() {
            return Err(format!("'{action}' 缺少参数 '{key}'"));
        }
    }
    if matches!(action, "push" | "pop") && !navigation {
        return Err(format!("'{action}' 需要 content.navigation = true"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_scenario() {
        let value = json!({
            "popup": { "position": "bottom" },
            "content": { "width": 300, "height": 200 },
            "steps": [{ "action": "present" }, { "action": "wait", "seconds": 0.2 }]
        });
        assert!(check_scenario(&value).is_empty());
    }

    #[test]
    fn test_reports_problems() {
        let value = json!({
            "popup": { "backdrop_alpha": 2.0 },
            "content": { "width": 0, "height": 0 },
            "steps": [{ "action": "wait" }, { "action": "explode" }, { "action": "pop" }]
        });
        let problems = check_scenario(&value);
        assert_eq!(problems.len(), 5, "{problems:?}");
    }
}
