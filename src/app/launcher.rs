use crate::config::LauncherConfig;
use crate::utils::error::{RecsysError, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// 子程序無法啟動時的結束碼
pub const COMMAND_NOT_FOUND: i32 = 127;

#[cfg(windows)]
const ENV_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const ENV_BIN_DIR: &str = "bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStep {
    Install,
    App,
}

impl fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStep::Install => f.write_str("install"),
            LaunchStep::App => f.write_str("app"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// 啟用後的環境：VIRTUAL_ENV 指向 root，bin_dir 置於 PATH 最前
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedEnv {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
}

impl ActivatedEnv {
    fn detect(working_dir: &Path, candidates: &[String]) -> Result<Option<Self>> {
        for candidate in candidates {
            let dir = working_dir.join(candidate);
            if dir.is_dir() {
                let root = std::fs::canonicalize(&dir)?;
                let bin_dir = root.join(ENV_BIN_DIR);
                return Ok(Some(Self { root, bin_dir }));
            }
        }
        Ok(None)
    }

    fn search_path(&self) -> Result<OsString> {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let entries =
            std::iter::once(self.bin_dir.clone()).chain(std::env::split_paths(&inherited));
        std::env::join_paths(entries).map_err(|e| RecsysError::LaunchError {
            step: "activate".to_string(),
            message: e.to_string(),
        })
    }

    /// 環境內有同名執行檔時優先使用
    fn resolve(&self, program: &str) -> PathBuf {
        let local = self.bin_dir.join(program);
        if local.is_file() {
            return local;
        }
        #[cfg(windows)]
        {
            let exe = self.bin_dir.join(format!("{}.exe", program));
            if exe.is_file() {
                return exe;
            }
        }
        PathBuf::from(program)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Completed,
    Failed { step: LaunchStep, code: i32 },
}

impl LaunchOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchOutcome::Completed => 0,
            LaunchOutcome::Failed { code, .. } => *code,
        }
    }
}

/// 啟用環境、安裝依賴、啟動應用；任一步失敗即停止並回傳該步的結束碼
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub working_dir: PathBuf,
    pub env: Option<ActivatedEnv>,
    pub install: Option<CommandSpec>,
    pub app: CommandSpec,
}

impl LaunchPlan {
    pub fn from_config(config: &LauncherConfig) -> Result<Self> {
        let working_dir = PathBuf::from(&config.working_dir);
        let env = ActivatedEnv::detect(&working_dir, &config.env_dirs)?;
        let app = CommandSpec::from_argv(&config.app).ok_or_else(|| {
            RecsysError::MissingConfigError {
                field: "launcher.app".to_string(),
            }
        })?;

        Ok(Self {
            working_dir,
            env,
            install: CommandSpec::from_argv(&config.install),
            app,
        })
    }

    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.env {
            Some(env) => lines.push(format!("activate {}", env.root.display())),
            None => lines.push("no environment directory found, skipping activation".to_string()),
        }
        if let Some(install) = &self.install {
            lines.push(format!("install: {}", install));
        }
        lines.push(format!("run: {}", self.app));
        lines
    }

    pub async fn run(&self) -> Result<LaunchOutcome> {
        match &self.env {
            Some(env) => tracing::info!("🐍 Activating environment at {}", env.root.display()),
            None => tracing::info!("No environment directory found, using ambient environment"),
        }

        if let Some(install) = &self.install {
            tracing::info!("📦 Installing dependencies: {}", install);
            let code = self.execute(install).await?;
            if code != 0 {
                tracing::error!("❌ Dependency installation failed with status {}", code);
                return Ok(LaunchOutcome::Failed {
                    step: LaunchStep::Install,
                    code,
                });
            }
        }

        tracing::info!("🚀 Starting application: {}", self.app);
        let code = self.execute(&self.app).await?;
        if code != 0 {
            tracing::error!("❌ Application exited with status {}", code);
            return Ok(LaunchOutcome::Failed {
                step: LaunchStep::App,
                code,
            });
        }

        Ok(LaunchOutcome::Completed)
    }

    async fn execute(&self, spec: &CommandSpec) -> Result<i32> {
        let program = match &self.env {
            Some(env) => env.resolve(&spec.program),
            None => PathBuf::from(&spec.program),
        };

        let mut command = tokio::process::Command::new(&program);
        command.args(&spec.args).current_dir(&self.working_dir);
        if let Some(env) = &self.env {
            command
                .env("VIRTUAL_ENV", &env.root)
                .env("PATH", env.search_path()?)
                .env_remove("PYTHONHOME");
        }

        match command.status().await {
            Ok(status) => Ok(exit_code(status)),
            Err(e) => {
                tracing::error!("❌ Could not start '{}': {}", spec.program, e);
                Ok(COMMAND_NOT_FOUND)
            }
        }
    }
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
