// src/git.rs
use std::process::Command;
use thiserror::Error;
use tracing::debug;

pub const PREVIOUS_SUBJECTS_LIMIT: usize = 10;
pub const FILE_LISTING_LIMIT: usize = 200;

// =============================================================================
// COMMAND EXECUTION
// =============================================================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr joined, trimmed. Git splits its chatter across both.
    pub fn combined(&self) -> String {
        let out = self.stdout.trim();
        let err = self.stderr.trim();
        match (out.is_empty(), err.is_empty()) {
            (false, false) => format!("{}\n{}", out, err),
            (false, true) => out.to_string(),
            _ => err.to_string(),
        }
    }
}

/// Runs external programs. Implementations never fail: a spawn error is
/// reported as exit code -1 with the reason in stderr.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> CommandOutput;
}

pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> CommandOutput {
        debug!(program, ?args, "running command");
        match Command::new(program).args(args).output() {
            Ok(o) => CommandOutput {
                stdout: String::from_utf8_lossy(&o.stdout).to_string(),
                stderr: String::from_utf8_lossy(&o.stderr).to_string(),
                exit_code: o.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput {
                stdout: String::new(),
                stderr: e.to_string(),
                exit_code: -1,
            },
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GitError {
    #[error("Git is not installed or not found in PATH.")]
    NotInstalled,
    #[error("Not a git repository. Please initialize git with 'git init'.")]
    NotARepository,
    #[error("No staged changes. Stage your changes first, e.g. \"git add --all\".")]
    NoStagedChanges,
    #[error("git {command} failed: {output}")]
    Command { command: String, output: String },
}

// =============================================================================
// STAGED CHANGES
// =============================================================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChanges {
    pub diff: String,
    /// Recent commit subjects, or a file listing when there is no history yet.
    pub previous_subjects: Option<String>,
}

pub struct Git<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn git(&self, args: &[&str]) -> CommandOutput {
        self.runner.run("git", args)
    }

    pub fn check_environment(&self) -> Result<(), GitError> {
        if !self.git(&["--version"]).success() {
            return Err(GitError::NotInstalled);
        }
        if !self.git(&["rev-parse", "--is-inside-work-tree"]).success() {
            return Err(GitError::NotARepository);
        }
        Ok(())
    }

    pub fn has_previous_commit(&self) -> bool {
        self.git(&["rev-list", "--max-count=1", "HEAD"]).success()
    }

    pub fn staged_diff(&self) -> Result<String, GitError> {
        let out = self.git(&["diff", "--staged", "--unified=5", "--color=never"]);
        if !out.success() {
            return Err(GitError::Command {
                command: "diff --staged".into(),
                output: out.combined(),
            });
        }
        Ok(out.stdout.trim().to_string())
    }

    pub fn previous_subjects(&self, limit: usize) -> Option<String> {
        let n = format!("-n{}", limit);
        let out = self.git(&["log", &n, "--pretty=format:%s"]);
        let subjects = out.stdout.trim();
        (out.success() && !subjects.is_empty()).then(|| subjects.to_string())
    }

    pub fn tracked_files(&self, limit: usize) -> Option<String> {
        let out = self.git(&["ls-files", "--cached", "--others", "--exclude-standard"]);
        if !out.success() {
            return None;
        }
        let files: Vec<&str> = out.stdout.lines().filter(|l| !l.is_empty()).take(limit).collect();
        (!files.is_empty()).then(|| files.join("\n"))
    }

    /// Staged diff plus whatever history exists. Callers run
    /// [`Git::check_environment`] first.
    pub fn collect_staged_changes(&self) -> Result<StagedChanges, GitError> {
        let diff = self.staged_diff()?;
        if diff.is_empty() {
            return Err(GitError::NoStagedChanges);
        }

        let previous_subjects = if self.has_previous_commit() {
            self.previous_subjects(PREVIOUS_SUBJECTS_LIMIT)
        } else {
            self.tracked_files(FILE_LISTING_LIMIT).map(|files| {
                format!(
                    "No commits found in the repository. Repository files:\n{}",
                    files
                )
            })
        };

        Ok(StagedChanges {
            diff,
            previous_subjects,
        })
    }

    pub fn commit(&self, message: &str) -> CommandOutput {
        self.git(&["commit", "-m", message])
    }
}
