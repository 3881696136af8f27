// src/commands/commit.rs
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::client::{CandidateSource, LlmClient};
use crate::config::ConfigStore;
use crate::git::{CommandRunner, Git, GitError, SystemRunner};
use crate::spinner::Spinner;
use crate::ui::Picklist;

use super::ensure_configured;

/// Presents candidates and returns the chosen one, `None` on cancel.
pub trait MessagePicker {
    fn pick(&mut self, messages: Vec<String>) -> Result<Option<String>>;
}

impl MessagePicker for Picklist {
    fn pick(&mut self, messages: Vec<String>) -> Result<Option<String>> {
        self.show_messages(messages)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Shown(String),
    Cancelled,
    NoStagedChanges,
    NoCandidates,
    CommitFailed,
}

impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, CommitOutcome::NoCandidates | CommitOutcome::CommitFailed)
    }
}

// =============================================================================
// PIPELINE
// =============================================================================
/// Staged changes → candidates → pick → commit (or print with `show`).
///
/// Expects an environment already accepted by `Git::check_environment`.
/// Provider failures degrade to an empty candidate list.
pub async fn run_commit<R, S, P>(
    git: &Git<R>,
    source: &S,
    picker: &mut P,
    show: bool,
) -> Result<CommitOutcome>
where
    R: CommandRunner,
    S: CandidateSource + ?Sized,
    P: MessagePicker,
{
    let changes = match git.collect_staged_changes() {
        Ok(changes) => changes,
        Err(GitError::NoStagedChanges) => {
            println!("{}", GitError::NoStagedChanges);
            return Ok(CommitOutcome::NoStagedChanges);
        }
        Err(e) => return Err(e.into()),
    };
    debug!(
        diff_chars = changes.diff.len(),
        has_history = changes.previous_subjects.is_some(),
        "collected staged changes"
    );

    let spinner = Spinner::start("Generating commit messages...");
    let candidates = match source.generate(&changes).await {
        Ok(candidates) => {
            spinner
                .succeed(&format!("Generated {} commit messages", candidates.len()))
                .await;
            candidates
        }
        Err(e) => {
            spinner.fail("Failed to generate commit messages").await;
            eprintln!("Error: {:#}", e);
            Vec::new()
        }
    };

    if candidates.is_empty() {
        eprintln!("No commit messages were generated. Check your provider settings with --config.");
        return Ok(CommitOutcome::NoCandidates);
    }
    info!(count = candidates.len(), "received candidates");

    let Some(message) = picker.pick(candidates)? else {
        println!("Cancelled.");
        return Ok(CommitOutcome::Cancelled);
    };

    if show {
        println!("\n    '{}'\n", message);
        return Ok(CommitOutcome::Shown(message));
    }

    let spinner = Spinner::start("Committing changes...");
    let output = git.commit(&message);
    if output.success() {
        spinner.succeed("Committed").await;
        println!("{}", output.stdout.trim_end());
        Ok(CommitOutcome::Committed)
    } else {
        spinner.fail("Commit failed").await;
        warn!(exit_code = output.exit_code, "git commit failed");
        eprintln!("{}", output.combined().trim_end());
        Ok(CommitOutcome::CommitFailed)
    }
}

/// Full interactive flow against the real repository and provider.
pub async fn cmd_commit(store: &ConfigStore, show: bool) -> Result<CommitOutcome> {
    let git = Git::new(SystemRunner);
    // Fail fast on a broken environment before any form is shown.
    git.check_environment()?;

    let Some(config) = ensure_configured(store)? else {
        println!("Cancelled.");
        return Ok(CommitOutcome::Cancelled);
    };

    let client = LlmClient::new(&config)?;
    info!(provider = %config.provider, model = %client.model(), "using provider");

    let mut picker = Picklist::default();
    run_commit(&git, &client, &mut picker, show).await
}
