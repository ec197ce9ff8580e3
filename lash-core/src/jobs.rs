//! Background job management.
//!
//! A background job runs on its own task and shares the interpreter state with the foreground
//! session: variable assignments and directory changes made by either side are visible to the
//! other, and the last write wins.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::interp::{self, ExecutionParameters};
use crate::sinks::OutputSink;
use crate::{Error, Shell, trace_categories};

/// Represents the current execution state of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    /// The job is still running.
    Running,
    /// The job finished with exit code 0.
    Done,
    /// The job finished with a non-zero exit code, or could not complete.
    Failed,
}

impl Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Running => "Running",
            Self::Done => "Done",
            Self::Failed => "Failed",
        })
    }
}

/// A snapshot of a background job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobInfo {
    /// Session-unique, monotonically assigned id.
    pub id: usize,
    /// The command line the job runs.
    pub command: String,
    /// Current state.
    pub state: JobState,
    /// Exit code, once the job has finished.
    pub exit_code: Option<u8>,
}

impl Display for JobInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let exit_code = self
            .exit_code
            .map_or_else(|| "-".to_owned(), |code| code.to_string());
        write!(
            f,
            "[{}]  {:<8}{:<4}{}",
            self.id, self.state, exit_code, self.command
        )
    }
}

struct Job {
    info: JobInfo,
    handle: Option<tokio::task::JoinHandle<()>>,
}

/// Manages the background jobs of a shell session. Jobs are never removed.
#[derive(Default)]
pub struct JobManager {
    next_id: usize,
    jobs: BTreeMap<usize, Job>,
}

impl JobManager {
    fn add(&mut self, command: &str) -> JobInfo {
        self.next_id += 1;
        let info = JobInfo {
            id: self.next_id,
            command: command.to_owned(),
            state: JobState::Running,
            exit_code: None,
        };

        self.jobs.insert(
            info.id,
            Job {
                info: info.clone(),
                handle: None,
            },
        );
        info
    }

    fn attach(&mut self, id: usize, handle: tokio::task::JoinHandle<()>) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.handle = Some(handle);
        }
    }

    fn complete(&mut self, id: usize, exit_code: Option<u8>) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.info.exit_code = exit_code;
            job.info.state = if exit_code == Some(0) {
                JobState::Done
            } else {
                JobState::Failed
            };
        }
    }

    /// Returns snapshots of all jobs, by id.
    pub fn snapshot(&self) -> Vec<JobInfo> {
        self.jobs.values().map(|job| job.info.clone()).collect()
    }

    /// Returns a snapshot of one job.
    ///
    /// # Arguments
    ///
    /// * `id` - The job's id.
    pub fn get(&self, id: usize) -> Option<JobInfo> {
        self.jobs.get(&id).map(|job| job.info.clone())
    }

    fn take_handles(&mut self, id: Option<usize>) -> Vec<tokio::task::JoinHandle<()>> {
        self.jobs
            .iter_mut()
            .filter(|(job_id, _)| id.is_none_or(|id| **job_id == id))
            .filter_map(|(_, job)| job.handle.take())
            .collect()
    }
}

/// Starts running a command line as a background job and returns its initial snapshot.
///
/// The job's standard output is discarded; its standard error goes to the caller's sink.
///
/// # Arguments
///
/// * `shell` - The shell the job runs in.
/// * `command` - The command line, without its trailing `&`.
/// * `params` - The caller's execution parameters.
pub(crate) fn start(shell: &Shell, command: &str, params: &ExecutionParameters) -> JobInfo {
    let info = shell.with_jobs_mut(|jobs| jobs.add(command));
    tracing::debug!(target: trace_categories::JOBS, "starting job [{}]: {command}", info.id);

    let job_params = ExecutionParameters {
        stdout: OutputSink::Null,
        stdin: None,
        ..params.clone()
    };
    let job_shell = shell.clone();
    let job_command = command.to_owned();
    let id = info.id;

    let handle = tokio::spawn(async move {
        let run = interp::execute_source(&job_shell, &job_command, &job_params);
        let exit_code = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(result)) => Some(result.code()),
            Ok(Err(e)) => {
                interp::report_error(&job_shell, &job_params, &e);
                None
            }
            Err(_) => {
                let error = Error::JobPanicked(id);
                tracing::error!(target: trace_categories::JOBS, "{error}");
                interp::report_error(&job_shell, &job_params, &error);
                None
            }
        };

        tracing::debug!(target: trace_categories::JOBS, "job [{id}] finished: {exit_code:?}");
        job_shell.with_jobs_mut(|jobs| jobs.complete(id, exit_code));
    });

    shell.with_jobs_mut(|jobs| jobs.attach(id, handle));
    info
}

/// Waits for one job, or all jobs, to finish.
///
/// # Arguments
///
/// * `shell` - The shell whose jobs to wait for.
/// * `id` - The job to wait for; `None` waits for every job.
pub(crate) async fn wait(shell: &Shell, id: Option<usize>) -> Result<(), Error> {
    let handles = shell.with_jobs_mut(|jobs| jobs.take_handles(id));
    for handle in handles {
        handle.await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_monotonic_and_states_recorded() {
        let mut jobs = JobManager::default();
        let first = jobs.add("sleep 1");
        let second = jobs.add("false");
        assert_eq!((first.id, second.id), (1, 2));

        jobs.complete(1, Some(0));
        jobs.complete(2, Some(1));
        let states: Vec<JobState> = jobs.snapshot().into_iter().map(|j| j.state).collect();
        assert_eq!(states, vec![JobState::Done, JobState::Failed]);
        assert_eq!(jobs.add("x").id, 3);
    }

    #[tokio::test]
    async fn job_errors_reach_the_callers_stderr() -> Result<(), Error> {
        let shell = Shell::new(
            std::sync::Arc::new(crate::fs::MemoryFs::new()),
            crate::CreateOptions::default(),
        );
        let params = ExecutionParameters::capturing();

        let info = start(&shell, "nosuch", &params);
        wait(&shell, Some(info.id)).await?;

        let jobs = shell.jobs_snapshot();
        assert_eq!(jobs[0].state, JobState::Failed);
        assert_eq!(jobs[0].exit_code, Some(127));
        assert!(params.stderr_text().contains("nosuch: command not found"));
        assert_eq!(params.stdout_text(), "");
        Ok(())
    }

    #[test]
    fn job_panics_are_fatal() {
        let error = Error::JobPanicked(4);
        assert_eq!(error.to_string(), "[4] job panicked");
        assert_eq!(error.exit_code(), crate::ExecutionExitCode::Fatal);
    }

    #[test]
    fn display() {
        let info = JobInfo {
            id: 3,
            command: "sleep 1".into(),
            state: JobState::Done,
            exit_code: Some(0),
        };
        assert_eq!(info.to_string(), "[3]  Done    0   sleep 1");
    }
}
