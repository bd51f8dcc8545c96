//! Batch instance launch with poll-until-settled tagging.
//!
//! One launch request per batch; each returned instance is then polled at a
//! fixed interval while it stays `pending` and tagged by outcome. Instances
//! that reach `running` get the template's success tag and are returned;
//! anything else gets the failure tag and is dropped from the result.

use anyhow::{Context, Result};
use tokio::time::Instant;

use crate::application::ports::{ComputeProvider, ProgressReporter};
use crate::domain::{InstanceState, LaunchTemplate, PollSettings};

/// How an instance left the polling loop.
enum Settled {
    State(InstanceState),
    DeadlineExceeded,
}

/// Launch `count` instances from `template` and return the ids of those that
/// reached `running`.
///
/// The result set size is between 0 and `count`; partial failure does not
/// roll back the instances that did start.
///
/// # Errors
///
/// Returns an error if the launch request or any state/tag call fails.
pub async fn launch(
    compute: &impl ComputeProvider,
    reporter: &impl ProgressReporter,
    template: &LaunchTemplate<'_>,
    count: u32,
    poll: PollSettings,
) -> Result<Vec<String>> {
    let instances = compute
        .run_instances(template, count)
        .await
        .context("requesting instances")?;

    let mut started = Vec::new();
    for instance in instances {
        match wait_until_settled(compute, reporter, &instance.id, instance.state, poll).await? {
            Settled::State(InstanceState::Running) => {
                compute
                    .tag_name(&instance.id, template.success_tag)
                    .await
                    .with_context(|| format!("tagging {}", instance.id))?;
                reporter.success(&format!("started {}", instance.id));
                started.push(instance.id);
            }
            Settled::State(state) => {
                reporter.warn(&format!("instance {} entered state '{state}'", instance.id));
                compute
                    .tag_name(&instance.id, template.failure_tag)
                    .await
                    .with_context(|| format!("tagging {}", instance.id))?;
            }
            Settled::DeadlineExceeded => {
                reporter.warn(&format!(
                    "instance {} still pending after {}s; giving up on it",
                    instance.id,
                    poll.deadline.as_secs()
                ));
                compute
                    .tag_name(&instance.id, template.failure_tag)
                    .await
                    .with_context(|| format!("tagging {}", instance.id))?;
            }
        }
    }
    Ok(started)
}

/// Poll `id` until it leaves `pending` or the deadline passes.
async fn wait_until_settled(
    compute: &impl ComputeProvider,
    reporter: &impl ProgressReporter,
    id: &str,
    initial: InstanceState,
    poll: PollSettings,
) -> Result<Settled> {
    let deadline = Instant::now() + poll.deadline;
    let mut state = initial;
    while state == InstanceState::Pending {
        if Instant::now() >= deadline {
            return Ok(Settled::DeadlineExceeded);
        }
        reporter.step(&format!(
            "waiting for {id} to leave pending; polling again in {}s",
            poll.interval.as_secs()
        ));
        tokio::time::sleep(poll.interval).await;
        state = compute
            .instance_state(id)
            .await
            .with_context(|| format!("polling {id}"))?;
    }
    Ok(Settled::State(state))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    use anyhow::Result;

    use super::launch;
    use crate::application::ports::ComputeProvider;
    use crate::application::services::test_support::{
        ReporterStub, fast_poll, impl_compute_stubs, instance, template,
    };
    use crate::domain::{Instance, InstanceState, LaunchTemplate, PollSettings};

    /// Scripted compute stub: instances come back from the launch call in
    /// their initial state, then walk through per-id state sequences on each
    /// poll.
    struct ScriptedCompute {
        launched: Vec<Instance>,
        polls: RefCell<HashMap<String, VecDeque<InstanceState>>>,
        tags: RefCell<Vec<(String, String)>>,
    }

    impl ScriptedCompute {
        fn new(
            launched: Vec<Instance>,
            polls: impl IntoIterator<Item = (&'static str, Vec<InstanceState>)>,
        ) -> Self {
            Self {
                launched,
                polls: RefCell::new(
                    polls
                        .into_iter()
                        .map(|(id, states)| (id.to_owned(), states.into_iter().collect()))
                        .collect(),
                ),
                tags: RefCell::new(Vec::new()),
            }
        }
    }

    impl ComputeProvider for ScriptedCompute {
        async fn run_instances(&self, _: &LaunchTemplate<'_>, _: u32) -> Result<Vec<Instance>> {
            Ok(self.launched.clone())
        }
        async fn instance_state(&self, id: &str) -> Result<InstanceState> {
            self.polls
                .borrow_mut()
                .get_mut(id)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| anyhow::anyhow!("poll script exhausted for {id}"))
        }
        async fn tag_name(&self, id: &str, name: &str) -> Result<()> {
            self.tags.borrow_mut().push((id.to_owned(), name.to_owned()));
            Ok(())
        }
        impl_compute_stubs!(describe_instance, instances_named, describe_instances, terminate);
    }

    #[tokio::test]
    async fn tags_by_outcome_and_returns_only_running() {
        let compute = ScriptedCompute::new(
            vec![
                instance("i-a", InstanceState::Running),
                instance("i-b", InstanceState::Pending),
                instance("i-c", InstanceState::Pending),
            ],
            [
                ("i-b", vec![InstanceState::Pending, InstanceState::Running]),
                ("i-c", vec![InstanceState::Terminated]),
            ],
        );

        let started = launch(&compute, &ReporterStub, &template(), 3, fast_poll())
            .await
            .expect("launch");

        assert_eq!(started, ["i-a", "i-b"]);
        assert_eq!(
            *compute.tags.borrow(),
            vec![
                ("i-a".to_owned(), "Staging App Server".to_owned()),
                ("i-b".to_owned(), "Staging App Server".to_owned()),
                ("i-c".to_owned(), "Dead--Staging App Server".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn deadline_gives_up_and_tags_failure() {
        let compute = ScriptedCompute::new(vec![instance("i-stuck", InstanceState::Pending)], []);
        let poll = PollSettings {
            interval: Duration::ZERO,
            deadline: Duration::ZERO,
        };

        let started = launch(&compute, &ReporterStub, &template(), 1, poll)
            .await
            .expect("launch");

        assert!(started.is_empty());
        assert_eq!(
            *compute.tags.borrow(),
            vec![("i-stuck".to_owned(), "Dead--Staging App Server".to_owned())]
        );
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_result() {
        let compute = ScriptedCompute::new(Vec::new(), []);
        let started = launch(&compute, &ReporterStub, &template(), 1, fast_poll())
            .await
            .expect("launch");
        assert!(started.is_empty());
        assert!(compute.tags.borrow().is_empty());
    }
}
