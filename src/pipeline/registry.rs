//! Topic → subscriber routing, validated before the pipeline runs.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use crate::models::event::{Event, Topic};
use crate::pipeline::Step;
use crate::services::queue::EventSink;

/// Collects steps and external event sources, then validates the wiring.
#[derive(Default)]
pub struct Registry {
    steps: Vec<Arc<dyn Step>>,
    sources: Vec<(&'static str, &'static [Topic])>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Declare a non-step emitter (an HTTP route, a cron job).
    pub fn source(mut self, name: &'static str, emits: &'static [Topic]) -> Self {
        self.sources.push((name, emits));
        self
    }

    /// Build the routing table. Fails if any step or source can emit a topic
    /// nobody subscribes to.
    pub fn build(self) -> Result<Pipeline, RegistryError> {
        let mut routes: BTreeMap<Topic, Vec<Arc<dyn Step>>> = BTreeMap::new();
        for step in &self.steps {
            for topic in step.subscribes() {
                routes.entry(*topic).or_default().push(step.clone());
            }
        }

        let emitters = self
            .steps
            .iter()
            .map(|s| (s.name(), s.emits()))
            .chain(self.sources.iter().copied());

        for (emitter, topics) in emitters {
            if let Some(topic) = topics.iter().find(|t| !routes.contains_key(*t)) {
                return Err(RegistryError::UnroutedTopic {
                    topic: *topic,
                    emitter,
                });
            }
        }

        for (topic, steps) in &routes {
            let names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
            tracing::debug!(topic = %topic, subscribers = ?names, "Route registered");
        }

        Ok(Pipeline { routes })
    }
}

/// Validated routing table.
pub struct Pipeline {
    routes: BTreeMap<Topic, Vec<Arc<dyn Step>>>,
}

impl Pipeline {
    pub fn subscribers(&self, topic: Topic) -> &[Arc<dyn Step>] {
        self.routes.get(&topic).map(Vec::as_slice).unwrap_or_default()
    }

    /// Run every subscriber of `event` in registration order and collect the
    /// events they emit.
    pub async fn dispatch(&self, event: &Event) -> Vec<Event> {
        let topic = event.topic();
        let mut emitted = Vec::new();

        for step in self.subscribers(topic) {
            let started = Instant::now();
            let next = step.handle(event).await;
            metrics::histogram!("pipeline_step_seconds", "step" => step.name())
                .record(started.elapsed().as_secs_f64());

            let Some(next) = next else { continue };

            if !step.emits().contains(&next.topic()) {
                tracing::error!(
                    step = step.name(),
                    topic = %next.topic(),
                    "Step emitted an undeclared topic, dropping event"
                );
                continue;
            }

            tracing::debug!(step = step.name(), from = %topic, to = %next.topic(), "Step emitted event");
            emitted.push(next);
        }

        emitted
    }

    /// Dispatch `event` and publish each follow-up to `sink`.
    ///
    /// A follow-up that cannot be published is drained in process instead,
    /// so the job still reaches a terminal event and its requester is told.
    pub async fn relay(&self, event: &Event, sink: &dyn EventSink) {
        for follow_up in self.dispatch(event).await {
            let Err(e) = sink.publish(&follow_up).await else {
                continue;
            };
            tracing::error!(
                topic = %follow_up.topic(),
                job_id = ?follow_up.job_id(),
                error = %e,
                "Failed to publish follow-up, continuing in process"
            );
            let trace = self.drain(follow_up).await;
            tracing::info!(events = trace.len(), "In-process chain finished");
        }
    }

    /// Dispatch `event` and everything it triggers, in process, until the
    /// chain quiesces. Returns every event observed, in dispatch order.
    pub async fn drain(&self, event: Event) -> Vec<Event> {
        let mut pending = VecDeque::from([event]);
        let mut trace = Vec::new();

        while let Some(event) = pending.pop_front() {
            pending.extend(self.dispatch(&event).await);
            trace.push(event);
        }

        trace
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{emitter} emits {topic} but no step subscribes to it")]
    UnroutedTopic { topic: Topic, emitter: &'static str },
}
