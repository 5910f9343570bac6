//! Wiring of the four relay stages and the dead-letter monitor onto one bus.

use std::sync::Arc;

use message_bus::MessageBus;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::monitor::DeadLetterMonitor;
use crate::relay::RelayStage;
use crate::sink::MetricsSink;
use crate::stages::{ALL_STAGES, FAILURE_TOPIC};

/// All consumers of the order lifecycle, ready to be spawned.
pub struct Pipeline<B> {
    bus: B,
    stages: Vec<RelayStage<B>>,
    monitor: DeadLetterMonitor,
}

impl<B> Pipeline<B>
where
    B: MessageBus + Clone + 'static,
{
    /// Builds one relay stage per lifecycle hop, all sharing `metrics`.
    pub fn new(bus: B, metrics: Arc<dyn MetricsSink>) -> Self {
        let stages = ALL_STAGES
            .into_iter()
            .map(|stage| RelayStage::new(stage, bus.clone(), metrics.clone()))
            .collect();

        Self {
            bus,
            stages,
            monitor: DeadLetterMonitor::new(metrics),
        }
    }

    /// Subscribes every consumer to its input topic, then spawns one task per
    /// consumer. All subscriptions are in place before this returns, so no
    /// message published afterwards is missed.
    pub async fn spawn(self) -> Result<Vec<JoinHandle<()>>> {
        let mut subscribed = Vec::with_capacity(self.stages.len());
        for stage in self.stages {
            let messages = self.bus.subscribe(stage.definition().input).await?;
            subscribed.push((stage, messages));
        }
        let failures = self.bus.subscribe(FAILURE_TOPIC).await?;

        let mut handles: Vec<JoinHandle<()>> = subscribed
            .into_iter()
            .map(|(stage, messages)| tokio::spawn(async move { stage.run(messages).await }))
            .collect();

        let monitor = self.monitor;
        handles.push(tokio::spawn(async move { monitor.run(failures).await }));

        tracing::info!(consumers = handles.len(), "pipeline started");

        Ok(handles)
    }
}
