// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One full polling cycle for one node.
//!
//! `run` opens the session, negotiates capabilities, then either drains
//! the agent's spool or walks the plugin list. Every parsed service
//! flows label-check -> drift reconciliation -> rrd store -> carbon.
//! The session (and any transport helper process) is torn down on every
//! exit path; per-field and per-operation problems are logged and the
//! run continues, only transport/protocol failures end it.

use crate::drift;
use crate::error::WorkerError;
use crate::freshness::FreshnessClock;
use crate::resolve::resolve_address;
use pulse_core::{Clock, Host, OldConfig, ServiceConfigs, Settings, SystemClock, WorkerState};
use pulse_store::{cached, rrd_file_path, CarbonSink, RrdEngine, RrdStore};
use pulse_wire::{Accumulator, Connector, NodeSession, SessionError};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Capabilities this worker offers the agent.
const OFFERED_CAPABILITIES: [&str; 2] = ["multigraph", "dirtyconfig"];

/// Software version recorded into the persisted config for drift
/// detection across upgrades.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    pub elapsed: Duration,
}

/// Polls one node and persists the results.
pub struct UpdateWorker<C: Connector, E: RrdEngine + Clone> {
    settings: Settings,
    connector: C,
    engine: E,
    clock: Arc<dyn Clock>,
    freshness: FreshnessClock,
    /// Persistent worker state; the dispatcher loads it before a run
    /// and persists it after.
    pub state: WorkerState,
    /// Previous run's declarations, for drift detection.
    pub old_config: OldConfig,
}

impl<C: Connector, E: RrdEngine + Clone> UpdateWorker<C, E> {
    pub fn new(settings: Settings, connector: C, engine: E) -> Self {
        Self::with_clock(settings, connector, engine, Arc::new(SystemClock))
    }

    pub fn with_clock(
        settings: Settings,
        connector: C,
        engine: E,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            connector,
            engine,
            freshness: FreshnessClock::new(clock.clone()),
            clock,
            state: WorkerState::default(),
            old_config: OldConfig::default(),
        }
    }

    /// Seed persistent state from a previous run.
    pub fn with_state(mut self, state: WorkerState, old_config: OldConfig) -> Self {
        self.state = state;
        self.old_config = old_config;
        self
    }

    /// Run one polling cycle against `host`.
    pub async fn run(&mut self, host: &Host) -> Result<RunStats, WorkerError> {
        let started = Instant::now();
        tracing::info!(host = host.host_name, "starting update run");

        let daemon = cached::configure(self.settings.rrdcached_socket.as_deref());
        let store = RrdStore::new(self.engine.clone(), daemon);

        let address = resolve_address(host).await;
        let transport = match self.connector.connect(&address, host.port).await {
            Ok(transport) => transport,
            Err(e) => {
                tracing::error!(host = host.host_name, address, error = %e, "connect failed");
                return Err(e.into());
            }
        };
        let mut session = match NodeSession::open(transport, self.settings.timeout()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(host = host.host_name, error = %e, "session open failed");
                return Err(e.into());
            }
        };
        let mut carbon = match self.settings.carbon_server.clone() {
            Some(server) => {
                CarbonSink::connect(
                    &server,
                    self.settings.carbon_port,
                    self.settings.carbon_prefix.as_deref(),
                )
                .await
            }
            None => CarbonSink::disabled(),
        };

        let result = self.drive(&mut session, &store, &mut carbon, host).await;

        // Teardown happens regardless of the outcome.
        session.close().await;
        carbon.close().await;

        match result {
            Ok(()) => {
                self.old_config.version = Some(VERSION.to_string());
                let elapsed = started.elapsed();
                tracing::info!(
                    host = host.host_name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "update run finished"
                );
                Ok(RunStats { elapsed })
            }
            Err(e) => {
                tracing::error!(host = host.host_name, error = %e, "update run failed");
                Err(e)
            }
        }
    }

    async fn drive(
        &mut self,
        session: &mut NodeSession<C::Transport>,
        store: &RrdStore<E>,
        carbon: &mut CarbonSink,
        host: &Host,
    ) -> Result<(), WorkerError> {
        session.negotiate(&OFFERED_CAPABILITIES).await?;
        if session.has_capability("spool") {
            match self.spool_cycle(session, store, carbon, host).await {
                Err(WorkerError::Session(SessionError::NoSpoolfetchData)) => {
                    tracing::info!(host = host.host_name, "agent had no spooled data");
                    Ok(())
                }
                other => other,
            }
        } else {
            self.list_cycle(session, store, carbon, host).await
        }
    }

    /// Per-plugin config/fetch round trips.
    async fn list_cycle(
        &mut self,
        session: &mut NodeSession<C::Transport>,
        store: &RrdStore<E>,
        carbon: &mut CarbonSink,
        host: &Host,
    ) -> Result<(), WorkerError> {
        let mut plugins = session.list().await?;
        // Fair scheduling under the session timeout budget: no plugin
        // gets to starve the tail of the list every round.
        plugins.shuffle(&mut rand::rng());

        for plugin in plugins {
            if !self.settings.limit_services.is_empty()
                && !self.settings.limit_services.contains(&plugin)
            {
                tracing::debug!(plugin, "not in limit_services, skipping");
                continue;
            }

            let mut acc = Accumulator::new(&plugin, self.settings.update_rate, self.clock.clone());
            for line in session.config(&plugin).await? {
                if let Err(e) = acc.feed_config_line(&line) {
                    return Err(SessionError::from(e).into());
                }
            }

            let mut polled = acc.last_when() > 0;
            if polled {
                tracing::debug!(plugin, "dirty config carried samples, skipping fetch");
            } else {
                let (rate, _) = acc.configs().update_rate(&plugin, self.settings.update_rate);
                if self.freshness.is_fresh_enough(&self.state, &plugin, rate) {
                    tracing::debug!(plugin, "fresh enough, skipping fetch");
                } else {
                    for line in session.fetch(&plugin).await? {
                        if let Err(e) = acc.feed_fetch_line(&line) {
                            return Err(SessionError::from(e).into());
                        }
                    }
                    polled = true;
                }
            }

            if polled {
                self.freshness.mark_polled(&mut self.state, &plugin);
            }
            self.commit(host, store, carbon, acc).await;
        }
        Ok(())
    }

    /// Drain the agent's spool since the persisted cursor.
    ///
    /// Service blocks are committed as their `multigraph` boundary
    /// passes, so an arbitrarily large backlog replay is never held in
    /// memory whole. The cursor only advances once the stream finished
    /// cleanly; a mid-stream abort replays from the old cursor and the
    /// monotonic filter drops what already landed.
    async fn spool_cycle(
        &mut self,
        session: &mut NodeSession<C::Transport>,
        store: &RrdStore<E>,
        carbon: &mut CarbonSink,
        host: &Host,
    ) -> Result<(), WorkerError> {
        let cursor = self
            .state
            .spoolfetch
            .clone()
            .unwrap_or_else(|| "0".to_string());
        tracing::debug!(host = host.host_name, cursor, "spoolfetch");

        let mut stream = session.spoolfetch(&cursor).await?;
        let mut acc = Accumulator::new("", self.settings.update_rate, self.clock.clone());
        while let Some(line) = stream.next_line().await? {
            if let Some(name) = line.strip_prefix("multigraph ") {
                let finished = std::mem::replace(
                    &mut acc,
                    Accumulator::new(name.trim(), self.settings.update_rate, self.clock.clone()),
                );
                self.commit(host, store, carbon, finished).await;
            } else if let Err(e) = acc.feed_config_line(&line) {
                return Err(SessionError::from(e).into());
            }
        }

        let new_cursor = stream.finish()?;
        self.commit(host, store, carbon, acc).await;
        self.state.spoolfetch = Some(new_cursor);
        Ok(())
    }

    /// Route one accumulated service block through drift, the store and
    /// the carbon sink, then remember its declarations for next run.
    async fn commit(
        &mut self,
        host: &Host,
        store: &RrdStore<E>,
        carbon: &mut CarbonSink,
        acc: Accumulator,
    ) {
        let (mut configs, data) = acc.into_parts();
        apply_host_overrides(&mut configs, host);
        let host_path = host.path();

        for (service, fields) in &configs.data_source {
            if service.is_empty() {
                tracing::warn!(host = host.host_name, "samples before any service context, dropping");
                continue;
            }
            for (field, ds_config) in fields {
                if !ds_config.contains_key("label") {
                    tracing::error!(service, field, "field declared without a label, skipping");
                    continue;
                }

                // Drift actions settle before any sample is written.
                if let Some(action) = drift::plan(
                    &self.settings.dbdir,
                    &host_path,
                    service,
                    field,
                    ds_config,
                    &self.old_config,
                    VERSION,
                ) {
                    drift::apply(&action, store, ds_config).await;
                }

                let field_data = data.field(service, field);

                let path = rrd_file_path(
                    &self.settings.dbdir,
                    &host_path,
                    service,
                    field,
                    configs.ds_type(service, field),
                );
                if !path.exists() {
                    // Declared fields get their file at once, samples or
                    // not, so graphs of quiet services still render.
                    let profile = configs
                        .inherited(service, Some(field), "graph_data_size")
                        .unwrap_or(&self.settings.graph_data_size)
                        .to_string();
                    let (rate, _) = configs.update_rate(service, self.settings.update_rate);
                    let first_when = field_data
                        .and_then(|data| data.whens.first().copied())
                        .unwrap_or_else(|| self.clock.epoch_secs());
                    store
                        .create(&path, ds_config, &profile, rate, first_when)
                        .await;
                }

                let Some(field_data) = field_data else {
                    continue;
                };
                if field_data.is_empty() {
                    continue;
                }

                store.update(&path, field_data, &mut self.state).await;

                for (when, value) in field_data.whens.iter().zip(field_data.values.iter()) {
                    carbon
                        .emit(&host.host_name, service, field, value, *when)
                        .await;
                }
            }
            self.old_config
                .data_source
                .insert(service.clone(), fields.clone());
        }
    }
}

/// Overlay host-section declaration overrides on what the agent sent.
///
/// A dotted key (`load.min`) overrides a field attribute; a bare key
/// appends a service attribute, which wins because the last declaration
/// is the effective one.
fn apply_host_overrides(configs: &mut ServiceConfigs, host: &Host) {
    for (service, overrides) in &host.service_config {
        if !configs.global.contains_key(service) && !configs.data_source.contains_key(service) {
            continue;
        }
        for (key, value) in overrides {
            match key.split_once('.') {
                Some((field, attr)) => configs.set_field_attr(service, field, attr, value),
                None => configs.push_global(service, key, value),
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
