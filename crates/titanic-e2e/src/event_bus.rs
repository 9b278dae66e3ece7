// crates/titanic-e2e/src/event_bus.rs
// ============================================================================
// Module: Event Bus Helper
// Description: Minimal Kafka produce/consume lifecycle for event-driven checks.
// Purpose: Verify that JSON envelopes published to a topic can be consumed
//          back, independently of the services that normally own the bus.
// Dependencies: chrono, rskafka, serde, serde_json, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`EventBus`] wraps one Kafka client and exposes the lifecycle the scenario
//! suites need: connect, ensure a topic exists, send one JSON message, consume
//! one message with a timeout, and disconnect within a bound.
//! Invariants:
//! - No call hangs. Connect attempts, topic provisioning, produce and consume
//!   each run under an explicit deadline, and the client's own retry loop is
//!   capped by [`EventBusConfig::request_deadline`].
//! - Consumption always reads from the earliest offset of partition 0.
//! - A consume call owns its polling loop; the loop is dropped when the call
//!   returns, on success and on timeout alike.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rskafka::BackoffConfig;
use rskafka::client::Client;
use rskafka::client::ClientBuilder;
use rskafka::client::partition::Compression;
use rskafka::client::partition::OffsetAt;
use rskafka::client::partition::PartitionClient;
use rskafka::client::partition::UnknownTopicHandling;
use rskafka::record::Record;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio::time::timeout;

use crate::config::HarnessConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Partition every helper call targets.
const PARTITION: i32 = 0;
/// Partition count for provisioned topics.
const TOPIC_PARTITIONS: i32 = 1;
/// Replication factor for provisioned topics.
const TOPIC_REPLICATION: i16 = 1;
/// Broker-side timeout for topic creation.
const CREATE_TOPIC_TIMEOUT_MS: i32 = 5_000;
/// Upper bound of bytes per fetch.
const FETCH_MAX_BYTES: i32 = 1_000_000;
/// Broker-side long-poll wait per fetch.
const FETCH_MAX_WAIT_MS: i32 = 500;
/// Delay between topic readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures raised by [`EventBus`].
#[derive(Debug, Error)]
pub enum EventBusError {
    /// No bootstrap broker answered within the configured attempts.
    #[error("failed to connect to kafka brokers {brokers:?} after {attempts} attempt(s): {message}")]
    Connect {
        /// Bootstrap brokers tried.
        brokers: Vec<String>,
        /// Attempts made.
        attempts: u32,
        /// Last failure.
        message: String,
    },
    /// Broker request failed.
    #[error("kafka {operation} failed: {message}")]
    Broker {
        /// Operation being performed.
        operation: &'static str,
        /// Broker error text.
        message: String,
    },
    /// Broker request did not complete before its deadline.
    #[error("kafka {operation} did not complete within {limit:?}")]
    Deadline {
        /// Operation being performed.
        operation: &'static str,
        /// Deadline that expired.
        limit: Duration,
    },
    /// Topic did not become ready in time.
    #[error("kafka topic {topic} not ready after {waited:?}")]
    TopicNotReady {
        /// Topic name.
        topic: String,
        /// Time spent waiting.
        waited: Duration,
    },
    /// No message arrived before the caller's deadline.
    #[error("kafka timeout: no message received in {topic} after {}ms", .timeout.as_millis())]
    Timeout {
        /// Topic name.
        topic: String,
        /// Deadline that expired.
        timeout: Duration,
    },
    /// Payload could not be encoded or decoded as JSON.
    #[error("kafka payload on {topic} is not valid json: {message}")]
    Payload {
        /// Topic name.
        topic: String,
        /// Codec error text.
        message: String,
    },
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Event envelope exchanged on the Titanic topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event kind, e.g. `PASSENGER_CREATED`.
    pub event: String,
    /// Event payload.
    pub data: Value,
}

impl EventEnvelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Connection policy for [`EventBus::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Bootstrap brokers.
    pub brokers: Vec<String>,
    /// Maximum connect attempts.
    pub connect_attempts: u32,
    /// Backoff before the second attempt; doubles afterwards.
    pub initial_backoff: Duration,
    /// Ceiling for the doubling backoff.
    pub max_backoff: Duration,
    /// Bound on a single connect attempt.
    pub attempt_timeout: Duration,
    /// Bound on one broker request, including the client's internal retries.
    pub request_deadline: Duration,
    /// Bound on creating a topic and waiting for its leader.
    pub topic_ready_timeout: Duration,
}

impl EventBusConfig {
    /// Default policy for `brokers`: 10 attempts, 300 ms initial backoff.
    #[must_use]
    pub fn new(brokers: Vec<String>) -> Self {
        Self {
            brokers,
            connect_attempts: 10,
            initial_backoff: Duration::from_millis(300),
            max_backoff: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(5),
            request_deadline: Duration::from_secs(10),
            topic_ready_timeout: Duration::from_secs(30),
        }
    }

    /// Default policy for the configured brokers.
    #[must_use]
    pub fn from_harness(config: &HarnessConfig) -> Self {
        Self::new(config.kafka_brokers.clone())
    }

    /// Returns the delay before attempt `attempt + 1`.
    fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Retry policy handed to the Kafka client; the deadline turns its
    /// otherwise unbounded retries into an error.
    fn client_backoff(&self) -> BackoffConfig {
        BackoffConfig {
            max_backoff: self.max_backoff,
            deadline: Some(self.request_deadline),
            ..BackoffConfig::default()
        }
    }
}

// ============================================================================
// SECTION: Record Source
// ============================================================================

/// One fetched record: its offset and optional value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FetchedRecord {
    /// Partition offset.
    offset: i64,
    /// Record value.
    value: Option<Vec<u8>>,
}

/// Fetch side of a partition, as consumed by [`poll_records`].
trait RecordSource {
    /// Returns the earliest retained offset.
    fn earliest_offset(&self) -> impl Future<Output = Result<i64, EventBusError>>;

    /// Returns records at or after `offset`; empty when nothing is available
    /// before the broker-side wait expires.
    fn fetch(&self, offset: i64) -> impl Future<Output = Result<Vec<FetchedRecord>, EventBusError>>;
}

impl RecordSource for PartitionClient {
    fn earliest_offset(&self) -> impl Future<Output = Result<i64, EventBusError>> {
        async move { self.get_offset(OffsetAt::Earliest).await.map_err(broker_error("earliest offset")) }
    }

    fn fetch(&self, offset: i64) -> impl Future<Output = Result<Vec<FetchedRecord>, EventBusError>> {
        async move {
            let (records, _high_watermark) = self
                .fetch_records(offset, 1..FETCH_MAX_BYTES, FETCH_MAX_WAIT_MS)
                .await
                .map_err(broker_error("fetch"))?;
            Ok(records
                .into_iter()
                .map(|entry| FetchedRecord {
                    offset: entry.offset,
                    value: entry.record.value,
                })
                .collect())
        }
    }
}

// ============================================================================
// SECTION: Event Bus
// ============================================================================

/// Kafka client wrapper with produce/consume helpers.
pub struct EventBus {
    /// Underlying client (metadata, admin and data sessions).
    client: Arc<Client>,
    /// Partition clients by topic.
    partitions: Mutex<HashMap<String, Arc<PartitionClient>>>,
    /// Policy used to connect and provision topics.
    config: EventBusConfig,
}

impl EventBus {
    /// Connects to the bootstrap brokers.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::Connect`] once every attempt has failed or
    /// timed out.
    pub async fn connect(config: EventBusConfig) -> Result<Self, EventBusError> {
        let mut last_error = String::from("no attempts made");
        for attempt in 1..=config.connect_attempts {
            let build = ClientBuilder::new(config.brokers.clone())
                .backoff_config(config.client_backoff())
                .build();
            match timeout(config.attempt_timeout, build).await {
                Ok(Ok(client)) => {
                    tracing::info!(brokers = ?config.brokers, attempt, "[Kafka] connected");
                    return Ok(Self {
                        client: Arc::new(client),
                        partitions: Mutex::new(HashMap::new()),
                        config,
                    });
                }
                Ok(Err(err)) => last_error = err.to_string(),
                Err(_) => {
                    last_error = format!("attempt timed out after {:?}", config.attempt_timeout);
                }
            }
            tracing::debug!(attempt, error = %last_error, "[Kafka] connect attempt failed");
            if attempt < config.connect_attempts {
                sleep(config.backoff_after(attempt)).await;
            }
        }
        Err(EventBusError::Connect {
            brokers: config.brokers,
            attempts: config.connect_attempts,
            message: last_error,
        })
    }

    /// Creates `topic` (1 partition, replication 1) when absent and waits
    /// until its partition leader answers offset queries.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError`] when listing or creating fails, or
    /// [`EventBusError::TopicNotReady`] when the whole step overruns the
    /// configured bound.
    pub async fn ensure_topic_exists(&self, topic: &str) -> Result<(), EventBusError> {
        let limit = self.config.topic_ready_timeout;
        timeout(limit, self.provision_topic(topic)).await.unwrap_or_else(|_| {
            Err(EventBusError::TopicNotReady {
                topic: topic.to_string(),
                waited: limit,
            })
        })
    }

    /// Serializes `message` as JSON text and publishes it to `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError`] when serialization or the produce call
    /// fails, or [`EventBusError::Deadline`] when producing overruns the
    /// request deadline.
    pub async fn send_message<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        message: &T,
    ) -> Result<(), EventBusError> {
        let value = serde_json::to_vec(message).map_err(|err| EventBusError::Payload {
            topic: topic.to_string(),
            message: err.to_string(),
        })?;
        let offsets = bounded("produce", self.config.request_deadline, async move {
            let partition = self.partition(topic).await?;
            let record = Record {
                key: None,
                value: Some(value),
                headers: BTreeMap::new(),
                timestamp: chrono::Utc::now(),
            };
            partition
                .produce(vec![record], Compression::NoCompression)
                .await
                .map_err(broker_error("produce"))
        })
        .await?;
        tracing::info!(topic, offsets = ?offsets, "[Kafka] Sent");
        Ok(())
    }

    /// Reads `topic` from the earliest offset and returns the first message.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::Timeout`] when nothing arrives within
    /// `wait`, or [`EventBusError::Payload`] when the first message is not
    /// valid JSON for `T`.
    pub async fn consume_one_message<T: DeserializeOwned>(
        &self,
        topic: &str,
        wait: Duration,
    ) -> Result<T, EventBusError> {
        self.consume_until(topic, wait, first_decoded::<T>(topic)).await
    }

    /// Reads `topic` from the earliest offset, skipping messages that do not
    /// decode into `T` or do not satisfy `accept`, and returns the first match.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::Timeout`] when no matching message arrives
    /// within `wait`.
    pub async fn consume_matching<T, F>(
        &self,
        topic: &str,
        wait: Duration,
        accept: F,
    ) -> Result<T, EventBusError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        self.consume_until(topic, wait, first_matching(topic, accept)).await
    }

    /// Tears down partition sessions and the client.
    pub async fn disconnect(self) {
        let mut partitions = self.partitions.lock().await;
        partitions.clear();
        drop(partitions);
        drop(self.client);
        tracing::info!("[Kafka] disconnected");
    }

    /// Races [`EventBus::disconnect`] against `limit`, proceeding either way.
    ///
    /// Returns false when teardown overran the limit.
    pub async fn disconnect_within(self, limit: Duration) -> bool {
        if timeout(limit, self.disconnect()).await.is_ok() {
            return true;
        }
        tracing::warn!(?limit, "[Kafka] disconnect timed out, continuing");
        false
    }

    /// Resolves the partition and polls it until `accept` yields an outcome
    /// or `wait` expires. The partition lookup counts against `wait`.
    async fn consume_until<T, F>(
        &self,
        topic: &str,
        wait: Duration,
        mut accept: F,
    ) -> Result<T, EventBusError>
    where
        F: FnMut(&[u8]) -> Option<Result<T, EventBusError>>,
    {
        let outcome = within(topic, wait, async move {
            let partition = self.partition(topic).await?;
            poll_records(&*partition, &mut accept).await
        })
        .await;
        if outcome.is_ok() {
            tracing::info!(topic, "[Kafka] Received");
        }
        outcome
    }

    /// Lists topics, creates `topic` when absent and waits for its leader.
    async fn provision_topic(&self, topic: &str) -> Result<(), EventBusError> {
        let topics = self.client.list_topics().await.map_err(broker_error("list topics"))?;
        if topics.iter().any(|entry| entry.name == topic) {
            return Ok(());
        }
        tracing::info!(topic, "[Kafka] creating topic");
        let controller = self.client.controller_client().map_err(broker_error("controller"))?;
        controller
            .create_topic(topic, TOPIC_PARTITIONS, TOPIC_REPLICATION, CREATE_TOPIC_TIMEOUT_MS)
            .await
            .map_err(broker_error("create topic"))?;
        self.wait_for_leader(topic).await;
        tracing::info!(topic, "[Kafka] topic created and ready");
        Ok(())
    }

    /// Returns the cached partition client for `topic`.
    async fn partition(&self, topic: &str) -> Result<Arc<PartitionClient>, EventBusError> {
        let mut partitions = self.partitions.lock().await;
        if let Some(existing) = partitions.get(topic) {
            return Ok(Arc::clone(existing));
        }
        let client = self
            .client
            .partition_client(topic.to_string(), PARTITION, UnknownTopicHandling::Error)
            .await
            .map_err(broker_error("partition client"))?;
        let client = Arc::new(client);
        partitions.insert(topic.to_string(), Arc::clone(&client));
        Ok(client)
    }

    /// Polls until the new topic's partition leader answers an offset query.
    /// Bounded by the caller.
    async fn wait_for_leader(&self, topic: &str) {
        loop {
            if let Ok(partition) = self.partition(topic).await
                && partition.get_offset(OffsetAt::Latest).await.is_ok()
            {
                return;
            }
            self.partitions.lock().await.remove(topic);
            sleep(READY_POLL_INTERVAL).await;
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fetch loop: advances from the earliest offset until `accept` decides.
async fn poll_records<S, T, F>(source: &S, accept: &mut F) -> Result<T, EventBusError>
where
    S: RecordSource + ?Sized,
    F: FnMut(&[u8]) -> Option<Result<T, EventBusError>>,
{
    let mut offset = source.earliest_offset().await?;
    loop {
        for entry in source.fetch(offset).await? {
            offset = entry.offset.saturating_add(1);
            let Some(value) = entry.value else {
                continue;
            };
            if let Some(outcome) = accept(&value) {
                return outcome;
            }
        }
    }
}

/// Runs a consume future under `wait`, mapping expiry to [`EventBusError::Timeout`].
async fn within<T>(
    topic: &str,
    wait: Duration,
    consume: impl Future<Output = Result<T, EventBusError>>,
) -> Result<T, EventBusError> {
    timeout(wait, consume).await.unwrap_or_else(|_| {
        Err(EventBusError::Timeout {
            topic: topic.to_string(),
            timeout: wait,
        })
    })
}

/// Runs a broker request under `limit`, mapping expiry to [`EventBusError::Deadline`].
async fn bounded<T>(
    operation: &'static str,
    limit: Duration,
    request: impl Future<Output = Result<T, EventBusError>>,
) -> Result<T, EventBusError> {
    timeout(limit, request).await.unwrap_or(Err(EventBusError::Deadline {
        operation,
        limit,
    }))
}

/// Accepts the first record, decoded or not.
fn first_decoded<T: DeserializeOwned>(
    topic: &str,
) -> impl FnMut(&[u8]) -> Option<Result<T, EventBusError>> {
    move |bytes: &[u8]| Some(decode::<T>(topic, bytes))
}

/// Accepts the first record that decodes and satisfies `accept`.
fn first_matching<T, F>(
    topic: &str,
    accept: F,
) -> impl FnMut(&[u8]) -> Option<Result<T, EventBusError>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    move |bytes: &[u8]| match decode::<T>(topic, bytes) {
        Ok(message) if accept(&message) => Some(Ok(message)),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(topic, error = %err, "[Kafka] skipping undecodable message");
            None
        }
    }
}

/// Decodes a JSON message body.
fn decode<T: DeserializeOwned>(topic: &str, bytes: &[u8]) -> Result<T, EventBusError> {
    serde_json::from_slice(bytes).map_err(|err| EventBusError::Payload {
        topic: topic.to_string(),
        message: err.to_string(),
    })
}

/// Maps a broker error into [`EventBusError::Broker`] for `operation`.
fn broker_error<E: std::fmt::Display>(operation: &'static str) -> impl Fn(E) -> EventBusError {
    move |err| EventBusError::Broker {
        operation,
        message: err.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
