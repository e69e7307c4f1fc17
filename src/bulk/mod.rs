//! Bulk payload construction
//!
//! Specializes the payload cursor to the bulk indexing API: every non-blank
//! buffered line becomes a `(command, document)` pair of NDJSON lines, with
//! the command carrying the destination index, the operation type, and a
//! per-event identifier. The document line is passed through unchanged, so
//! the payload alternates strictly command/document and always has even
//! length.
//!
//! Destination naming and command serialization are injected as strategy
//! traits ([`IndexNamer`], [`CommandSerializer`]); closures implement both.
//!
//! # Identifier shape
//!
//! Each command id is `<counter>_<uuid>`. The monotonic per-file counter
//! guarantees uniqueness and ordering within the file even if the token
//! generator ever collides; the random token guarantees uniqueness across
//! files and process restarts where the counter alone would repeat. Neither
//! half substitutes for the other.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ConfigError, ReaderError};
use crate::file_set::has_json_extension;
use crate::reader::PayloadBuilder;
use crate::rolling::{self, RollingInterval};

#[cfg(test)]
#[path = "bulk_test.rs"]
mod tests;

/// Bulk operation type for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOpType {
    /// Index the document, overwriting any existing one with the same id
    Index,
    /// Create the document, failing if the id already exists
    Create,
}

/// Body of a bulk command line
///
/// Serializes to the field names the bulk API expects; optional fields are
/// omitted entirely rather than sent as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkCommandBody {
    /// Destination index
    #[serde(rename = "_index")]
    pub index: String,

    /// Mapping type, for backends that still use types
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    pub mapping_type: Option<String>,

    /// Per-event identifier (`<counter>_<uuid>`)
    #[serde(rename = "_id")]
    pub id: String,

    /// Ingest pipeline to route the document through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
}

/// One bulk command line
///
/// The externally-tagged serde encoding yields the wire shape directly:
/// `{"index":{"_index":...,"_id":...}}` or `{"create":{...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkCommand {
    /// An index operation
    Index(BulkCommandBody),
    /// A create operation
    Create(BulkCommandBody),
}

/// Destination naming strategy
///
/// Invoked once per non-blank line with the raw event line and the file's
/// reference date (the timestamp parsed from the file name).
pub trait IndexNamer {
    /// Compute the destination index for one event
    fn index_for(&self, raw_line: &str, reference: NaiveDateTime) -> String;
}

impl<F> IndexNamer for F
where
    F: Fn(&str, NaiveDateTime) -> String,
{
    fn index_for(&self, raw_line: &str, reference: NaiveDateTime) -> String {
        self(raw_line, reference)
    }
}

/// Command serialization strategy
pub trait CommandSerializer {
    /// Serialize one command to a single NDJSON line
    fn serialize(&self, command: &BulkCommand) -> Result<String, serde_json::Error>;
}

impl<F> CommandSerializer for F
where
    F: Fn(&BulkCommand) -> Result<String, serde_json::Error>,
{
    fn serialize(&self, command: &BulkCommand) -> Result<String, serde_json::Error> {
        self(command)
    }
}

/// Default serializer backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCommandSerializer;

impl CommandSerializer for JsonCommandSerializer {
    fn serialize(&self, command: &BulkCommand) -> Result<String, serde_json::Error> {
        serde_json::to_string(command)
    }
}

/// Configuration for a [`BulkPayloadBuilder`]
#[derive(Debug, Clone)]
pub struct BulkPayloadConfig {
    /// Operation type for every command line
    pub op_type: BulkOpType,

    /// Optional ingest pipeline name
    pub pipeline_name: Option<String>,

    /// Optional mapping type name
    pub mapping_type: Option<String>,

    /// Rolling interval of the buffer files being drained
    pub interval: RollingInterval,

    /// Coarsest interval still supported for per-event index routing
    ///
    /// Daily partitioning is the default boundary: it is the coarsest
    /// interval for which a deterministic per-event index name stays
    /// consistent with the file's own retention window.
    pub min_routing_interval: RollingInterval,
}

impl BulkPayloadConfig {
    /// Create a config with the default `Day` routing boundary
    pub fn new(op_type: BulkOpType, interval: RollingInterval) -> Self {
        Self {
            op_type,
            pipeline_name: None,
            mapping_type: None,
            interval,
            min_routing_interval: RollingInterval::Day,
        }
    }

    /// Route documents through an ingest pipeline
    #[must_use]
    pub fn with_pipeline_name(mut self, name: impl Into<String>) -> Self {
        self.pipeline_name = Some(name.into());
        self
    }

    /// Set a mapping type name on every command
    #[must_use]
    pub fn with_mapping_type(mut self, name: impl Into<String>) -> Self {
        self.mapping_type = Some(name.into());
        self
    }

    /// Override the coarsest interval accepted for per-event routing
    #[must_use]
    pub fn with_min_routing_interval(mut self, minimum: RollingInterval) -> Self {
        self.min_routing_interval = minimum;
        self
    }
}

/// [`PayloadBuilder`] producing NDJSON bulk-action pairs
///
/// Drive it through a [`PayloadCursor`](crate::reader::PayloadCursor); each
/// file yields a `Vec<String>` of strictly alternating command/document
/// lines.
pub struct BulkPayloadBuilder<N, S = JsonCommandSerializer> {
    config: BulkPayloadConfig,
    namer: N,
    serializer: S,
    payload: Vec<String>,
    count: u64,
    reference: Option<NaiveDateTime>,
}

impl<N: IndexNamer> BulkPayloadBuilder<N> {
    /// Create a builder with the default JSON command serializer
    pub fn new(config: BulkPayloadConfig, namer: N) -> Result<Self, ConfigError> {
        Self::with_serializer(config, namer, JsonCommandSerializer)
    }
}

impl<N: IndexNamer, S: CommandSerializer> BulkPayloadBuilder<N, S> {
    /// Create a builder with an injected command serializer
    ///
    /// Fails with [`ConfigError::IntervalTooCoarse`] when the configured
    /// interval is coarser than the routing boundary; a yearly or monthly
    /// file cannot be routed to deterministic per-event daily indices.
    pub fn with_serializer(
        config: BulkPayloadConfig,
        namer: N,
        serializer: S,
    ) -> Result<Self, ConfigError> {
        if config.interval < config.min_routing_interval {
            return Err(ConfigError::IntervalTooCoarse {
                interval: config.interval,
                minimum: config.min_routing_interval,
            });
        }

        Ok(Self {
            config,
            namer,
            serializer,
            payload: Vec::new(),
            count: 0,
            reference: None,
        })
    }

    /// Extract the reference date from a buffer file name
    ///
    /// Tries the legacy hourly spelling first (only meaningful for hourly
    /// rolling), then the canonical token for the configured interval. Both
    /// spellings of one instant yield the same date, so downstream index
    /// names do not depend on which naming era produced the file.
    fn parse_reference_date(&self, file_name: &str) -> Result<NaiveDateTime, ReaderError> {
        let parts: Vec<&str> = file_name.split('-').collect();

        if let Some(reference) = self.try_parse_legacy_hourly(&parts) {
            return Ok(reference);
        }

        let format_error = || ReaderError::FormatError {
            file_name: Path::new(file_name)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.to_string()),
        };

        // the trailing token looks like 20150218.json or 20150218_3.json
        let last = parts.last().copied().unwrap_or(file_name);
        if !has_json_extension(last) {
            return Err(format_error());
        }
        let token = last
            .get(..self.config.interval.token_len())
            .ok_or_else(format_error)?;

        self.config
            .interval
            .parse_token(token)
            .ok_or_else(format_error)
    }

    fn try_parse_legacy_hourly(&self, parts: &[&str]) -> Option<NaiveDateTime> {
        if self.config.interval != RollingInterval::Hour || parts.len() <= 2 {
            return None;
        }
        // the legacy date spans the last two '-'-delimited segments
        let tail = parts[parts.len() - 2..].join("-");
        let (reference, _sequence) = rolling::parse_legacy_hourly_file_token(&tail)?;
        Some(reference)
    }
}

impl<N: IndexNamer, S: CommandSerializer> PayloadBuilder for BulkPayloadBuilder<N, S> {
    type Payload = Vec<String>;

    fn no_payload(&self) -> Vec<String> {
        Vec::new()
    }

    fn init(&mut self, file_name: &str) -> Result<(), ReaderError> {
        let reference = self.parse_reference_date(file_name)?;
        tracing::debug!(file = %file_name, reference = %reference, "opening buffer file");

        self.payload = Vec::new();
        self.count = 0;
        self.reference = Some(reference);
        Ok(())
    }

    fn push_line(&mut self, line: &str) {
        // blank lines carry no event and must not advance the counter
        if line.trim().is_empty() {
            return;
        }
        // only reachable by bypassing the cursor, which refuses append
        // before begin; surface the misuse instead of losing events silently
        let Some(reference) = self.reference else {
            tracing::warn!("dropping line pushed before a buffer file was opened");
            return;
        };

        let index = self.namer.index_for(line, reference);
        let body = BulkCommandBody {
            index,
            mapping_type: self.config.mapping_type.clone(),
            id: format!("{}_{}", self.count, Uuid::new_v4()),
            pipeline: self.config.pipeline_name.clone(),
        };
        let command = match self.config.op_type {
            BulkOpType::Index => BulkCommand::Index(body),
            BulkOpType::Create => BulkCommand::Create(body),
        };

        match self.serializer.serialize(&command) {
            Ok(command_line) => {
                self.payload.push(command_line);
                self.payload.push(line.to_string());
                self.count += 1;
            }
            Err(e) => {
                // dropping the whole pair keeps the strict alternation intact
                tracing::warn!(error = %e, "dropping event whose bulk command failed to serialize");
            }
        }
    }

    fn finish(&mut self) -> Vec<String> {
        self.count = 0;
        self.reference = None;
        std::mem::take(&mut self.payload)
    }
}
