// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encoding shared by inter-process envelopes and the persisted store

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(CodecError::Encode)
}

pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string_pretty(value).map_err(CodecError::Encode)
}

pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Decode)
}

/// One newline-terminated frame.
pub fn encode_line<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    let mut line = encode(value)?;
    line.push('\n');
    Ok(line)
}

/// A `{"type": ..., "payload": ...}` frame exchanged with child processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl Envelope {
    pub fn new(kind: impl Into<String>) -> Self {
        Envelope { kind: kind.into(), payload: serde_json::Value::Null }
    }

    pub fn with_payload(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Envelope { kind: kind.into(), payload }
    }

    /// Parse a frame, ignoring lines that are not envelopes (plain log output).
    pub fn parse_line(line: &str) -> Option<Envelope> {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        decode(line).ok()
    }

    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_value(self.payload.clone()).map_err(CodecError::Decode)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
