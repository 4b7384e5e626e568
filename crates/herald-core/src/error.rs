// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for dispatch failures and configuration loading.

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Identifies the channel a publish call was addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A string-keyed named event.
    Named(String),
    /// A type-keyed message, identified by its type name.
    Message(&'static str),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Named(name) => write!(f, "event '{name}'"),
            Channel::Message(type_name) => write!(f, "message {type_name}"),
        }
    }
}

/// A subscriber callback failed while a publish call was dispatching.
///
/// This is the only error the aggregator produces at runtime. It never reaches
/// the publisher: it is handed to the aggregator's
/// [`ErrorSink`](crate::ErrorSink) and the rest of that dispatch is skipped.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The callback returned an error.
    #[error("subscriber for {channel} failed: {cause}")]
    Callback {
        /// Where the failing callback was subscribed.
        channel: Channel,
        /// The error returned by the callback.
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The callback panicked.
    #[error("subscriber for {channel} panicked: {message}")]
    Panicked {
        /// Where the panicking callback was subscribed.
        channel: Channel,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl DispatchError {
    pub(crate) fn callback(channel: Channel, error: anyhow::Error) -> Self {
        DispatchError::Callback {
            channel,
            cause: error.into(),
        }
    }

    pub(crate) fn panicked(channel: Channel, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        DispatchError::Panicked { channel, message }
    }

    /// Returns the channel the failing subscriber was registered on.
    pub fn channel(&self) -> &Channel {
        match self {
            DispatchError::Callback { channel, .. } | DispatchError::Panicked { channel, .. } => {
                channel
            }
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Callback { .. } => "subscriber_failed",
            DispatchError::Panicked { .. } => "subscriber_panicked",
        }
    }
}

/// An [`AggregatorConfig`](crate::AggregatorConfig) could not be loaded.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document was malformed or had fields of the wrong type.
    #[error("invalid aggregator config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn channel_display() {
        assert_eq!(Channel::Named("tick".into()).to_string(), "event 'tick'");
        assert_eq!(Channel::Message("app::Saved").to_string(), "message app::Saved");
    }

    #[test]
    fn callback_error_keeps_source() {
        let err = DispatchError::callback(
            Channel::Named("save".into()),
            anyhow::anyhow!("disk full"),
        );
        assert_eq!(err.as_label(), "subscriber_failed");
        assert_eq!(err.to_string(), "subscriber for event 'save' failed: disk full");
        assert!(err.source().is_some());
    }

    #[test]
    fn panic_payload_is_extracted() {
        let static_payload: Box<dyn Any + Send> = Box::new("boom");
        let err = DispatchError::panicked(Channel::Message("Ping"), &*static_payload);
        assert_eq!(err.to_string(), "subscriber for message Ping panicked: boom");

        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        let err = DispatchError::panicked(Channel::Message("Ping"), &*owned_payload);
        assert!(err.to_string().ends_with("owned boom"));

        let opaque_payload: Box<dyn Any + Send> = Box::new(42_u8);
        let err = DispatchError::panicked(Channel::Message("Ping"), &*opaque_payload);
        assert_eq!(err.as_label(), "subscriber_panicked");
        assert!(err.to_string().ends_with("unknown panic"));
    }
}
