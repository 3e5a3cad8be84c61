#![allow(dead_code)]

pub mod config;
pub mod mock_openai;

use axon_core::EventStream;
use axon_core::types::StreamEvent;

/// Drain an event channel until the worker closes it
pub async fn collect(mut events: EventStream) -> Vec<StreamEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}
