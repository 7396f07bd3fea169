//! Observability for ChatGuru: structured logging via `tracing`, with an
//! optional OpenTelemetry bridge for the `gen_ai.chat` spans.

pub mod tracing_setup;
