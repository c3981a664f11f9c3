//! Telemetry - device polling client and bounded history buffers

mod client;
mod history;

pub use client::DeviceClient;
pub use history::History;

pub(crate) use client::relay_query;
