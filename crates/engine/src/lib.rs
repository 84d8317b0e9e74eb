//! # Engine
//!
//! 发射与计数引擎。
//!
//! 负责：
//! - 按配置速率定时发射 fire-and-forget 探测请求
//! - 容量准入检查（busy >= capacity 时丢弃本次发射）
//! - 维护 total / completed / busy / heat 计数器
//! - 将计数推送到已绑定的显示 sinks

pub mod counters;
pub mod engine;
pub mod error;
pub mod handle;
pub mod sinks;

pub use contracts::{CounterKind, CounterSink, CounterSnapshot, Transport};
pub use counters::Counters;
pub use engine::{capacity_from_str, tick_period, Engine, DEFAULT_CAPACITY};
pub use error::EngineError;
pub use handle::SinkHandle;
pub use sinks::{create_sink_handle, ChannelSink, FileSink, GaugeSink, LogSink};
