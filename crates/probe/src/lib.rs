//! # Probe
//!
//! Transport 实现层。
//!
//! 负责：
//! - `HttpProbe`：基于 reqwest 的真实 HTTP GET 探测
//! - `MockProbe`：测试/演示用，可控完成时机
//!
//! 两者都遵守 Transport 合约：成功、协议错误、中断一律折叠为同一个
//! "completed" 信号，调用方永远看不到区别。

mod error;
mod http;
mod mock;

pub use contracts::Transport;
pub use error::ProbeError;
pub use http::{HttpProbe, HttpProbeConfig};
pub use mock::MockProbe;
