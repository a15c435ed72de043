//! # Deliver
//!
//! 流量复制分发模块。
//!
//! 负责：
//! - 维护并发 client 池（每个 client 绑定一个 sender 变体）
//! - 消费入站 `Payload`，按 clone 数复制
//! - 随机（有放回）路由到 client，隔离慢 sender
//! - 吞吐统计与取消生命周期

pub mod client;
pub mod deliver;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod senders;
pub mod stat;

pub use client::{Client, ClientConfig, SenderKind};
pub use contracts::{Payload, Transport};
pub use deliver::{Deliver, DeliverConfig, DeliverReport};
pub use error::DeliverError;
pub use handle::SenderHandle;
pub use metrics::{SenderMetrics, SenderMetricsSnapshot};
pub use senders::{LocalFileWriter, LongConnSender, ShortConnSender};
pub use stat::Stat;
