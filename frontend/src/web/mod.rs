//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装。
//! `route` 为纯逻辑，其余子模块直接调用 `web_sys`。

mod cross_tab;
mod http;
pub mod route;
pub mod router;
mod storage;
mod timer;

pub use cross_tab::StorageSync;
pub use http::FetchTransport;
pub use storage::BrowserStorage;
pub use timer::{BrowserClock, TimerSlot};
