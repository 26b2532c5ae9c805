//! 定时器封装模块
//!
//! 基于 `gloo-timers` 的 `setTimeout` future 实现轮询所需的 [`Clock`]。
//! [`TimerSlot`] 保证同一用途最多只有一个待触发的定时器。

use std::time::Duration;

use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;

use crate::feed::Clock;

/// 浏览器定时器
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl BrowserClock {
    /// `setTimeout` 以 u32 毫秒计，超出部分截断
    pub fn millis(duration: Duration) -> u32 {
        u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
    }
}

/// Holds at most one pending timer handle.
#[derive(Debug)]
pub struct TimerSlot<H> {
    current: Option<H>,
}

impl<H> Default for TimerSlot<H> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<H> TimerSlot<H> {
    /// Clears the pending timer, if any, then stores the one `start` returns.
    pub fn restart(&mut self, start: impl FnOnce() -> Option<H>, clear: impl FnOnce(H)) {
        self.cancel(clear);
        self.current = start();
    }

    pub fn cancel(&mut self, clear: impl FnOnce(H)) {
        if let Some(prev) = self.current.take() {
            clear(prev);
        }
    }
}

#[async_trait(?Send)]
impl Clock for BrowserClock {
    async fn sleep(&self, duration: Duration) {
        TimeoutFuture::new(Self::millis(duration)).await;
    }
}
