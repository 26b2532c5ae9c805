//! 跨标签页会话同步
//!
//! 浏览器只在*其他*标签页修改 localStorage 时派发 `storage` 事件，
//! 本标签页的写入由 [`SessionStore`] 自行通知。

use wasm_bindgen::prelude::*;
use web_sys::StorageEvent;

use crate::session::SessionStore;

/// 已注册的 `storage` 监听器。drop 时注销。
pub struct StorageSync {
    closure: Closure<dyn Fn(StorageEvent)>,
}

impl StorageSync {
    pub fn attach(store: SessionStore) -> Self {
        let closure = Closure::<dyn Fn(StorageEvent)>::new(move |event: StorageEvent| {
            store.sync_external(event.key().as_deref());
        });

        if let Some(window) = web_sys::window() {
            if let Err(e) =
                window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            {
                tracing::warn!(error = ?e, "could not listen for storage events");
            }
        }

        Self { closure }
    }
}

impl Drop for StorageSync {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback("storage", self.closure.as_ref().unchecked_ref());
        }
    }
}
