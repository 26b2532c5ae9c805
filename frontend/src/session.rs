//! 会话模块
//!
//! - `storage`: 键值存储抽象（浏览器实现位于 `web::storage`）
//! - `store`: 会话存储服务，保证 token 与 user_id 成对读写
//! - `gate`: 由会话派生的认证信号
//! - `observer`: 订阅/通知基础设施

mod gate;
mod observer;
mod storage;
mod store;

pub use gate::AuthGate;
pub use observer::Subscription;
pub use storage::KeyValueStorage;
pub use store::SessionStore;

#[cfg(test)]
pub use storage::MemoryStorage;
