//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 实现 [`KeyValueStorage`]。
//! 存储不可用（隐私模式、被禁用）时返回错误，由会话层按未登录处理。

use crate::error::{ClientError, ClientResult};
use crate::session::KeyValueStorage;

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> ClientResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| ClientError::storage("无法获取 window 对象"))?
            .local_storage()
            .map_err(|e| ClientError::storage(format!("{:?}", e)))?
            .ok_or_else(|| ClientError::storage("localStorage 不可用"))
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| ClientError::storage(format!("读取 {} 失败: {:?}", key, e)))
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| ClientError::storage(format!("写入 {} 失败: {:?}", key, e)))
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| ClientError::storage(format!("删除 {} 失败: {:?}", key, e)))
    }
}
