//! 认证模块
//!
//! 纯逻辑位于 `flow`（可在原生环境测试）。本文件把会话服务桥接到 Leptos：
//! [`AuthGate`] 的变化写入一个 `bool` 信号，路由服务只依赖该信号。

mod flow;

pub use flow::{AuthFlow, AuthForm, AuthMode};

use std::rc::Rc;

use leptos::prelude::*;
use tracing::warn;

use crate::api::PlantApi;
use crate::config::ClientConfig;
use crate::session::{AuthGate, SessionStore, Subscription};
use crate::web::{BrowserStorage, FetchTransport, StorageSync};

/// 浏览器端共享服务
#[derive(Clone)]
pub struct Services {
    pub config: Rc<ClientConfig>,
    pub api: PlantApi<FetchTransport>,
    pub store: SessionStore,
    pub gate: AuthGate,
}

impl Services {
    pub fn new(config: ClientConfig) -> Self {
        let store = SessionStore::new(BrowserStorage);
        let gate = AuthGate::new(&store);
        let api = PlantApi::new(
            &config.api_base_url,
            FetchTransport::new(config.request_timeout),
        );
        Self {
            config: Rc::new(config),
            api,
            store,
            gate,
        }
    }

    fn flow(&self) -> AuthFlow<FetchTransport> {
        AuthFlow::new(self.api.clone(), self.store.clone())
    }
}

/// 认证上下文
///
/// 服务对象基于 `Rc`，存放在本地 `StoredValue` 中；上下文本身是 `Copy`，
/// 可以自由传入闭包与组件。
#[derive(Clone, Copy)]
pub struct AuthContext {
    authenticated: ReadSignal<bool>,
    services: StoredValue<Services, LocalStorage>,
    // 随所属 Owner 一起释放：注销 gate 订阅与 storage 监听
    _links: StoredValue<(Subscription, StorageSync), LocalStorage>,
}

impl AuthContext {
    pub fn new(services: Services) -> Self {
        let (authenticated, set_authenticated) = signal(services.gate.is_authenticated());
        let watch = services.gate.watch(move |v| set_authenticated.set(v));
        let sync = StorageSync::attach(services.store.clone());

        Self {
            authenticated,
            services: StoredValue::new_local(services),
            _links: StoredValue::new_local((watch, sync)),
        }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        self.authenticated.into()
    }

    pub fn services(&self) -> Services {
        self.services.get_value()
    }

    /// 提交登录/注册表单
    ///
    /// 成功时会话已写入存储，认证信号随之翻转，路由自动跳转。
    /// 失败时返回应展示给用户的文本。
    pub async fn submit(&self, mode: AuthMode, form: AuthForm) -> Result<(), String> {
        let flow = self.services.with_value(Services::flow);
        flow.submit(mode, &form)
            .await
            .map(|_| ())
            .map_err(|e| e.user_message(mode.failure_notice()))
    }

    /// 注销。导航由路由服务监听认证信号自动处理。
    pub fn logout(&self) {
        let flow = self.services.with_value(Services::flow);
        if let Err(e) = flow.logout() {
            warn!(error = %e, "logout could not fully clear storage");
        }
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}
