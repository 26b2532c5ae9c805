//! Plant Shout 前端应用
//!
//! 领域层不依赖 DOM，可在原生环境测试：
//! - `session`: 会话存储与认证信号
//! - `auth`: 登录/注册流程
//! - `feed`: 帖子流、轮询与发帖/评论
//! - `api`: 远程 API 客户端
//! - `web`: 浏览器 API 封装与路由服务
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod login;
    pub mod main_page;
}
mod config;
mod error;
mod feed;
mod logging;
mod session;
mod web;

use crate::auth::{AuthContext, Services};
use crate::components::login::LoginPage;
use crate::components::main_page::MainPage;
use crate::config::ClientConfig;
use crate::web::BrowserStorage;

use leptos::prelude::*;

use web::route::AppRoute;
use web::router::{Router, RouterOutlet, use_router};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。`Root` 在路由服务中已被解析，
/// 这里仍按登录页处理以防万一。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login | AppRoute::Root => view! { <LoginPage /> }.into_any(),
        AppRoute::Main => view! { <MainPage /> }.into_any(),
        AppRoute::NotFound => view! { <NotFound /> }.into_any(),
    }
}

#[component]
fn NotFound() -> impl IntoView {
    let router = use_router();
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <button class="btn btn-primary mt-6" on:click=move |_| router.navigate("/")>
                    "Back to Plant Shout"
                </button>
            </div>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 先初始化日志，再加载配置
    let config = ClientConfig::bootstrap(&BrowserStorage, logging::init);

    // 2. 创建认证上下文（会话存储、认证信号、跨标签页同步）
    let services = Services::new(config);
    tracing::info!(
        api = services.api.base_url(),
        log_level = %services.config.log_level,
        "starting Plant Shout"
    );
    let auth_ctx = AuthContext::new(services);
    provide_context(auth_ctx);

    // 3. 认证信号注入路由服务
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
