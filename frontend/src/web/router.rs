//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 守卫 -> 加载"的导航流程，守卫规则见 [`AppRoute::resolve`]。

use leptos::prelude::*;
use tracing::{debug, info};
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 写入 History（`push` 为 false 时替换当前记录）
fn write_history(route: AppRoute, push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let path = Some(route.to_path());
    let _ = if push {
        history.push_state_with_url(&JsValue::NULL, "", path)
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", path)
    };
}

/// 路由器服务
///
/// 通过 Signal 驱动界面更新。认证状态以信号形式注入，路由层不依赖会话存储。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        // 首次渲染前就完成守卫，受保护页面不会闪现
        let requested = AppRoute::from_path(&current_path());
        let initial = requested.resolve(is_authenticated.get_untracked());
        if initial != requested {
            debug!(from = %requested, to = %initial, "initial redirect");
            write_history(initial, false);
        }
        let (current_route, set_route) = signal(initial);

        Self {
            current_route,
            set_route,
            is_authenticated,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 导航到 `path`，目标经过守卫后写入 History
    pub fn navigate(&self, path: &str) {
        let requested = AppRoute::from_path(path);
        let target = requested.resolve(self.is_authenticated.get_untracked());
        if target != requested {
            info!(from = %requested, to = %target, "navigation redirected");
        }
        write_history(target, true);
        self.set_route.set(target);
    }

    /// 浏览器后退/前进同样经过守卫
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        let closure = Closure::<dyn Fn()>::new(move || {
            let requested = AppRoute::from_path(&current_path());
            let target = requested.resolve(is_authenticated.get_untracked());
            if target != requested {
                write_history(target, false);
            }
            set_route.set(target);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 路由器与页面同生命周期，泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时（包括其他标签页登录/登出）重新守卫当前路由
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        Effect::new(move |_| {
            let is_auth = is_authenticated.get();
            let route = current_route.get_untracked();
            let target = route.resolve(is_auth);
            if target != route {
                info!(authenticated = is_auth, to = %target, "auth state changed, redirecting");
                write_history(target, true);
                set_route.set(target);
            }
        });
    }
}

fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}
