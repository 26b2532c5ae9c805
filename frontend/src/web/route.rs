//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其守卫规则。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// `/`：只做重定向，从不渲染
    #[default]
    Root,
    /// 登录/注册页面
    Login,
    /// 帖子流 (需要认证)
    Main,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.trim_end_matches('/');
        match path {
            "" => Self::Root,
            "/login" => Self::Login,
            "/main" => Self::Main,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Main => "/main",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Main)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 给定认证状态，返回实际应当渲染的路由
    ///
    /// 返回值永远不是 `Root`，且 `Main` 只在已认证时出现。
    pub fn resolve(self, is_authenticated: bool) -> Self {
        match self {
            Self::Root if is_authenticated => Self::Main,
            Self::Root => Self::Login,
            route if route.requires_auth() && !is_authenticated => Self::Login,
            route if route.should_redirect_when_authenticated() && is_authenticated => Self::Main,
            route => route,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Root);
        assert_eq!(AppRoute::from_path(""), AppRoute::Root);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/main/"), AppRoute::Main);
        assert_eq!(AppRoute::from_path("/dashboard"), AppRoute::NotFound);
    }

    #[test]
    fn root_always_redirects() {
        assert_eq!(AppRoute::Root.resolve(true), AppRoute::Main);
        assert_eq!(AppRoute::Root.resolve(false), AppRoute::Login);
    }

    #[test]
    fn main_requires_auth() {
        assert_eq!(AppRoute::Main.resolve(false), AppRoute::Login);
        assert_eq!(AppRoute::Main.resolve(true), AppRoute::Main);
    }

    #[test]
    fn login_bounces_authenticated_users() {
        assert_eq!(AppRoute::Login.resolve(true), AppRoute::Main);
        assert_eq!(AppRoute::Login.resolve(false), AppRoute::Login);
    }

    #[test]
    fn resolution_never_renders_feed_unauthenticated() {
        for route in [
            AppRoute::Root,
            AppRoute::Login,
            AppRoute::Main,
            AppRoute::NotFound,
        ] {
            let resolved = route.resolve(false);
            assert_ne!(resolved, AppRoute::Main);
            assert_ne!(resolved, AppRoute::Root);
            assert_eq!(resolved.resolve(false), resolved, "stable for {route}");
        }
    }

    #[test]
    fn paths_round_trip() {
        for route in [AppRoute::Root, AppRoute::Login, AppRoute::Main] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
    }
}
