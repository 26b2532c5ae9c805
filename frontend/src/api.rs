//! Plant Shout 远程 API 客户端
//!
//! 端点元数据来自 `plantshout_shared::protocol`，实际发送交给
//! [`HttpTransport`]，浏览器中为 `web::FetchTransport`，测试中为 `MockTransport`。

mod transport;


pub use transport::{FormField, HttpBody, HttpRequest, HttpResponse, HttpTransport};

#[cfg(test)]
pub use transport::MockTransport;

use plantshout_shared::protocol::{ApiRequest, ListPostsRequest, LoginRequest, RegisterRequest};
use plantshout_shared::{
    ApiMessage, CreateCommentRequest, CreatePostRequest, Credentials, HEADER_AUTHORIZATION, Post,
    RegisterResponse, Session,
};
use std::rc::Rc;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

pub struct PlantApi<T> {
    base_url: Rc<str>,
    transport: Rc<T>,
}

// 手动实现，避免要求 T: Clone
impl<T> Clone for PlantApi<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl<T: HttpTransport> PlantApi<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').into(),
            transport: Rc::new(transport),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Absolute URL for a server-relative asset such as a profile picture.
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.url(path)
        }
    }

    fn request<R: ApiRequest>(&self) -> HttpRequest {
        HttpRequest::new(self.url(R::PATH), R::METHOD)
    }

    /// Sends the request and checks the status against `R::SUCCESS_STATUS`.
    async fn execute<R: ApiRequest>(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let res = self.transport.send(req).await?;
        debug!(path = R::PATH, status = res.status, "api response");
        if R::is_success(res.status) {
            Ok(res)
        } else {
            Err(rejection(&res))
        }
    }

    async fn call<R: ApiRequest>(&self, body: &R) -> ClientResult<R::Response> {
        let req = self.request::<R>().with_json(serde_json::to_string(body)?);
        let res = self.execute::<R>(req).await?;
        Ok(serde_json::from_str(&res.body)?)
    }

    /// `POST /api/login`
    ///
    /// A reply with an empty token or user id is a decode error: it could never
    /// be read back as a session.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        let res = self.call(&LoginRequest::from(credentials)).await?;
        if res.token.is_empty() || res.user_id.is_empty() {
            return Err(ClientError::Decode("login reply without token or user_id".into()));
        }
        Ok(res.into())
    }

    /// `POST /api/register`
    pub async fn register(&self, credentials: &Credentials) -> ClientResult<RegisterResponse> {
        let req = RegisterRequest::from(credentials);
        let http = self
            .request::<RegisterRequest>()
            .with_json(serde_json::to_string(&req)?);
        let res = self.execute::<RegisterRequest>(http).await?;
        // 只关心状态码，响应体缺失或格式不符都不算失败
        Ok(serde_json::from_str(&res.body).unwrap_or_default())
    }

    /// `GET /api/posts`
    pub async fn list_posts(&self) -> ClientResult<Vec<Post>> {
        let req = self.request::<ListPostsRequest>();
        let res = self.execute::<ListPostsRequest>(req).await?;
        Ok(serde_json::from_str(&res.body)?)
    }

    /// `POST /api/posts` as multipart/form-data.
    pub async fn create_post(&self, session: &Session, post: &CreatePostRequest) -> ClientResult<()> {
        let req = self
            .request::<CreatePostRequest>()
            .with_header(HEADER_AUTHORIZATION, &session.bearer())
            .with_body(HttpBody::Multipart(post_form(post)));
        self.execute::<CreatePostRequest>(req).await?;
        Ok(())
    }

    /// `POST /api/comments`
    pub async fn create_comment(
        &self,
        session: &Session,
        comment: &CreateCommentRequest,
    ) -> ClientResult<()> {
        let req = self
            .request::<CreateCommentRequest>()
            .with_header(HEADER_AUTHORIZATION, &session.bearer())
            .with_json(serde_json::to_string(comment)?);
        self.execute::<CreateCommentRequest>(req).await?;
        Ok(())
    }
}

fn post_form(post: &CreatePostRequest) -> Vec<FormField> {
    let mut fields = vec![
        FormField::text("category", post.category.as_str()),
        FormField::text("tags", post.tags.clone()),
        FormField::text("title", post.title.clone()),
        FormField::text("text", post.text.clone()),
        FormField::text("user_id", post.user_id.clone()),
    ];
    if let Some(image) = &post.image {
        fields.push(FormField::File {
            name: "image".to_string(),
            file_name: image.file_name.clone(),
            content_type: image.content_type.clone(),
            bytes: image.bytes.clone(),
        });
    }
    fields
}

fn rejection(res: &HttpResponse) -> ClientError {
    let message = serde_json::from_str::<ApiMessage>(&res.body)
        .map(|m| m.message)
        .unwrap_or_else(|_| format!("Request failed with status {}", res.status));
    ClientError::Rejected {
        status: res.status,
        message,
    }
}
