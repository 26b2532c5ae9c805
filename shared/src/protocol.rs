use crate::{
    CreateCommentRequest, CreatePostRequest, Credentials, LoginResponse, Post, RegisterResponse,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The only status treated as success. `None` accepts any 2xx.
    const SUCCESS_STATUS: Option<u16> = None;

    fn is_success(status: u16) -> bool {
        match Self::SUCCESS_STATUS {
            Some(expected) => status == expected,
            None => (200..300).contains(&status),
        }
    }
}

// =========================================================
// Request Definitions
// =========================================================

/// Exchange credentials for a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const PATH: &'static str = "/api/login";
    const METHOD: HttpMethod = HttpMethod::Post;
    const SUCCESS_STATUS: Option<u16> = Some(200);
}

impl From<&Credentials> for LoginRequest {
    fn from(c: &Credentials) -> Self {
        Self {
            email: c.email.clone(),
            password: c.password.clone(),
        }
    }
}

/// Create an account. The response does not contain a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterResponse;
    const PATH: &'static str = "/api/register";
    const METHOD: HttpMethod = HttpMethod::Post;
    const SUCCESS_STATUS: Option<u16> = Some(201);
}

impl From<&Credentials> for RegisterRequest {
    fn from(c: &Credentials) -> Self {
        Self {
            email: c.email.clone(),
            password: c.password.clone(),
        }
    }
}

/// List all posts with their comments.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListPostsRequest;

impl ApiRequest for ListPostsRequest {
    type Response = Vec<Post>;
    const PATH: &'static str = "/api/posts";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// Sent as multipart/form-data, not JSON. The body of the reply is ignored.
impl ApiRequest for CreatePostRequest {
    type Response = ();
    const PATH: &'static str = "/api/posts";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for CreateCommentRequest {
    type Response = ();
    const PATH: &'static str = "/api/comments";
    const METHOD: HttpMethod = HttpMethod::Post;
}
