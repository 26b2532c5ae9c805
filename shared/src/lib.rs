use serde::{Deserialize, Deserializer, Serialize};

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const STORAGE_TOKEN_KEY: &str = "token";
pub const STORAGE_USER_ID_KEY: &str = "user_id";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

pub type PostId = i64;
pub type CommentId = i64;

// =========================================================
// 会话 (Session)
// =========================================================

/// A logged-in user's credentials as persisted by the client.
///
/// Both fields are required: an absent session is `Option::<Session>::None`,
/// never a half-filled struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// `POST /api/login` success body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
}

impl From<LoginResponse> for Session {
    fn from(res: LoginResponse) -> Self {
        Session::new(res.token, res.user_id)
    }
}

/// `POST /api/register` success body. Carries no token.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
}

/// Error body returned by the API on any non-success status.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    #[serde(default)]
    pub user_profile_pic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCategory {
    #[default]
    Question,
    Discussion,
}

impl PostCategory {
    pub const ALL: [PostCategory; 2] = [PostCategory::Question, PostCategory::Discussion];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Question => "question",
            PostCategory::Discussion => "discussion",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostCategory::Question => "Question",
            PostCategory::Discussion => "Discussion",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

/// Image sent as the optional `image` part of a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// 多部分表单，`user_id` 由会话在发送时填充
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePostRequest {
    pub category: PostCategory,
    pub tags: String,
    pub title: String,
    pub text: String,
    pub user_id: String,
    #[serde(skip)]
    pub image: Option<ImageAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    pub post_id: PostId,
    pub user_id: String,
}

// =========================================================
// Serde 辅助
// =========================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Uint(u64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Uint(n) => n.to_string(),
        }
    }
}

/// The backend emits numeric ids; the client keeps them as opaque strings.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}
