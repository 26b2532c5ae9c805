use plantshout_shared::{
    CreateCommentRequest, CreatePostRequest, ImageAttachment, PostCategory, PostId,
};
use tracing::{info, warn};

use super::{Feed, refresh_feed};
use crate::api::{HttpTransport, PlantApi};
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub category: Option<PostCategory>,
    pub tags: String,
    pub title: String,
    pub text: String,
    pub image: Option<ImageAttachment>,
}

impl PostDraft {
    fn to_request(&self, user_id: &str) -> ClientResult<CreatePostRequest> {
        let Some(category) = self.category else {
            return Err(ClientError::validation("Please select a category"));
        };
        if [&self.tags, &self.title, &self.text]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ClientError::validation("Please fill in all fields"));
        }
        Ok(CreatePostRequest {
            category,
            tags: self.tags.trim().to_string(),
            title: self.title.trim().to_string(),
            text: self.text.clone(),
            user_id: user_id.to_string(),
            image: self.image.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub post_id: PostId,
    pub text: String,
}

/// Creates a post, then refreshes the feed once.
///
/// A failed refresh is logged but does not fail the submission; the next
/// poll cycle will pick the post up.
pub async fn submit_post<T: HttpTransport>(
    api: &PlantApi<T>,
    store: &SessionStore,
    feed: &Feed,
    draft: &PostDraft,
) -> ClientResult<()> {
    let session = store.get().ok_or(ClientError::Unauthenticated)?;
    let request = draft.to_request(&session.user_id)?;
    api.create_post(&session, &request).await?;
    info!(title = %request.title, "post created");

    if let Err(e) = refresh_feed(api, feed).await {
        warn!(error = %e, "refresh after post failed");
    }
    Ok(())
}

/// Creates a comment, then refreshes the feed once.
pub async fn submit_comment<T: HttpTransport>(
    api: &PlantApi<T>,
    store: &SessionStore,
    feed: &Feed,
    draft: &CommentDraft,
) -> ClientResult<()> {
    if draft.text.trim().is_empty() {
        return Err(ClientError::validation("Comment cannot be empty"));
    }
    let session = store.get().ok_or(ClientError::Unauthenticated)?;
    let request = CreateCommentRequest {
        text: draft.text.clone(),
        post_id: draft.post_id,
        user_id: session.user_id.clone(),
    };
    api.create_comment(&session, &request).await?;
    info!(post_id = draft.post_id, "comment created");

    if let Err(e) = refresh_feed(api, feed).await {
        warn!(error = %e, "refresh after comment failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpBody, HttpRequest, HttpResponse, MockTransport};
    use crate::feed::FeedCloser;
    use async_trait::async_trait;
    use crate::session::MemoryStorage;
    use plantshout_shared::Session;
    use plantshout_shared::protocol::HttpMethod;
    use serde_json::json;

    const POSTS: &str = "http://api.test/api/posts";
    const COMMENTS: &str = "http://api.test/api/comments";

    struct Harness {
        mock: MockTransport,
        api: PlantApi<MockTransport>,
        store: SessionStore,
        feed: Feed,
    }

    fn harness(signed_in: bool) -> Harness {
        let mock = MockTransport::new();
        let store = SessionStore::new(MemoryStorage::new());
        if signed_in {
            store.set(&Session::new("T1", "42")).unwrap();
        }
        Harness {
            api: PlantApi::new("http://api.test", mock.clone()),
            mock,
            store,
            feed: Feed::new(|_| {}),
        }
    }

    fn draft() -> PostDraft {
        PostDraft {
            category: Some(PostCategory::Question),
            tags: "monstera".into(),
            title: "Brown spots".into(),
            text: "What is this?".into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn comment_shows_up_after_triggered_refresh() {
        let h = harness(true);
        h.mock.reply(
            HttpMethod::Get,
            POSTS,
            200,
            json!([{"id": 7, "title": "t", "text": "x", "comments": []}]),
        );
        h.mock.reply(
            HttpMethod::Get,
            POSTS,
            200,
            json!([{"id": 7, "title": "t", "text": "x",
                    "comments": [{"id": 1, "text": "nice!", "user_profile_pic": "a.png"}]}]),
        );
        h.mock.reply(HttpMethod::Post, COMMENTS, 201, json!({}));

        refresh_feed(&h.api, &h.feed).await.unwrap();
        assert!(h.feed.post(7).unwrap().comments.is_empty());

        let comment = CommentDraft {
            post_id: 7,
            text: "nice!".into(),
        };
        submit_comment(&h.api, &h.store, &h.feed, &comment)
            .await
            .unwrap();

        let post = h.feed.post(7).unwrap();
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].text, "nice!");

        let sent = h.mock.requests();
        let Some(HttpBody::Json(body)) = &sent[1].body else {
            panic!("expected comment json");
        };
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body, json!({"text": "nice!", "post_id": 7, "user_id": "42"}));
    }

    #[tokio::test]
    async fn post_creation_triggers_one_refresh() {
        let h = harness(true);
        h.mock.reply(HttpMethod::Post, POSTS, 201, json!({}));
        h.mock.reply(
            HttpMethod::Get,
            POSTS,
            200,
            json!([{"id": 1, "title": "Brown spots", "text": "What is this?",
                    "ai_response": "Likely overwatering."}]),
        );

        submit_post(&h.api, &h.store, &h.feed, &draft()).await.unwrap();

        assert_eq!(h.mock.count(HttpMethod::Post, POSTS), 1);
        assert_eq!(h.mock.count(HttpMethod::Get, POSTS), 1);
        assert_eq!(
            h.feed.post(1).unwrap().ai_response.as_deref(),
            Some("Likely overwatering.")
        );
    }

    #[tokio::test]
    async fn failed_post_does_not_refresh() {
        let h = harness(true);
        h.mock.reply(
            HttpMethod::Post,
            POSTS,
            401,
            json!({"message": "Token expired"}),
        );

        let err = submit_post(&h.api, &h.store, &h.feed, &draft())
            .await
            .unwrap_err();
        assert_eq!(err.user_message("Failed to create post"), "Token expired");
        assert_eq!(h.mock.count(HttpMethod::Get, POSTS), 0);
    }

    #[tokio::test]
    async fn refresh_failure_after_create_is_not_an_error() {
        let h = harness(true);
        h.mock.reply(HttpMethod::Post, COMMENTS, 201, json!({}));
        h.mock.fail(
            HttpMethod::Get,
            POSTS,
            ClientError::Transport("offline".into()),
        );
        let comment = CommentDraft {
            post_id: 7,
            text: "hi".into(),
        };
        assert!(
            submit_comment(&h.api, &h.store, &h.feed, &comment)
                .await
                .is_ok()
        );
    }

    /// Closes the feed once the create request has been answered, as if the
    /// Main screen unmounted while the comment was in flight.
    struct UnmountAfterCreate {
        inner: MockTransport,
        closer: FeedCloser,
    }

    #[async_trait(?Send)]
    impl HttpTransport for UnmountAfterCreate {
        async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
            let is_create = req.method == HttpMethod::Post;
            let res = self.inner.send(req).await;
            if is_create {
                self.closer.close();
            }
            res
        }
    }

    #[tokio::test]
    async fn no_refresh_once_feed_is_closed() {
        let h = harness(true);
        h.mock.reply(HttpMethod::Post, COMMENTS, 201, json!({}));
        h.mock.reply(HttpMethod::Get, POSTS, 200, json!([]));
        let api = PlantApi::new(
            "http://api.test",
            UnmountAfterCreate {
                inner: h.mock.clone(),
                closer: h.feed.closer(),
            },
        );

        let comment = CommentDraft {
            post_id: 7,
            text: "hi".into(),
        };
        submit_comment(&api, &h.store, &h.feed, &comment)
            .await
            .unwrap();

        assert_eq!(h.mock.count(HttpMethod::Post, COMMENTS), 1);
        assert_eq!(h.mock.count(HttpMethod::Get, POSTS), 0);
    }

    #[tokio::test]
    async fn requires_session() {
        let h = harness(false);
        let err = submit_post(&h.api, &h.store, &h.feed, &draft())
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Unauthenticated);
        assert!(h.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_locally() {
        let h = harness(true);
        let mut d = draft();
        d.category = None;
        assert!(matches!(
            submit_post(&h.api, &h.store, &h.feed, &d).await,
            Err(ClientError::Validation(_))
        ));

        let mut d = draft();
        d.title = "   ".into();
        assert!(matches!(
            submit_post(&h.api, &h.store, &h.feed, &d).await,
            Err(ClientError::Validation(_))
        ));

        let blank = CommentDraft {
            post_id: 7,
            text: " ".into(),
        };
        assert!(matches!(
            submit_comment(&h.api, &h.store, &h.feed, &blank).await,
            Err(ClientError::Validation(_))
        ));
        assert!(h.mock.requests().is_empty());
    }
}
