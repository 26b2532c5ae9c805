//! 帖子流状态
//!
//! 每次拉取都整体替换列表。并发拉取按发起顺序排序：
//! 每次拉取开始时领取一个递增票据，只有比上次已应用票据更新的响应才会生效，
//! 因此晚到的旧响应不会覆盖较新的列表。
//!
//! 所属页面卸载后帖子流即关闭：不再发起拉取，也不再应用响应。

mod compose;
mod poller;

pub use compose::{CommentDraft, PostDraft, submit_comment, submit_post};
pub use poller::{Clock, FeedPoller};

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use plantshout_shared::{Post, PostId};
use tracing::debug;

use crate::api::{HttpTransport, PlantApi};
use crate::error::ClientResult;

/// Issued when a fetch starts; presented when its response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

struct FeedInner {
    issued: Cell<u64>,
    applied: Cell<u64>,
    posts: RefCell<Vec<Post>>,
    sink: Box<dyn Fn(&[Post])>,
    // Arc: 关闭句柄需要放进 Send 的 on_cleanup 闭包
    closed: Arc<AtomicBool>,
}

/// In-memory post list owned by the Main screen.
#[derive(Clone)]
pub struct Feed {
    inner: Rc<FeedInner>,
}

impl Feed {
    /// `sink` is called with the new list after every applied replacement.
    pub fn new(sink: impl Fn(&[Post]) + 'static) -> Self {
        Self {
            inner: Rc::new(FeedInner {
                issued: Cell::new(0),
                applied: Cell::new(0),
                posts: RefCell::new(Vec::new()),
                sink: Box::new(sink),
                closed: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    pub fn begin(&self) -> FetchTicket {
        let next = self.inner.issued.get() + 1;
        self.inner.issued.set(next);
        FetchTicket(next)
    }

    /// Replaces the list unless a newer fetch has already been applied or the
    /// feed is closed.
    pub fn apply(&self, ticket: FetchTicket, posts: Vec<Post>) -> bool {
        if self.is_closed() {
            debug!(ticket = ticket.0, "feed closed, dropping response");
            return false;
        }
        if ticket.0 <= self.inner.applied.get() {
            debug!(
                ticket = ticket.0,
                applied = self.inner.applied.get(),
                "discarding stale feed response"
            );
            return false;
        }
        self.inner.applied.set(ticket.0);
        *self.inner.posts.borrow_mut() = posts;
        (self.inner.sink)(&self.inner.posts.borrow());
        true
    }

    /// Handle that closes this feed from a `Send` context.
    pub fn closer(&self) -> FeedCloser {
        FeedCloser(self.inner.closed.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> Vec<Post> {
        self.inner.posts.borrow().clone()
    }

    pub fn post(&self, id: PostId) -> Option<Post> {
        self.inner.posts.borrow().iter().find(|p| p.id == id).cloned()
    }
}

/// Closes a [`Feed`]. Held by the owning screen's cleanup.
#[derive(Clone)]
pub struct FeedCloser(Arc<AtomicBool>);

impl FeedCloser {
    pub fn close(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// One poll cycle: fetch the full list and replace the feed with it.
///
/// Returns whether the response was applied. A closed feed sends nothing.
pub async fn refresh_feed<T: HttpTransport>(api: &PlantApi<T>, feed: &Feed) -> ClientResult<bool> {
    if feed.is_closed() {
        return Ok(false);
    }
    let ticket = feed.begin();
    let posts = api.list_posts().await?;
    Ok(feed.apply(ticket, posts))
}
