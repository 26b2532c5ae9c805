mod post_card;
mod post_form;

use crate::auth::use_auth;
use crate::feed::{Feed, FeedPoller};
use crate::web::{BrowserClock, TimerSlot};
use leptos::prelude::*;
use leptos::task::spawn_local;
use plantshout_shared::Post;
use post_card::PostCard;
use post_form::PostForm;

/// 消息内容, 是否出错
pub type Notice = (String, bool);

#[component]
pub fn MainPage() -> impl IntoView {
    let auth = use_auth();
    let services = auth.services();

    let (posts, set_posts) = signal(Vec::<Post>::new());
    let (loaded, set_loaded) = signal(false);
    let (notification, set_notification) = signal(Option::<Notice>::None);

    let feed = Feed::new(move |list: &[Post]| {
        set_posts.set(list.to_vec());
        set_loaded.set(true);
    });

    // 进入页面立即拉取，此后按固定周期刷新；页面卸载时取消并关闭帖子流
    let closer = feed.closer();
    let (handle, task) = FeedPoller::new(
        services.api.clone(),
        feed.clone(),
        BrowserClock,
        services.config.poll_interval,
    )
    .start();
    spawn_local(task);

    let feed = StoredValue::new_local(feed);
    let on_notice = Callback::new(move |notice: Notice| set_notification.set(Some(notice)));

    // 3秒后清除通知；新通知会重新计时
    let notice_timer = StoredValue::new_local(TimerSlot::<TimeoutHandle>::default());
    Effect::new(move |_| {
        if notification.get().is_some() {
            notice_timer.update_value(|slot| {
                slot.restart(
                    || {
                        set_timeout_with_handle(
                            move || set_notification.set(None),
                            std::time::Duration::from_secs(3),
                        )
                        .ok()
                    },
                    |h| h.clear(),
                )
            });
        }
    });

    on_cleanup(move || {
        handle.cancel();
        closer.close();
        notice_timer.try_update_value(|slot| slot.cancel(|h| h.clear()));
    });

    let on_logout = move |_| auth.logout();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-4xl mx-auto space-y-8">
                <Show when=move || notification.get().is_some()>
                    <div class="toast toast-top toast-end z-50">
                        <div class=move || {
                            if notification.get().is_some_and(|(_, is_err)| is_err) {
                                "alert alert-error shadow-lg"
                            } else {
                                "alert alert-success shadow-lg"
                            }
                        }>
                            <span>{move || notification.get().map(|(msg, _)| msg).unwrap_or_default()}</span>
                            <button class="btn btn-ghost btn-xs" on:click=move |_| set_notification.set(None)>"✕"</button>
                        </div>
                    </div>
                </Show>

                <div class="navbar bg-base-100 rounded-box shadow">
                    <div class="flex-1">
                        <a class="btn btn-ghost text-xl">"Welcome to Plant Shout"</a>
                    </div>
                    <div class="flex-none">
                        <button on:click=on_logout class="btn btn-outline btn-error">"Logout"</button>
                    </div>
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body text-base-content/70">
                        <p>
                            "Anonymous plant help, from people around the world and instantly from AI."
                        </p>
                        <p>
                            "Pick the question category to get an immediate AI reply, "
                            "or pick discussion to start a conversation with other people."
                        </p>
                    </div>
                </div>

                <PostForm feed=feed on_notice=on_notice />

                <div class="space-y-6">
                    <Show when=move || !loaded.get()>
                        <div class="text-center py-8 text-base-content/50">
                            <span class="loading loading-spinner loading-md"></span> " Loading..."
                        </div>
                    </Show>
                    <Show when=move || loaded.get() && posts.with(|p| p.is_empty())>
                        <div class="text-center py-8 text-base-content/50">"No posts yet."</div>
                    </Show>
                    // 以 id 为键，轮询替换列表时卡片内的评论草稿得以保留
                    <For
                        each=move || posts.with(|p| p.iter().map(|post| post.id).collect::<Vec<_>>())
                        key=|id| *id
                        children=move |id| view! { <PostCard id=id posts=posts feed=feed on_notice=on_notice /> }
                    />
                </div>
            </div>
        </div>
    }
}
