use super::Notice;
use crate::auth::use_auth;
use crate::feed::{CommentDraft, Feed, submit_comment};
use leptos::prelude::*;
use leptos::task::spawn_local;
use plantshout_shared::{Post, PostCategory, PostId};

#[component]
pub fn PostCard(
    id: PostId,
    posts: ReadSignal<Vec<Post>>,
    feed: StoredValue<Feed, LocalStorage>,
    #[prop(into)] on_notice: Callback<Notice>,
) -> impl IntoView {
    let auth = use_auth();
    let api = StoredValue::new_local(auth.services().api);
    let asset = move |path: &str| api.with_value(|api| api.asset_url(path));

    let post = Memo::new(move |_| posts.with(|list| list.iter().find(|p| p.id == id).cloned()));

    let (comment, set_comment) = signal(String::new());
    let (sending, set_sending) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = CommentDraft {
            post_id: id,
            text: comment.get_untracked(),
        };
        set_sending.set(true);
        spawn_local(async move {
            let services = auth.services();
            let feed = feed.get_value();
            match submit_comment(&services.api, &services.store, &feed, &draft).await {
                Ok(()) => set_comment.set(String::new()),
                Err(e) => on_notice.run((e.user_message("Failed to add comment"), true)),
            }
            set_sending.set(false);
        });
    };

    let category = move || {
        post.with(|p| {
            p.as_ref()
                .and_then(|p| p.category.as_deref())
                .map(|raw| PostCategory::parse(raw).map_or(raw.to_string(), |c| c.label().to_string()))
        })
    };
    let title = move || post.with(|p| p.as_ref().map(|p| p.title.clone()).unwrap_or_default());
    let text = move || post.with(|p| p.as_ref().map(|p| p.text.clone()).unwrap_or_default());
    let tags = move || post.with(|p| p.as_ref().and_then(|p| p.tags.clone()));
    let image = move || post.with(|p| p.as_ref().and_then(|p| p.image.clone()));
    let ai_response = move || post.with(|p| p.as_ref().and_then(|p| p.ai_response.clone()));
    let comments = move || post.with(|p| p.as_ref().map(|p| p.comments.clone()).unwrap_or_default());

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body space-y-2">
                <div class="flex flex-wrap gap-2">
                    {move || category().map(|c| view! { <span class="badge badge-primary">{c}</span> })}
                    {move || tags().map(|t| view! { <span class="badge badge-ghost">{t}</span> })}
                </div>
                <h2 class="card-title">{title}</h2>
                <p class="whitespace-pre-wrap">{text}</p>
                {move || image().map(|src| view! {
                    <img class="rounded-box max-h-96 object-contain" src=asset(&src) alt="Post image" />
                })}

                <div class="divider my-1">"Comments"</div>

                <div class="space-y-3">
                    {move || ai_response().map(|reply| view! {
                        <div class="chat chat-start">
                            <div class="chat-header text-xs opacity-70">"AphidAI"</div>
                            <div class="chat-bubble chat-bubble-accent whitespace-pre-wrap">{reply}</div>
                        </div>
                    })}
                    <For
                        each=comments
                        key=|c| c.id
                        children=move |c| {
                            let pic = c.user_profile_pic.as_deref().map(asset);
                            view! {
                                <div class="chat chat-start">
                                    {pic.map(|src| view! {
                                        <div class="chat-image avatar">
                                            <div class="w-10 rounded-full">
                                                <img src=src alt="Profile" />
                                            </div>
                                        </div>
                                    })}
                                    <div class="chat-bubble">{c.text}</div>
                                </div>
                            }
                        }
                    />
                </div>

                <form class="join w-full mt-2" on:submit=on_submit>
                    <textarea
                        class="textarea textarea-bordered join-item w-full"
                        placeholder="Write a comment here"
                        on:input=move |ev| set_comment.set(event_target_value(&ev))
                        prop:value=comment
                        required
                    ></textarea>
                    <button type="submit" class="btn btn-primary join-item" disabled=move || sending.get()>
                        {move || if sending.get() {
                            view! { <span class="loading loading-spinner"></span> }.into_any()
                        } else {
                            "Post Comment".into_any()
                        }}
                    </button>
                </form>
            </div>
        </div>
    }
}
