use super::Notice;
use crate::auth::use_auth;
use crate::feed::{Feed, PostDraft, submit_post};
use leptos::prelude::*;
use leptos::task::spawn_local;
use plantshout_shared::PostCategory;

#[component]
pub fn PostForm(
    feed: StoredValue<Feed, LocalStorage>,
    #[prop(into)] on_notice: Callback<Notice>,
) -> impl IntoView {
    let auth = use_auth();

    let (category, set_category) = signal(Option::<PostCategory>::None);
    let (tags, set_tags) = signal(String::new());
    let (title, set_title) = signal(String::new());
    let (text, set_text) = signal(String::new());
    let (loading, set_loading) = signal(false);

    let reset_form = move || {
        set_category.set(None);
        set_tags.set(String::new());
        set_title.set(String::new());
        set_text.set(String::new());
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = PostDraft {
            category: category.get_untracked(),
            tags: tags.get_untracked(),
            title: title.get_untracked(),
            text: text.get_untracked(),
            image: None,
        };
        set_loading.set(true);

        spawn_local(async move {
            let services = auth.services();
            let feed = feed.get_value();
            match submit_post(&services.api, &services.store, &feed, &draft).await {
                Ok(()) => {
                    reset_form();
                    on_notice.run(("Post created".to_string(), false));
                }
                Err(e) => on_notice.run((e.user_message("Failed to create post"), true)),
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body space-y-4" on:submit=on_submit>
                <h3 class="card-title">"Create Post"</h3>

                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <select
                        class="select select-bordered w-full"
                        required
                        on:change=move |ev| set_category.set(PostCategory::parse(&event_target_value(&ev)))
                    >
                        <option value="" selected=move || category.get().is_none()>"Select Category"</option>
                        {PostCategory::ALL
                            .into_iter()
                            .map(|c| view! {
                                <option value=c.as_str() selected=move || category.get() == Some(c)>
                                    {c.label()}
                                </option>
                            })
                            .collect_view()}
                    </select>
                    <input
                        type="text"
                        placeholder="Tags"
                        class="input input-bordered w-full"
                        on:input=move |ev| set_tags.set(event_target_value(&ev))
                        prop:value=tags
                        required
                    />
                </div>

                <input
                    type="text"
                    placeholder="Title"
                    class="input input-bordered w-full"
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                    prop:value=title
                    required
                />
                <textarea
                    placeholder="Text Here"
                    class="textarea textarea-bordered w-full"
                    on:input=move |ev| set_text.set(event_target_value(&ev))
                    prop:value=text
                    required
                ></textarea>

                <div class="card-actions justify-end">
                    <button type="submit" disabled=move || loading.get() class="btn btn-primary">
                        {move || if loading.get() {
                            view! { <span class="loading loading-spinner"></span> "Posting..." }.into_any()
                        } else {
                            "Submit Post".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
