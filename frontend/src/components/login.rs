use crate::auth::{AuthForm, AuthMode, use_auth};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let (mode, set_mode) = signal(AuthMode::Login);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        let mode = mode.get_untracked();
        let form = AuthForm {
            email: email.get_untracked(),
            password: password.get_untracked(),
            confirm_password: confirm.get_untracked(),
        };

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            // 成功时认证信号翻转，路由服务负责跳转，页面随即卸载
            if let Err(msg) = auth.submit(mode, form).await {
                set_error_msg.set(Some(msg));
                set_is_submitting.set(false);
            }
        });
    };

    let toggle_mode = move |_| {
        set_mode.update(|m| *m = m.toggled());
        set_confirm.set(String::new());
        set_error_msg.set(None);
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Plant Shout"</h1>
                    <p class="text-base-content/70">"Plant help from people and AI"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <h2 class="card-title">{move || mode.get().title()}</h2>

                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <svg xmlns="http://www.w3.org/2000/svg" class="stroke-current shrink-0 h-6 w-6" fill="none" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M10 14l2-2m0 0l2-2m-2 2l-2-2m2 2l2 2m7-2a9 9 0 11-18 0 9 9 0 0118 0z" /></svg>
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="Email"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="Password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <Show when=move || mode.get() == AuthMode::Register>
                            <div class="form-control">
                                <label class="label" for="confirm">
                                    <span class="label-text">"Confirm Password"</span>
                                </label>
                                <input
                                    id="confirm"
                                    type="password"
                                    placeholder="Confirm Password"
                                    on:input=move |ev| set_confirm.set(event_target_value(&ev))
                                    prop:value=confirm
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                        </Show>

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Please wait..." }.into_any()
                                } else {
                                    mode.get().title().into_any()
                                }}
                            </button>
                        </div>

                        <button type="button" class="btn btn-link btn-sm" on:click=toggle_mode>
                            {move || match mode.get() {
                                AuthMode::Login => "Don't have an account? Register",
                                AuthMode::Register => "Already have an account? Login",
                            }}
                        </button>
                    </form>
                </div>
            </div>
        </div>
    }
}
