//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现 [`HttpTransport`]，并为每个请求加上超时。
//! 超时后通过 `AbortController` 中止仍在进行的 fetch。

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, AbortSignal, Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit,
    Response,
};

use super::timer::BrowserClock;
use crate::api::{FormField, HttpBody, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{ClientError, ClientResult};

fn build_failed(what: &str, e: JsValue) -> ClientError {
    ClientError::Transport(format!("{}: {:?}", what, e))
}

/// 浏览器 fetch 客户端
#[derive(Debug, Clone, Copy)]
pub struct FetchTransport {
    timeout: Duration,
}

impl FetchTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn form_data(fields: &[FormField]) -> ClientResult<FormData> {
        let form = FormData::new().map_err(|e| build_failed("创建 FormData 失败", e))?;
        for field in fields {
            match field {
                FormField::Text { name, value } => form
                    .append_with_str(name, value)
                    .map_err(|e| build_failed("追加表单字段失败", e))?,
                FormField::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let parts = Array::of1(&Uint8Array::from(bytes.as_slice()));
                    let options = BlobPropertyBag::new();
                    options.set_type(content_type);
                    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                        .map_err(|e| build_failed("创建 Blob 失败", e))?;
                    form.append_with_blob_and_filename(name, &blob, file_name)
                        .map_err(|e| build_failed("追加文件失败", e))?;
                }
            }
        }
        Ok(form)
    }

    fn build(req: &HttpRequest, signal: &AbortSignal) -> ClientResult<Request> {
        let headers = Headers::new().map_err(|e| build_failed("创建 Headers 失败", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| build_failed("设置 Header 失败", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(signal));

        match &req.body {
            Some(HttpBody::Json(body)) => opts.set_body(&JsValue::from_str(body)),
            // 不设置 Content-Type，由浏览器生成 multipart 边界
            Some(HttpBody::Multipart(fields)) => opts.set_body(&Self::form_data(fields)?.into()),
            None => {}
        }

        Request::new_with_str_and_init(&req.url, &opts).map_err(|e| build_failed("创建请求失败", e))
    }

    async fn fetch(request: Request) -> ClientResult<HttpResponse> {
        let window =
            web_sys::window().ok_or_else(|| ClientError::Transport("无法获取 window 对象".into()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ClientError::Transport(format!("{:?}", e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| ClientError::Decode(format!("Response 类型转换失败: {:?}", e)))?;

        let status = response.status();
        let promise = response
            .text()
            .map_err(|e| ClientError::Decode(format!("{:?}", e)))?;
        let body = JsFuture::from(promise)
            .await
            .map_err(|e| ClientError::Decode(format!("{:?}", e)))?
            .as_string()
            .ok_or_else(|| ClientError::Decode("无法转换为字符串".into()))?;

        Ok(HttpResponse { status, body })
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let controller =
            AbortController::new().map_err(|e| build_failed("创建 AbortController 失败", e))?;
        let request = Self::build(&req, &controller.signal())?;

        race_deadline(
            Self::fetch(request),
            TimeoutFuture::new(BrowserClock::millis(self.timeout)),
            self.timeout,
            || {
                tracing::warn!(url = %req.url, "request timed out, aborting");
                controller.abort();
            },
        )
        .await
    }
}

/// Resolves with `work` unless `deadline` fires first. In that case `on_timeout`
/// runs and `work` is dropped unfinished.
async fn race_deadline<F, D>(
    work: F,
    deadline: D,
    timeout: Duration,
    on_timeout: impl FnOnce(),
) -> ClientResult<HttpResponse>
where
    F: Future<Output = ClientResult<HttpResponse>>,
    D: Future<Output = ()>,
{
    match select(pin!(work), pin!(deadline)).await {
        Either::Left((res, _)) => res,
        Either::Right(_) => {
            on_timeout();
            Err(ClientError::Timeout(timeout))
        }
    }
}
