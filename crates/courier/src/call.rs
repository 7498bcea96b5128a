//! Calling conventions
//!
//! Every terminal method of [`crate::RequestBuilder`] returns a [`Call`]: one
//! lazily started future producing an [`Outcome`]. The conventions below only
//! change how that outcome reaches the caller.
//!
//! - async: `call.await` gives `Result<T, RequestFailure>`, or
//!   [`Call::outcome`] gives the result and metadata side by side
//! - callback: [`Call::on_complete`]
//! - promise: [`Call::promise`]

use std::fmt;
use std::future::{Future, IntoFuture};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::promise::Promise;
use crate::response::{Outcome, Response, ResponseMetadata};

/// A pending request with its decoder attached
#[must_use = "a call does nothing until it is awaited, spawned or promised"]
pub struct Call<T> {
    future: BoxFuture<'static, Outcome<T>>,
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Call<T> {
    /// Wrap a future producing an outcome
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        Self {
            future: future.boxed(),
        }
    }

    /// Apply a decoder to the outcome
    pub fn map<U, F>(self, decoder: F) -> Call<U>
    where
        U: Send + 'static,
        F: FnOnce(Outcome<T>) -> Outcome<U> + Send + 'static,
    {
        Call::new(self.future.map(decoder))
    }

    /// Run the request and return the result together with the metadata
    pub async fn outcome(self) -> Outcome<T> {
        self.future.await
    }

    /// Run the request on the current runtime and hand the result to `callback`
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_complete<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<T, Error>, ResponseMetadata) + Send + 'static,
    {
        tokio::spawn(async move {
            let (result, metadata) = self.future.await.into_parts();
            callback(result, metadata);
        })
    }

    /// Start the request now and return a handle to await later
    ///
    /// Must be called from within a tokio runtime.
    pub fn promise(self) -> Promise<T> {
        Promise::spawn(async move { self.future.await.into_result() })
    }
}

impl<T: Send + 'static> IntoFuture for Call<T> {
    type Output = Response<T>;
    type IntoFuture = BoxFuture<'static, Response<T>>;

    fn into_future(self) -> Self::IntoFuture {
        self.future.map(Outcome::into_result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;
    use crate::error::NetworkError;
    use crate::response::ResponseHead;

    fn metadata(status: u16) -> ResponseMetadata {
        ResponseMetadata {
            response: Some(ResponseHead::new(status, "http://localhost/")),
            ..Default::default()
        }
    }

    fn succeed() -> Call<u32> {
        Call::new(async { Outcome::success(7, metadata(200)) })
    }

    fn fail() -> Call<u32> {
        Call::new(async { Outcome::failure(NetworkError::InvalidStatusCode(404), metadata(404)) })
    }

    #[tokio::test]
    async fn test_await_success() {
        assert_eq!(succeed().await.expect("Success"), 7);
    }

    #[tokio::test]
    async fn test_await_failure_keeps_metadata() {
        let failure = fail().await.expect_err("Failure");
        assert_eq!(failure.error.status_code(), Some(404));
        assert_eq!(failure.metadata.status(), Some(404));
    }

    #[tokio::test]
    async fn test_outcome_exposes_both_parts() {
        let outcome = succeed().outcome().await;
        assert_eq!(outcome.metadata.status(), Some(200));
        assert_eq!(outcome.result.expect("Success"), 7);
    }

    #[tokio::test]
    async fn test_map_applies_decoder() {
        let call = succeed().map(|outcome| outcome.and_then(|n| Ok(n.to_string())));
        assert_eq!(call.await.expect("Success"), "7");
    }

    #[tokio::test]
    async fn test_callback_receives_result_and_metadata() {
        let (tx, rx) = oneshot::channel();
        fail()
            .on_complete(move |result, metadata| {
                let _ = tx.send((result.map_err(|e| e.status_code()), metadata.status()));
            })
            .await
            .expect("Callback task");

        let (result, status) = rx.await.expect("Callback should fire");
        assert_eq!(result, Err(Some(404)));
        assert_eq!(status, Some(404));
    }

    #[tokio::test]
    async fn test_callback_fires_exactly_once() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        succeed()
            .on_complete(move |result, _| {
                let _ = tx.send(result.is_ok());
            })
            .await
            .expect("Callback task");

        assert_eq!(rx.recv().await, Some(true));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_promise_runs_without_being_polled() {
        let (tx, rx) = oneshot::channel::<()>();
        let promise = Call::new(async move {
            let _ = tx.send(());
            Outcome::success("done", ResponseMetadata::default())
        })
        .promise();

        rx.await.expect("Promise should start eagerly");
        assert_eq!(promise.await.expect("Success"), "done");
    }

    #[tokio::test]
    async fn test_promise_settles_when_request_completes() {
        let (release, gate) = oneshot::channel::<()>();
        let promise = Call::new(async move {
            let _ = gate.await;
            Outcome::success(1u8, ResponseMetadata::default())
        })
        .promise();

        tokio::task::yield_now().await;
        assert!(!promise.is_settled());

        release.send(()).expect("Gate open");
        while !promise.is_settled() {
            tokio::task::yield_now().await;
        }
        assert_eq!(promise.await.expect("Success"), 1);
    }

    #[tokio::test]
    async fn test_promise_rejects_with_metadata() {
        let failure = fail().promise().await.expect_err("Failure");
        assert_eq!(
            failure.network_error(),
            Some(&NetworkError::InvalidStatusCode(404))
        );
        assert_eq!(failure.metadata.status(), Some(404));
    }
}
