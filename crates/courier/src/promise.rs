//! Eagerly started request handle

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::{Error, RequestFailure};
use crate::response::{Response, ResponseMetadata};

/// A request already running on the tokio runtime
///
/// Created by [`crate::Call::promise`]. The request makes progress whether or
/// not the promise is polled; awaiting it yields the value or a
/// [`RequestFailure`].
#[derive(Debug)]
pub struct Promise<T> {
    handle: JoinHandle<Response<T>>,
}

impl<T: Send + 'static> Promise<T> {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Response<T>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Whether the request has completed
    pub fn is_settled(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for Promise<T> {
    type Output = Response<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Promise task did not complete: {}", e);
                Err(RequestFailure::new(
                    Error::Task(e.to_string()),
                    ResponseMetadata::default(),
                ))
            }
        })
    }
}
