use crate::actions::BrowserActions;
use crate::error::Result;
use std::ops::Deref;
use std::sync::Arc;

/// Owns a page for the lifetime of one session and guarantees it is closed.
///
/// Call [`release`](Self::release) on every normal exit path. If the lease is
/// dropped while still holding the page (the session future was cancelled or
/// panicked), the close is spawned onto the current Tokio runtime.
pub struct PageLease<P: BrowserActions + 'static> {
    page: Option<Arc<P>>,
}

impl<P: BrowserActions + 'static> PageLease<P> {
    pub fn new(page: P) -> Self {
        Self {
            page: Some(Arc::new(page)),
        }
    }

    /// Close the page now.
    pub async fn release(mut self) -> Result<()> {
        match self.page.take() {
            Some(page) => page.close().await,
            None => Ok(()),
        }
    }
}

impl<P: BrowserActions + 'static> Deref for PageLease<P> {
    type Target = P;

    fn deref(&self) -> &P {
        // Only `release` and `drop` take the page, and both consume the lease
        self.page
            .as_deref()
            .expect("page lease accessed after release")
    }
}

impl<P: BrowserActions + 'static> Drop for PageLease<P> {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        tracing::warn!("Failed to close abandoned page: {}", e);
                    }
                });
            }
            Err(_) => tracing::warn!("Page dropped outside a runtime; it was not closed"),
        }
    }
}
