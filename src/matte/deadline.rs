//! Timeout wrapper for slow foreground extractors

use super::ForegroundExtractor;
use crate::error::{CatalogError, Result};
use image::{DynamicImage, RgbaImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bounds the time spent waiting for an extractor
///
/// Each call runs the wrapped extractor on a worker thread. When the deadline
/// passes the call returns [`CatalogError::ExtractionTimeout`] and the worker
/// is left to finish in the background. Until that worker returns, later calls
/// fail immediately with the same error without copying the image or starting
/// another thread.
pub struct DeadlineExtractor<E> {
    inner: Arc<Mutex<E>>,
    busy: Arc<AtomicBool>,
    name: String,
    timeout: Duration,
}

/// Marks the extractor idle when the worker finishes, panics included
struct IdleOnDrop(Arc<AtomicBool>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<E> DeadlineExtractor<E>
where
    E: ForegroundExtractor + Send + 'static,
{
    pub fn new(extractor: E, timeout: Duration) -> Self {
        let name = format!("{} (deadline {:?})", extractor.name(), timeout);
        Self {
            inner: Arc::new(Mutex::new(extractor)),
            busy: Arc::new(AtomicBool::new(false)),
            name,
            timeout,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<E> ForegroundExtractor for DeadlineExtractor<E>
where
    E: ForegroundExtractor + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        if self.busy.swap(true, Ordering::AcqRel) {
            log::warn!("Foreground extraction skipped: an earlier extraction is still running");
            return Err(CatalogError::ExtractionTimeout(self.timeout));
        }

        let (sender, receiver) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let idle = IdleOnDrop(Arc::clone(&self.busy));
        let image = image.clone();

        let spawned = std::thread::Builder::new()
            .name("foreground-extraction".to_string())
            .spawn(move || {
                let result = {
                    let _idle = idle;
                    match inner.lock() {
                        Ok(mut extractor) => extractor.extract(&image),
                        Err(_) => Err(CatalogError::extraction(
                            "Extractor is unusable after an earlier panic",
                        )),
                    }
                };
                // The receiver is gone when the caller already timed out.
                let _ = sender.send(result);
            });
        if let Err(e) = spawned {
            self.busy.store(false, Ordering::Release);
            return Err(CatalogError::extraction(format!(
                "Failed to spawn extraction thread: {e}"
            )));
        }

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "Foreground extraction did not finish within {:?}",
                    self.timeout
                );
                Err(CatalogError::ExtractionTimeout(self.timeout))
            },
            Err(RecvTimeoutError::Disconnected) => Err(CatalogError::extraction(
                "Extraction thread exited without a result",
            )),
        }
    }
}
