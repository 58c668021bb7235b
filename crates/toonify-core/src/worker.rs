//! The cartoonization worker: one task, one photo at a time.
//!
//! A single dedicated task owns the engine and executes preprocess →
//! inference → postprocess as one atomic unit per submitted photo. Requests
//! travel over a bounded channel carrying a oneshot reply sender, so results
//! come back as explicit `Result` values and busy/idle state lives entirely
//! in the worker's own loop. Submissions beyond the queue depth wait
//! (`submit`) or are refused with [`PipelineError::Busy`] (`try_submit`);
//! nothing is ever interleaved. A request that fails never touches the
//! buffers of the next one.

use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::{mpsc, oneshot};

use crate::config::WorkerConfig;
use crate::engine::Stylize;
use crate::error::PipelineError;
use crate::pipeline::orientation::Orientation;

struct Job {
    image: DynamicImage,
    orientation: Orientation,
    original_size: Option<(u32, u32)>,
    reply: oneshot::Sender<Result<DynamicImage, PipelineError>>,
}

/// Handle for submitting photos to the worker. Cheap to clone; the worker
/// stops once every handle is dropped and the queue drains.
#[derive(Clone)]
pub struct WorkerHandle {
    sender: mpsc::Sender<Job>,
}

impl WorkerHandle {
    /// Submit a photo and wait for the result, queueing behind any photos
    /// already in flight.
    pub async fn submit(
        &self,
        image: DynamicImage,
        orientation: Orientation,
        original_size: Option<(u32, u32)>,
    ) -> Result<DynamicImage, PipelineError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Job {
                image,
                orientation,
                original_size,
                reply,
            })
            .await
            .map_err(|_| worker_stopped())?;
        response.await.map_err(|_| worker_stopped())?
    }

    /// Submit a photo, refusing immediately with [`PipelineError::Busy`] if
    /// the queue is full.
    pub async fn try_submit(
        &self,
        image: DynamicImage,
        orientation: Orientation,
        original_size: Option<(u32, u32)>,
    ) -> Result<DynamicImage, PipelineError> {
        let (reply, response) = oneshot::channel();
        let job = Job {
            image,
            orientation,
            original_size,
            reply,
        };
        match self.sender.try_send(job) {
            Ok(()) => response.await.map_err(|_| worker_stopped())?,
            Err(mpsc::error::TrySendError::Full(_)) => Err(PipelineError::Busy),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(worker_stopped()),
        }
    }
}

fn worker_stopped() -> PipelineError {
    PipelineError::Allocation {
        path: Default::default(),
        message: "Worker stopped".to_string(),
    }
}

/// Spawn the worker task around an engine.
///
/// The returned handle is the only way in; each job runs to completion or
/// failure on the blocking pool before the next is picked up.
pub fn spawn<S: Stylize>(engine: S, config: &WorkerConfig) -> WorkerHandle {
    let engine = Arc::new(engine);
    let (sender, mut receiver) = mpsc::channel::<Job>(config.queue_depth.max(1));

    tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            let engine = Arc::clone(&engine);
            let result = tokio::task::spawn_blocking(move || {
                engine.stylize(&job.image, job.orientation, job.original_size)
            })
            .await
            .unwrap_or_else(|e| {
                Err(PipelineError::Inference {
                    message: format!("Task join error: {e}"),
                })
            });

            if let Err(ref e) = result {
                tracing::error!("Cartoonization failed in {} stage: {e}", e.stage());
            }
            // The submitter may have gone away; that only cancels delivery.
            let _ = job.reply.send(result);
        }
        tracing::debug!("Worker queue closed, stopping");
    });

    WorkerHandle { sender }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Engine stand-in that inverts the image and records call order.
    struct InvertEngine {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl Stylize for InvertEngine {
        fn stylize(
            &self,
            image: &DynamicImage,
            _orientation: Orientation,
            _original_size: Option<(u32, u32)>,
        ) -> Result<DynamicImage, PipelineError> {
            std::thread::sleep(self.delay);
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut inverted = image.clone();
            inverted.invert();
            Ok(inverted)
        }
    }

    struct FailingEngine;

    impl Stylize for FailingEngine {
        fn stylize(
            &self,
            _image: &DynamicImage,
            _orientation: Orientation,
            _original_size: Option<(u32, u32)>,
        ) -> Result<DynamicImage, PipelineError> {
            Err(PipelineError::Inference {
                message: "graph exploded".to_string(),
            })
        }
    }

    fn white_image() -> DynamicImage {
        DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            2,
            2,
            image::Rgba([255, 255, 255, 255]),
        ))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_returns_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = spawn(
            InvertEngine {
                calls: Arc::clone(&calls),
                delay: Duration::ZERO,
            },
            &WorkerConfig::default(),
        );

        let result = handle
            .submit(white_image(), Orientation::Upright, None)
            .await
            .unwrap();
        assert_eq!(result.to_rgba8().get_pixel(0, 0)[0], 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failure_is_terminal_for_one_request_only() {
        let handle = spawn(FailingEngine, &WorkerConfig::default());

        let first = handle.submit(white_image(), Orientation::Upright, None).await;
        assert!(matches!(first, Err(PipelineError::Inference { .. })));

        // The worker keeps serving after a failed request
        let second = handle.submit(white_image(), Orientation::Upright, None).await;
        assert!(matches!(second, Err(PipelineError::Inference { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_try_submit_refuses_when_queue_is_full() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = spawn(
            InvertEngine {
                calls: Arc::clone(&calls),
                delay: Duration::from_millis(200),
            },
            &WorkerConfig { queue_depth: 1 },
        );

        // Occupy the worker and its single queue slot
        let busy_handle = handle.clone();
        let pending =
            tokio::spawn(
                async move { busy_handle.submit(white_image(), Orientation::Upright, None).await },
            );
        let busy_handle = handle.clone();
        let queued =
            tokio::spawn(
                async move { busy_handle.submit(white_image(), Orientation::Upright, None).await },
            );
        tokio::time::sleep(Duration::from_millis(50)).await;

        let refused = handle
            .try_submit(white_image(), Orientation::Upright, None)
            .await;
        assert!(matches!(refused, Err(PipelineError::Busy)));

        // Queued submissions still complete in order
        assert!(pending.await.unwrap().is_ok());
        assert!(queued.await.unwrap().is_ok());
    }
}
