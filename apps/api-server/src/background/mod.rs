//! Background jobs.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig};

use std::sync::Arc;
use tokio_cron_scheduler::JobSchedulerError;

use serif_core::ports::PostRepository;

/// Register and start the publish sweep: a cron job that flips scheduled
/// posts to published once their publish time has elapsed.
///
/// The returned scheduler must be kept alive for the jobs to keep firing.
pub async fn start_publish_sweep(
    posts: Arc<dyn PostRepository>,
    config: SchedulerConfig,
) -> Result<Scheduler, JobSchedulerError> {
    let schedule = config.sweep_schedule.clone();
    let scheduler = Scheduler::new(config).await?;

    scheduler
        .add_cron(&schedule, move || {
            let posts = posts.clone();
            async move {
                match posts.publish_due(chrono::Utc::now()).await {
                    Ok(0) => {}
                    Ok(count) => tracing::info!(count, "Scheduled posts published"),
                    Err(err) => tracing::error!(error = %err, "Publish sweep failed"),
                }
            }
        })
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}
