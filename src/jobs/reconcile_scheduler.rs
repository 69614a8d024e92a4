// ==================== ENROLLMENT RECONCILIATION ====================
// Enroll/unenroll write the user and the course separately. This job
// rebuilds course student sets from user documents so drift left by a
// failed second write does not persist.

use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::{database::Store, services::admin_service};

/// Runs once at startup, then every `interval_secs`.
pub async fn start_enrollment_reconciler(db: Arc<dyn Store>, period: String, interval_secs: u64) {
    log::info!(
        "📅 Starting enrollment reconciler for {} (every {}s)",
        period,
        interval_secs
    );

    tokio::spawn(async move {
        // First tick completes immediately
        let mut interval = interval(Duration::from_secs(interval_secs.max(1)));

        loop {
            interval.tick().await;

            match admin_service::reconcile_enrollments(db.as_ref(), &period).await {
                Ok(summary) if summary.courses_repaired > 0 => {
                    log::info!(
                        "✅ Reconciled {}: {} of {} courses repaired",
                        period,
                        summary.courses_repaired,
                        summary.courses_checked
                    );
                }
                Ok(summary) => {
                    log::debug!("✅ Reconciled {}: {} courses consistent", period, summary.courses_checked);
                }
                Err(e) => {
                    log::error!("❌ Enrollment reconciliation failed: {}", e);
                }
            }
        }
    });
}
