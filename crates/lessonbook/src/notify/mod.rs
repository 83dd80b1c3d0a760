//! Best-effort notifications about new bookings.
//!
//! Delivery is fire-and-forget: the booking outcome never depends on it, and
//! failures are logged once and dropped.

mod telegram;

pub use telegram::{TelegramNotifier, TELEGRAM_API_BASE};

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, warn};

/// What a notifier is told about a successful booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingNotice {
    pub student_email: String,
    pub student_name: Option<String>,
    pub start_time: DateTime<Utc>,
}

impl BookingNotice {
    /// Renders the notice as a Markdown message in the school's local time.
    pub fn render(&self, offset: FixedOffset) -> String {
        let local = self.start_time.with_timezone(&offset);
        let student = self.student_name.as_deref().unwrap_or(&self.student_email);
        format!(
            "📅 *New booking!*\n\n👤 {}\n📧 `{}`\n📆 {}\n🕐 {}",
            student,
            self.student_email,
            local.format("%-d %B %Y"),
            local.format("%H:%M"),
        )
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Notifier rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// An outbound channel such as a Telegram chat.
pub trait Notifier: Send + Sync {
    /// Starts delivering `notice`. The returned future does the I/O.
    fn send(&self, notice: BookingNotice) -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// Hands notices to the configured notifier without waiting on them.
#[derive(Clone, Default)]
pub struct Dispatcher {
    notifier: Option<Arc<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: Some(notifier),
        }
    }

    /// A dispatcher that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Spawns delivery on the current tokio runtime and returns immediately.
    pub fn dispatch(&self, notice: BookingNotice) {
        let Some(notifier) = &self.notifier else {
            debug!("Notifications disabled, skipping booking notice");
            return;
        };

        let delivery = notifier.send(notice);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = delivery.await {
                        warn!("Booking notification failed: {}", e);
                    }
                });
            }
            Err(_) => warn!("No async runtime available, booking notification dropped"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records every notice it is given.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) sent: Mutex<Vec<BookingNotice>>,
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, notice: BookingNotice) -> BoxFuture<'static, Result<(), NotifyError>> {
            self.sent.lock().unwrap().push(notice);
            Box::pin(async { Ok(()) })
        }
    }

    /// Always fails delivery.
    pub(crate) struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, _notice: BookingNotice) -> BoxFuture<'static, Result<(), NotifyError>> {
            Box::pin(async {
                Err(NotifyError::Rejected {
                    status: 502,
                    body: "bad gateway".to_string(),
                })
            })
        }
    }

    fn notice() -> BookingNotice {
        BookingNotice {
            student_email: "anna@example.com".to_string(),
            student_name: Some("Anna".to_string()),
            start_time: Utc.with_ymd_and_hms(2026, 3, 5, 7, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_uses_local_offset() {
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let text = notice().render(moscow);
        assert!(text.contains("👤 Anna"));
        assert!(text.contains("`anna@example.com`"));
        assert!(text.contains("5 March 2026"));
        assert!(text.contains("10:30"));
    }

    #[test]
    fn test_render_falls_back_to_email() {
        let mut n = notice();
        n.student_name = None;
        let text = n.render(FixedOffset::east_opt(0).unwrap());
        assert!(text.contains("👤 anna@example.com"));
    }

    #[tokio::test]
    async fn test_failed_delivery_is_swallowed() {
        let dispatcher = Dispatcher::new(Arc::new(FailingNotifier));
        dispatcher.dispatch(notice());
        tokio::task::yield_now().await;
    }

    #[test]
    fn test_dispatch_without_runtime_does_not_panic() {
        let recorder = Arc::new(RecordingNotifier::default());
        let dispatcher = Dispatcher::new(recorder.clone());
        dispatcher.dispatch(notice());
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
        assert!(!Dispatcher::disabled().is_enabled());
    }
}
