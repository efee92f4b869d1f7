// Notifier that reports reminders through the log
use crate::application::reminder_service::Notifier;
use crate::domain::reminder::Notification;

#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            target: "laundry_link::notify",
            tag = %notification.tag,
            "{}: {}",
            notification.title,
            notification.body
        );
    }
}
