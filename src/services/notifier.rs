// src/services/notifier.rs

//! Posting fan-out to subscribers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NotifyConfig, PostingRecord};
use crate::storage::SubscriberRegistry;

/// Message delivery channel to a single recipient.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, recipient: i64, text: &str) -> Result<()>;
}

/// Outcome of delivering one posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Formats postings and sends them to every current subscriber.
pub struct Notifier {
    registry: SubscriberRegistry,
    transport: Arc<dyn Transport>,
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(
        registry: SubscriberRegistry,
        transport: Arc<dyn Transport>,
        config: NotifyConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            config,
        }
    }

    /// Render the notification text for a posting.
    pub fn render(&self, record: &PostingRecord) -> String {
        record.format(&self.config.template, self.config.description_limit)
    }

    /// Deliver a posting to all subscribers.
    ///
    /// A failing recipient is logged and skipped; it never stops the others.
    pub async fn deliver(&self, record: &PostingRecord) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        let recipients = match self.registry.list() {
            Ok(recipients) => recipients,
            Err(e) => {
                log::error!("Failed to read subscribers: {}", e);
                return report;
            }
        };

        let text = self.render(record);
        for recipient in recipients {
            match self.transport.send(recipient, &text).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    log::warn!("Failed to deliver to {}: {}", recipient, e);
                }
            }
        }

        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;
    use crate::storage::Database;

    /// Records sent messages; recipients in `blocked` always fail.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        pub(crate) blocked: Vec<i64>,
        pub(crate) sent: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingTransport {
        pub(crate) fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, recipient: i64, text: &str) -> Result<()> {
            if self.blocked.contains(&recipient) {
                return Err(AppError::Telegram {
                    code: 403,
                    description: "Forbidden: bot was blocked by the user".to_string(),
                });
            }
            self.sent.lock().unwrap().push((recipient, text.to_string()));
            Ok(())
        }
    }

    fn posting() -> PostingRecord {
        PostingRecord {
            title: "Python Developer".to_string(),
            link: "https://www.work.ua/jobs/1/".to_string(),
            description: "Django, PostgreSQL".to_string(),
            source: "work.ua".to_string(),
            published: "09.01.2024 18:45".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failing_recipient_does_not_block_others() {
        let db = Database::open_in_memory().unwrap();
        let registry = db.subscribers();
        registry.add(1).unwrap();
        registry.add(2).unwrap();

        let transport = Arc::new(RecordingTransport {
            blocked: vec![1],
            ..Default::default()
        });
        let notifier = Notifier::new(registry, transport.clone(), NotifyConfig::default());

        let report = notifier.deliver(&posting()).await;

        assert_eq!(report, DeliveryReport { delivered: 1, failed: 1 });
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 2);
    }

    #[tokio::test]
    async fn test_no_subscribers_sends_nothing() {
        let db = Database::open_in_memory().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(db.subscribers(), transport.clone(), NotifyConfig::default());

        assert_eq!(notifier.deliver(&posting()).await, DeliveryReport::default());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_default_message_layout() {
        let db = Database::open_in_memory().unwrap();
        let notifier = Notifier::new(
            db.subscribers(),
            Arc::new(RecordingTransport::default()),
            NotifyConfig::default(),
        );

        assert_eq!(
            notifier.render(&posting()),
            "<b>Python Developer</b>\n\nDjango, PostgreSQL\n\nPublished: 09.01.2024 18:45\n\
             Source: <i>work.ua</i>\n<a href=\"https://www.work.ua/jobs/1/\">Link</a>"
        );
    }
}
