use serde::Serialize;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Notification emitted by the write path so listing views can refresh
/// without sharing an ambient "updated" flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EmployeeEvent {
    Recorded {
        employee_id: String,
        national_id: String,
        company_id: String,
    },
}

/// In-process broadcast channel for employee events. Cloneable; dropped
/// receivers simply stop the fan-out for that subscriber.
#[derive(Debug, Clone)]
pub struct EmployeeEvents {
    sender: broadcast::Sender<EmployeeEvent>,
}

impl EmployeeEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EmployeeEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. A send error only means nobody is subscribed.
    pub(crate) fn publish(&self, event: EmployeeEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EmployeeEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
