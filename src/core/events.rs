//! Appointment events
//!
//! Dashboards announce appointment changes with a small set of named events.
//! [`EventBus`] fans them out over a `tokio::sync::broadcast` channel and
//! [`AppointmentStatusStore`] folds them into an in-memory status table, so
//! a report can reflect a status change before the backend has been reread.
//!
//! Events recorded from the dashboard socket can be replayed from a file
//! with [`read_event_log`] and [`replay`].

use crate::domain::{AppointmentRow, AppointmentStatus, HmsExportError, RecordId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tokio::sync::broadcast;

/// Default number of undelivered events a slow subscriber may fall behind
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Appointment lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail")]
#[serde(rename_all_fields = "camelCase")]
pub enum HmsEvent {
    /// Reread today's appointments from the backend
    #[serde(rename = "refresh-today-appointments")]
    RefreshTodayAppointments,

    #[serde(rename = "patient-status_changed")]
    PatientStatusChanged {
        appointment_id: RecordId,
        status: AppointmentStatus,
    },

    /// Reception marked the patient as present
    #[serde(rename = "patient-arrived")]
    PatientArrived { appointment_id: RecordId },

    #[serde(rename = "new-appointment-booked")]
    NewAppointmentBooked { appointment: AppointmentRow },
}

impl HmsEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            HmsEvent::RefreshTodayAppointments => "refresh-today-appointments",
            HmsEvent::PatientStatusChanged { .. } => "patient-status_changed",
            HmsEvent::PatientArrived { .. } => "patient-arrived",
            HmsEvent::NewAppointmentBooked { .. } => "new-appointment-booked",
        }
    }
}

/// Broadcast channel for [`HmsEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HmsEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HmsEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers will see it
    pub fn publish(&self, event: HmsEvent) -> usize {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = name, receivers, "Event published");
                receivers
            }
            Err(_) => {
                tracing::debug!(event = name, "Event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Optimistic appointment statuses built from events
#[derive(Debug, Default)]
pub struct AppointmentStatusStore {
    statuses: RwLock<HashMap<RecordId, AppointmentStatus>>,
}

impl AppointmentStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> HmsExportError {
        HmsExportError::Other("Appointment status store lock poisoned".to_string())
    }

    /// Fold one event into the table
    ///
    /// Arrival does not reopen an appointment that already reached a
    /// terminal status. A refresh forgets everything, since the next read
    /// from the backend is authoritative.
    pub fn apply(&self, event: &HmsEvent) -> Result<()> {
        let mut statuses = self.statuses.write().map_err(|_| Self::poisoned())?;
        match event {
            HmsEvent::RefreshTodayAppointments => statuses.clear(),
            HmsEvent::PatientStatusChanged {
                appointment_id,
                status,
            } => {
                statuses.insert(appointment_id.clone(), *status);
            }
            HmsEvent::PatientArrived { appointment_id } => {
                match statuses.get(appointment_id) {
                    Some(current) if current.is_terminal() => {
                        tracing::warn!(
                            appointment_id = %appointment_id,
                            status = %current,
                            "Ignoring arrival for a closed appointment"
                        );
                    }
                    _ => {
                        statuses.insert(appointment_id.clone(), AppointmentStatus::CheckedIn);
                    }
                }
            }
            HmsEvent::NewAppointmentBooked { appointment } => {
                statuses.insert(appointment.id.clone(), appointment.status);
            }
        }
        Ok(())
    }

    pub fn status_of(&self, id: &RecordId) -> Result<Option<AppointmentStatus>> {
        let statuses = self.statuses.read().map_err(|_| Self::poisoned())?;
        Ok(statuses.get(id).copied())
    }

    pub fn len(&self) -> usize {
        self.statuses.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite row statuses with the ones received through events
    ///
    /// Returns the number of rows changed.
    pub fn apply_to(&self, rows: &mut [AppointmentRow]) -> Result<usize> {
        let statuses = self.statuses.read().map_err(|_| Self::poisoned())?;
        let mut changed = 0;
        for row in rows.iter_mut() {
            if let Some(status) = statuses.get(&row.id) {
                if *status != row.status {
                    row.status = *status;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Consume events until the bus closes
    ///
    /// A subscriber that falls behind loses events; the table is cleared in
    /// that case, the same as on a refresh.
    pub async fn follow(&self, mut receiver: broadcast::Receiver<HmsEvent>) -> Result<()> {
        loop {
            match receiver.recv().await {
                Ok(event) => self.apply(&event)?,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Status store fell behind, clearing");
                    self.apply(&HmsEvent::RefreshTodayAppointments)?;
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            }
        }
    }
}

/// Read recorded events: a JSON array, or one event object per line
pub async fn read_event_log(path: &Path) -> Result<Vec<HmsEvent>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| HmsExportError::Io(format!("Failed to read {}: {e}", path.display())))?;

    if contents.trim_start().starts_with('[') {
        return serde_json::from_str(&contents).map_err(|e| {
            HmsExportError::Serialization(format!("{}: invalid event list: {e}", path.display()))
        });
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                HmsExportError::Serialization(format!(
                    "{}:{}: invalid event: {e}",
                    path.display(),
                    index + 1
                ))
            })
        })
        .collect()
}

/// Publish `events` in order on a fresh bus and fold them into a new store
pub async fn replay(events: Vec<HmsEvent>) -> Result<AppointmentStatusStore> {
    let bus = EventBus::new(events.len());
    let receiver = bus.subscribe();
    for event in events {
        bus.publish(event);
    }
    drop(bus);

    let store = AppointmentStatusStore::new();
    store.follow(receiver).await?;
    Ok(store)
}
