use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Handle for publishing domain events from services and commands.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// The events that can occur around the stock ledger. Emitted after the owning
// transaction has committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StockItemCreated(Uuid),
    StockItemDeleted(Uuid),
    StockIssued {
        issuance_id: Uuid,
        stock_item_id: Uuid,
        order_id: Option<Uuid>,
        quantity: i32,
        new_quantity: i32,
    },
    IssuanceReturned {
        issuance_id: Uuid,
        stock_item_id: Uuid,
        quantity: i32,
        new_quantity: i32,
    },
    StockRestocked {
        stock_item_id: Uuid,
        quantity: i32,
        new_quantity: i32,
    },
    StockAdjusted {
        stock_item_id: Uuid,
        previous_quantity: i32,
        new_quantity: i32,
    },
}

/// Drains the event channel and logs each event. Downstream consumers
/// (dashboard refresh, notifications) subscribe here.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::StockIssued {
                issuance_id,
                stock_item_id,
                quantity,
                new_quantity,
                ..
            } => {
                info!(
                    issuance_id = %issuance_id,
                    stock_item_id = %stock_item_id,
                    quantity = %quantity,
                    new_quantity = %new_quantity,
                    "stock issued"
                );
            }
            Event::IssuanceReturned {
                issuance_id,
                stock_item_id,
                quantity,
                new_quantity,
            } => {
                info!(
                    issuance_id = %issuance_id,
                    stock_item_id = %stock_item_id,
                    quantity = %quantity,
                    new_quantity = %new_quantity,
                    "issuance returned"
                );
            }
            other => info!(event = ?other, "stock event"),
        }
    }

    info!("Event channel closed, stopping event processing loop");
}
