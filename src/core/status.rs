use std::str::FromStr;

/// Delivery status of a task notification record.
///
/// The orchestrator only ever produces `Pending`, `Sent` and `Failed`;
/// `Delivered` and `Read` are reserved for asynchronous provider delivery
/// callbacks that update the record out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    /// Record created, first send attempt not yet completed
    Pending,
    /// Accepted by the messaging provider
    Sent,
    /// Confirmed delivered to the recipient's device
    Delivered,
    /// Read receipt received
    Read,
    /// Send attempt failed; `error_message` holds the upstream reason
    Failed,
}

#[allow(clippy::to_string_trait_impl)]
impl ToString for NotificationStatus {
    /// Converts the status to the string stored in the `status` column
    fn to_string(&self) -> String {
        match self {
            NotificationStatus::Pending => "pending".to_string(),
            NotificationStatus::Sent => "sent".to_string(),
            NotificationStatus::Delivered => "delivered".to_string(),
            NotificationStatus::Read => "read".to_string(),
            NotificationStatus::Failed => "failed".to_string(),
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NotificationStatus::Pending),
            "sent" => Ok(NotificationStatus::Sent),
            "delivered" => Ok(NotificationStatus::Delivered),
            "read" => Ok(NotificationStatus::Read),
            "failed" => Ok(NotificationStatus::Failed),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_column_form() {
        for status in [
            NotificationStatus::Pending,
            NotificationStatus::Sent,
            NotificationStatus::Delivered,
            NotificationStatus::Read,
            NotificationStatus::Failed,
        ] {
            let stored = status.to_string();
            assert_eq!(stored.parse::<NotificationStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!("queued".parse::<NotificationStatus>().is_err());
    }
}
