use super::{LeaveRecord, OvertimeSlot, ProxyRequest, SlotTarget};

/// Something that happened to a leave record after it was persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveEvent {
    LeaveCreated(LeaveRecord),
    OvertimeAssigned {
        record: LeaveRecord,
        target: SlotTarget,
        slot: OvertimeSlot,
    },
    OvertimeConfirmed {
        record: LeaveRecord,
        target: SlotTarget,
        slot: OvertimeSlot,
    },
    OvertimeCleared {
        record: LeaveRecord,
        removed: Vec<OvertimeSlot>,
    },
    LeaveCancelled {
        record: LeaveRecord,
        cancelled_by: Option<ProxyRequest>,
    },
}

impl LeaveEvent {
    pub fn record(&self) -> &LeaveRecord {
        match self {
            LeaveEvent::LeaveCreated(record)
            | LeaveEvent::OvertimeAssigned { record, .. }
            | LeaveEvent::OvertimeConfirmed { record, .. }
            | LeaveEvent::OvertimeCleared { record, .. }
            | LeaveEvent::LeaveCancelled { record, .. } => record,
        }
    }
}
