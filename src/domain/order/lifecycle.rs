use super::errors::OrderError;
use super::value_objects::OrderId;

// ============================================================================
// Order Lifecycle - State Machine
// ============================================================================
//
//   Open --AddItems--> Open
//   Open --MarkDone--> Done
//   Done --AddItems--> rejected (AlreadyDone)
//   Done --MarkDone--> rejected (AlreadyDone)
//
// Done is terminal. Absent orders never reach this code: the store reports
// NotFound before a status exists to apply a command to.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderCommand {
    AddItems,
    MarkDone,
}

impl OrderStatus {
    pub fn from_done(done: bool) -> Self {
        if done {
            OrderStatus::Done
        } else {
            OrderStatus::Open
        }
    }

    pub fn is_done(self) -> bool {
        self == OrderStatus::Done
    }

    /// Decide the next status for `command`, or reject it.
    pub fn apply(self, order_id: &OrderId, command: OrderCommand) -> Result<OrderStatus, OrderError> {
        match (self, command) {
            (OrderStatus::Open, OrderCommand::AddItems) => Ok(OrderStatus::Open),
            (OrderStatus::Open, OrderCommand::MarkDone) => Ok(OrderStatus::Done),
            (OrderStatus::Done, _) => Err(OrderError::AlreadyDone {
                order_id: order_id.clone(),
            }),
        }
    }
}

/// Completion filter for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoneFilter {
    #[default]
    All,
    Only(bool),
}

impl DoneFilter {
    /// Parse the `done` query value: absent or empty lists everything,
    /// `1` lists done orders, `0` lists open ones.
    pub fn parse(raw: Option<&str>) -> Result<Self, OrderError> {
        match raw {
            None | Some("") => Ok(DoneFilter::All),
            Some("1") => Ok(DoneFilter::Only(true)),
            Some("0") => Ok(DoneFilter::Only(false)),
            Some(_) => Err(OrderError::Validation(
                "'done' query is an invalid value".to_string(),
            )),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
