//! Protocol message types.
//!
//! These types represent the requests a caller sends to the ledger and the
//! responses it gets back.

use ledgerd_common::{AccountKey, Amount, LedgerError, ProviderId, SignerKey, Timestamp, UserId};
use ledgerd_ledger::{Account, AccountBalance, Deliverable, LedgerEvent, Refund, RefundSettlement};
use serde::{Deserialize, Serialize};

/// A request for one ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerRequest {
    /// Open an account.
    Create {
        key: AccountKey,
        signer: SignerKey,
        initial_amount: Amount,
        additional_info: String,
    },
    /// Read one account.
    Get { key: AccountKey },
    /// Check account existence.
    Exists { key: AccountKey },
    /// Read every account in creation order.
    ListAll,
    /// Read the accounts of one user.
    ListByUser { user: UserId },
    /// Read the accounts held with one provider.
    ListByProvider { provider: ProviderId },
    /// Remove an account.
    Delete { key: AccountKey },
    /// Credit an account.
    Deposit { key: AccountKey, amount: Amount },
    /// Reserve funds for a refund.
    RequestRefund { key: AccountKey, amount: Amount },
    /// Pay out a batch of refunds. Without a lock the ledger default applies.
    ProcessRefunds {
        key: AccountKey,
        indices: Vec<u64>,
        lock_duration_secs: Option<u64>,
    },
    /// Read one refund.
    GetRefund { key: AccountKey, index: u64 },
    /// Replace the provider acknowledgment.
    UpdateAcknowledge { key: AccountKey, acknowledge: String },
    /// Attach a deliverable.
    AddDeliverable {
        key: AccountKey,
        deliverable: Deliverable,
    },
    /// Read journal events after a sequence number.
    EventsSince { sequence: u64 },
}

impl LedgerRequest {
    /// Operation name for logging.
    pub fn operation(&self) -> &'static str {
        match self {
            LedgerRequest::Create { .. } => "create",
            LedgerRequest::Get { .. } => "get",
            LedgerRequest::Exists { .. } => "exists",
            LedgerRequest::ListAll => "list_all",
            LedgerRequest::ListByUser { .. } => "list_by_user",
            LedgerRequest::ListByProvider { .. } => "list_by_provider",
            LedgerRequest::Delete { .. } => "delete",
            LedgerRequest::Deposit { .. } => "deposit",
            LedgerRequest::RequestRefund { .. } => "request_refund",
            LedgerRequest::ProcessRefunds { .. } => "process_refunds",
            LedgerRequest::GetRefund { .. } => "get_refund",
            LedgerRequest::UpdateAcknowledge { .. } => "update_acknowledge",
            LedgerRequest::AddDeliverable { .. } => "add_deliverable",
            LedgerRequest::EventsSince { .. } => "events_since",
        }
    }
}

/// Successful result of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePayload {
    Balance(AccountBalance),
    Account(Account),
    Accounts(Vec<Account>),
    Exists(bool),
    RefundIndex(u64),
    Settlement(RefundSettlement),
    Refund(Refund),
    Events(Vec<LedgerEvent>),
    Done,
}

/// Error kinds, one per ledger error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AccountNotExists,
    AccountExists,
    InsufficientBalance,
    RefundInvalid,
    RefundProcessed,
    RefundLocked,
    DuplicateDeliverable,
    ArithmeticViolation,
    BatchTooLarge,
    LockTooLong,
}

impl ErrorCode {
    /// Code for a ledger error.
    pub fn of(err: &LedgerError) -> Self {
        match err {
            LedgerError::AccountNotExists(_) => ErrorCode::AccountNotExists,
            LedgerError::AccountExists(_) => ErrorCode::AccountExists,
            LedgerError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            LedgerError::RefundInvalid { .. } => ErrorCode::RefundInvalid,
            LedgerError::RefundProcessed { .. } => ErrorCode::RefundProcessed,
            LedgerError::RefundLocked { .. } => ErrorCode::RefundLocked,
            LedgerError::DuplicateDeliverable { .. } => ErrorCode::DuplicateDeliverable,
            LedgerError::ArithmeticViolation { .. } => ErrorCode::ArithmeticViolation,
            LedgerError::BatchTooLarge { .. } => ErrorCode::BatchTooLarge,
            LedgerError::LockTooLong { .. } => ErrorCode::LockTooLong,
        }
    }
}

/// Error details carried in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error kind.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Account the error refers to.
    pub key: Option<AccountKey>,
    /// Earliest time a retry can succeed.
    pub retry_at: Option<Timestamp>,
}

impl From<&LedgerError> for ErrorBody {
    fn from(err: &LedgerError) -> Self {
        Self {
            code: ErrorCode::of(err),
            message: err.to_string(),
            key: err.account_key().cloned(),
            retry_at: err.retry_at(),
        }
    }
}

/// Response to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerResponse {
    Ok(ResponsePayload),
    Error(ErrorBody),
}

impl LedgerResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, LedgerResponse::Ok(_))
    }

    /// Error code, if this is an error response.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            LedgerResponse::Ok(_) => None,
            LedgerResponse::Error(body) => Some(body.code),
        }
    }
}

impl<T: Into<ResponsePayload>> From<ledgerd_common::Result<T>> for LedgerResponse {
    fn from(result: ledgerd_common::Result<T>) -> Self {
        match result {
            Ok(value) => LedgerResponse::Ok(value.into()),
            Err(err) => LedgerResponse::Error(ErrorBody::from(&err)),
        }
    }
}

impl From<AccountBalance> for ResponsePayload {
    fn from(balance: AccountBalance) -> Self {
        ResponsePayload::Balance(balance)
    }
}

impl From<Account> for ResponsePayload {
    fn from(account: Account) -> Self {
        ResponsePayload::Account(account)
    }
}

impl From<RefundSettlement> for ResponsePayload {
    fn from(settlement: RefundSettlement) -> Self {
        ResponsePayload::Settlement(settlement)
    }
}

impl From<Refund> for ResponsePayload {
    fn from(refund: Refund) -> Self {
        ResponsePayload::Refund(refund)
    }
}

impl From<u64> for ResponsePayload {
    fn from(index: u64) -> Self {
        ResponsePayload::RefundIndex(index)
    }
}

impl From<()> for ResponsePayload {
    fn from(_: ()) -> Self {
        ResponsePayload::Done
    }
}
