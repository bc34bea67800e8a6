//! Request dispatch onto a shared ledger.

use std::time::Duration;

use tracing::debug;

use ledgerd_ledger::SharedLedger;

use crate::messages::{LedgerRequest, LedgerResponse, ResponsePayload};

/// Execute one request and encode its outcome.
///
/// Errors come back as [`LedgerResponse::Error`] with their own code; none
/// are merged into a generic failure.
pub fn dispatch(ledger: &SharedLedger, request: LedgerRequest) -> LedgerResponse {
    let operation = request.operation();
    let response: LedgerResponse = match request {
        LedgerRequest::Create {
            key,
            signer,
            initial_amount,
            additional_info,
        } => ledger
            .create(&key, signer, initial_amount, additional_info)
            .into(),
        LedgerRequest::Get { key } => ledger.get(&key).into(),
        LedgerRequest::Exists { key } => {
            LedgerResponse::Ok(ResponsePayload::Exists(ledger.exists(&key)))
        }
        LedgerRequest::ListAll => LedgerResponse::Ok(ResponsePayload::Accounts(ledger.list_all())),
        LedgerRequest::ListByUser { user } => {
            let accounts =
                ledger.read(|l| l.accounts_by_user(&user).cloned().collect::<Vec<_>>());
            LedgerResponse::Ok(ResponsePayload::Accounts(accounts))
        }
        LedgerRequest::ListByProvider { provider } => {
            let accounts = ledger.read(|l| {
                l.accounts_by_provider(&provider)
                    .cloned()
                    .collect::<Vec<_>>()
            });
            LedgerResponse::Ok(ResponsePayload::Accounts(accounts))
        }
        LedgerRequest::Delete { key } => ledger.delete(&key).into(),
        LedgerRequest::Deposit { key, amount } => ledger.deposit(&key, amount).into(),
        LedgerRequest::RequestRefund { key, amount } => ledger.request_refund(&key, amount).into(),
        LedgerRequest::ProcessRefunds {
            key,
            indices,
            lock_duration_secs,
        } => match lock_duration_secs {
            Some(secs) => ledger
                .process_refunds(&key, &indices, Duration::from_secs(secs))
                .into(),
            None => ledger.process_refunds_default(&key, &indices).into(),
        },
        LedgerRequest::GetRefund { key, index } => ledger
            .read(|l| l.get_refund(&key, index).cloned())
            .into(),
        LedgerRequest::UpdateAcknowledge { key, acknowledge } => {
            ledger.update_acknowledge(&key, acknowledge).into()
        }
        LedgerRequest::AddDeliverable { key, deliverable } => {
            ledger.add_deliverable(&key, deliverable).into()
        }
        LedgerRequest::EventsSince { sequence } => {
            LedgerResponse::Ok(ResponsePayload::Events(ledger.events_since(sequence)))
        }
    };

    debug!(
        operation,
        ok = response.is_ok(),
        code = ?response.error_code(),
        "Request dispatched"
    );

    response
}

/// Decode a JSON request, execute it and encode the JSON response.
pub fn dispatch_json(ledger: &SharedLedger, request: &str) -> serde_json::Result<String> {
    let request: LedgerRequest = serde_json::from_str(request)?;
    serde_json::to_string(&dispatch(ledger, request))
}
