//! Randomized operation sequences checked against the ledger invariants.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use proptest::prelude::*;

use ledgerd_common::{AccountKey, Amount, DeliverableId, ManualClock, SignerKey};

use crate::{Deliverable, Ledger, LedgerConfig};

const LOCK: Duration = Duration::from_secs(100);

#[derive(Debug, Clone)]
enum Op {
    Create(u8, u8, u32),
    Delete(u8, u8),
    Deposit(u8, u8, u32),
    RequestRefund(u8, u8, u32),
    ProcessRefunds(u8, u8, Vec<u8>),
    Advance(u16),
    Acknowledge(u8, u8),
    AddDeliverable(u8, u8, u8),
}

fn op() -> impl Strategy<Value = Op> {
    let user = 0u8..3;
    let provider = 0u8..2;
    prop_oneof![
        (user.clone(), provider.clone(), 0u32..1_000).prop_map(|(u, p, a)| Op::Create(u, p, a)),
        (user.clone(), provider.clone()).prop_map(|(u, p)| Op::Delete(u, p)),
        (user.clone(), provider.clone(), 0u32..1_000).prop_map(|(u, p, a)| Op::Deposit(u, p, a)),
        (user.clone(), provider.clone(), 0u32..600)
            .prop_map(|(u, p, a)| Op::RequestRefund(u, p, a)),
        (user.clone(), provider.clone(), prop::collection::vec(0u8..6, 0..4))
            .prop_map(|(u, p, i)| Op::ProcessRefunds(u, p, i)),
        (0u16..150).prop_map(Op::Advance),
        (user.clone(), provider.clone()).prop_map(|(u, p)| Op::Acknowledge(u, p)),
        (user, provider, 0u8..4).prop_map(|(u, p, d)| Op::AddDeliverable(u, p, d)),
    ]
}

fn key(user: u8, provider: u8) -> AccountKey {
    AccountKey::new(format!("user-{user}"), format!("provider-{provider}"))
}

proptest! {
    #[test]
    fn test_invariants_hold_for_any_sequence(ops in prop::collection::vec(op(), 1..60)) {
        let start = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let mut ledger = Ledger::new(LedgerConfig::default(), clock.clone());
        let mut order: Vec<AccountKey> = Vec::new();
        let signer = SignerKey::new([1u8; 32], [2u8; 32]);

        for op in ops {
            match op {
                Op::Create(u, p, amount) => {
                    let k = key(u, p);
                    let existed = order.contains(&k);
                    let result = ledger.create(&k, signer, Amount::from(amount as u64), "");
                    prop_assert_eq!(result.is_ok(), !existed);
                    if !existed {
                        order.push(k);
                    }
                }
                Op::Delete(u, p) => {
                    let k = key(u, p);
                    if ledger.delete(&k).is_ok() {
                        order.retain(|x| x != &k);
                        prop_assert!(ledger.get(&k).is_err());
                    }
                }
                Op::Deposit(u, p, amount) => {
                    let _ = ledger.deposit(&key(u, p), Amount::from(amount as u64));
                }
                Op::RequestRefund(u, p, amount) => {
                    let k = key(u, p);
                    let next = ledger.get(&k).map(|a| a.next_refund_index()).ok();
                    if let Ok(index) = ledger.request_refund(&k, Amount::from(amount as u64)) {
                        prop_assert_eq!(Some(index), next);
                    }
                }
                Op::ProcessRefunds(u, p, indices) => {
                    let k = key(u, p);
                    let before = ledger.get(&k).ok().cloned();
                    let indices: Vec<u64> = indices.into_iter().map(u64::from).collect();
                    if ledger.process_refunds(&k, &indices, LOCK).is_err() {
                        prop_assert_eq!(ledger.get(&k).ok().cloned(), before);
                    }
                }
                Op::Advance(secs) => clock.advance(Duration::from_secs(secs as u64)),
                Op::Acknowledge(u, p) => {
                    let _ = ledger.update_acknowledge(&key(u, p), "ack");
                }
                Op::AddDeliverable(u, p, d) => {
                    let k = key(u, p);
                    let id = DeliverableId::from_label(&format!("d-{d}"));
                    let before = ledger.get(&k).map(|a| a.deliverables.len()).ok();
                    let result = ledger.add_deliverable(&k, Deliverable::new(id, vec![d]));
                    let after = ledger.get(&k).map(|a| a.deliverables.len()).ok();
                    if result.is_err() {
                        prop_assert_eq!(before, after);
                    }
                }
            }

            prop_assert!(ledger.verify_integrity().is_ok());
            let keys: Vec<AccountKey> = ledger.list_all().map(|a| a.key()).collect();
            prop_assert_eq!(&keys, &order);
            for account in ledger.list_all() {
                prop_assert!(account.balance >= account.pending_refund);
            }
        }
    }
}
