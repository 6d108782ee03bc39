//! # Background Audit
//!
//! Periodically re-verifies the whole chain. Nothing in the node can modify
//! a committed block, so a failed audit points at memory corruption or a
//! bug, and is logged at `error`.

use std::time::Duration;

use tokio::task::JoinHandle;

use bookchain_ledger::Ledger;

use crate::metrics::{NodeMetrics, SharedMetrics};

/// Run one full-chain audit and record the outcome. Returns `true` if the
/// chain is intact.
pub fn run_audit(ledger: &Ledger, metrics: &NodeMetrics) -> bool {
    metrics.audits_total.inc();
    let (length, result) = ledger.with_chain(|c| (c.len(), c.verify()));
    metrics.chain_length.set(length as i64);

    match result {
        Ok(()) => {
            tracing::debug!(length, "chain audit passed");
            true
        }
        Err(v) => {
            metrics.audit_failures_total.inc();
            tracing::error!(
                index = v.index,
                position = v.position,
                kind = ?v.kind,
                length,
                "chain audit failed"
            );
            false
        }
    }
}

/// Spawn the audit loop. The first audit runs immediately.
pub fn spawn_audit(ledger: Ledger, metrics: SharedMetrics, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            run_audit(&ledger, &metrics);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookchain_ledger::{Chain, CheckoutEvent};
    use std::sync::Arc;

    #[test]
    fn audit_passes_on_intact_chain() {
        let ledger = Ledger::new();
        ledger
            .append(CheckoutEvent::new("B1", "alice", "2024-01-01"))
            .unwrap();
        let metrics = NodeMetrics::new();

        assert!(run_audit(&ledger, &metrics));
        assert_eq!(metrics.audits_total.get(), 1);
        assert_eq!(metrics.audit_failures_total.get(), 0);
        assert_eq!(metrics.chain_length.get(), 2);
    }

    #[test]
    fn audit_flags_tampered_chain() {
        let mut chain = Chain::bootstrap();
        chain
            .append(CheckoutEvent::new("B1", "alice", "2024-01-01"))
            .unwrap();
        let mut blocks = chain.blocks().to_vec();
        blocks[1].created_at = "1999-12-31T23:59:59.000000000Z".into();
        let ledger = Ledger::from_chain(Chain::from_blocks(blocks).unwrap());
        let metrics = NodeMetrics::new();

        assert!(!run_audit(&ledger, &metrics));
        assert_eq!(metrics.audit_failures_total.get(), 1);
    }

    #[tokio::test]
    async fn spawned_audit_runs_immediately() {
        let metrics = Arc::new(NodeMetrics::new());
        let handle = spawn_audit(Ledger::new(), Arc::clone(&metrics), Duration::from_secs(3600));

        for _ in 0..100 {
            if metrics.audits_total.get() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert_eq!(metrics.audits_total.get(), 1);
    }
}
