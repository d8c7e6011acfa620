/// Batch reconcile - convert off-ledger point totals into tokens in one atomic step
/// Two phases: every entry is staged against a copy of the affected balances
/// and supply, and only a fully valid batch is committed.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::constants::MAX_BATCH_SIZE;
use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::state::LedgerState;
use crate::types::{Address, Amount, Context, Role};

use super::{require_nonzero_address, require_role, require_role_or_admin};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub users_reconciled: usize,
    pub total_points: Amount,
    pub total_tokens: Amount,
}

struct StagedEntry {
    user: Address,
    points: Amount,
    tokens: Amount,
}

pub fn handler(
    state: &mut LedgerState,
    ctx: &Context,
    users: &[Address],
    points: &[Amount],
) -> Result<BatchSummary> {
    require_role(state, &ctx.caller, Role::Backend)?;
    require!(
        users.len() == points.len(),
        LedgerError::ArrayLengthMismatch {
            left: users.len(),
            right: points.len(),
        }
    );
    require!(!users.is_empty(), LedgerError::EmptyBatch);
    require!(
        users.len() <= MAX_BATCH_SIZE,
        LedgerError::BatchTooLarge {
            len: users.len(),
            max: MAX_BATCH_SIZE,
        }
    );

    let engine = state.config.engine;
    require_role_or_admin(state, &engine, Role::Minter)?;

    let rate = state.config.redemption_rate;
    require!(
        rate > 0,
        LedgerError::InvalidAmount("redemption rate must be positive".to_string())
    );

    // Phase 1: stage
    let mut staged_balances: BTreeMap<Address, Amount> = BTreeMap::new();
    let mut staged_supply = state.token.total_supply();
    let mut entries = Vec::with_capacity(users.len());
    let mut summary = BatchSummary::default();

    for (&user, &user_points) in users.iter().zip(points) {
        require_nonzero_address(&user)?;
        let tokens = user_points / rate;

        let balance = *staged_balances
            .entry(user)
            .or_insert_with(|| state.token.balance_of(&user));
        let next_balance = balance
            .checked_add(tokens)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        staged_balances.insert(user, next_balance);
        staged_supply = staged_supply
            .checked_add(tokens)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        summary.users_reconciled += 1;
        summary.total_points = summary
            .total_points
            .checked_add(user_points)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        summary.total_tokens += tokens;

        entries.push(StagedEntry {
            user,
            points: user_points,
            tokens,
        });
    }

    // Phase 2: commit
    for entry in &entries {
        if entry.tokens > 0 {
            state.token.credit(&entry.user, entry.tokens)?;
            state.events.emit(
                ctx.timestamp,
                LedgerEvent::Transfer {
                    from: Address::ZERO,
                    to: entry.user,
                    value: entry.tokens,
                },
            );
        }
        state.events.emit(
            ctx.timestamp,
            LedgerEvent::PointsReconciled {
                user: entry.user,
                points: entry.points,
                tokens: entry.tokens,
            },
        );
    }

    state.events.emit(
        ctx.timestamp,
        LedgerEvent::BatchReconciled {
            users: summary.users_reconciled,
            total_points: summary.total_points,
            total_tokens: summary.total_tokens,
        },
    );

    info!("Batch reconciled");
    info!("Users: {}", summary.users_reconciled);
    info!(
        "Points: {}, tokens: {} (rate {})",
        summary.total_points, summary.total_tokens, rate
    );

    Ok(summary)
}
