//! FRK ledger business logic.
//!
//! The ledger is an ordered sequence of stock movements per [`Scope`]. Each row
//! stores the running balance after itself (`remaining_kgs`), which must equal
//! the prefix sum of `credited_kgs - debited_kgs` over rows ordered by
//! (`date`, `id`).
//!
//! Balances are maintained incrementally rather than recomputed:
//!
//! - a new movement takes the balance of the current latest row, ordered by
//!   (`date` desc, `id` desc), as its prior value. A back-dated movement
//!   therefore does not ripple forward into rows dated after it;
//! - deleting a movement shifts every later row *by id* in the same scope by
//!   the reverse of the deleted row's net effect. This is only correct while id
//!   order matches date order.
//!
//! [`audit`] replays the prefix sum and reports every row where the stored
//! balance has drifted from it.

use super::{Scope, begin_transaction, finish_transaction};
use crate::{
    entities::{FrkMovement, frk_movement},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Stored and replayed balances closer than this are considered equal.
const BALANCE_TOLERANCE: f64 = 1e-6;

/// A validated stock movement: exactly one side is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementKind {
    /// KGs received into stock
    Credit(f64),
    /// KGs consumed from stock
    Debit(f64),
}

impl MovementKind {
    /// Validates raw credit/debit quantities.
    ///
    /// Exactly one of the two must be a positive finite number; the other must
    /// be zero or absent.
    pub fn from_quantities(credited: Option<f64>, debited: Option<f64>) -> Result<Self> {
        let credited = credited.unwrap_or(0.0);
        let debited = debited.unwrap_or(0.0);

        if !credited.is_finite() || !debited.is_finite() || credited < 0.0 || debited < 0.0 {
            return Err(Error::validation(
                "FRK quantities must be non-negative numbers",
            ));
        }

        match (credited > 0.0, debited > 0.0) {
            (true, false) => Ok(Self::Credit(credited)),
            (false, true) => Ok(Self::Debit(debited)),
            _ => Err(Error::validation(
                "Invalid FRK entry. Either credited or debited KGs should be greater than zero.",
            )),
        }
    }

    /// KGs credited by this movement.
    #[must_use]
    pub const fn credited(self) -> f64 {
        match self {
            Self::Credit(kgs) => kgs,
            Self::Debit(_) => 0.0,
        }
    }

    /// KGs debited by this movement.
    #[must_use]
    pub const fn debited(self) -> f64 {
        match self {
            Self::Credit(_) => 0.0,
            Self::Debit(kgs) => kgs,
        }
    }

    /// Net effect on the running balance.
    #[must_use]
    pub fn net(self) -> f64 {
        self.credited() - self.debited()
    }
}

/// Records a credit or debit movement and returns the stored row.
///
/// Validation happens before any database access, so a rejected movement
/// never touches stored state. The lookup of the prior balance and the insert
/// run in one transaction.
#[instrument(skip(db))]
pub async fn record_movement<C>(
    db: &C,
    scope: &Scope,
    date: NaiveDate,
    credited_kgs: Option<f64>,
    debited_kgs: Option<f64>,
) -> Result<frk_movement::Model>
where
    C: TransactionTrait,
{
    let kind = MovementKind::from_quantities(credited_kgs, debited_kgs)?;

    let txn = begin_transaction(db).await?;
    let outcome = append_movement(&txn, scope, date, kind, None).await;
    finish_transaction(txn, outcome).await
}

/// Appends a movement using the latest row of the scope as the prior balance.
///
/// Callers own the surrounding transaction.
pub(crate) async fn append_movement<C>(
    conn: &C,
    scope: &Scope,
    date: NaiveDate,
    kind: MovementKind,
    rice_entry_id: Option<i64>,
) -> Result<frk_movement::Model>
where
    C: ConnectionTrait,
{
    let prior = latest_movement(conn, scope)
        .await?
        .map_or(0.0, |latest| latest.remaining_kgs);
    let remaining = prior + kind.net();

    let movement = frk_movement::ActiveModel {
        date: Set(date),
        company: Set(scope.company.clone()),
        year: Set(scope.year),
        credited_kgs: Set(kind.credited()),
        debited_kgs: Set(kind.debited()),
        remaining_kgs: Set(remaining),
        progressive_kgs: Set(0.0),
        rice_entry_id: Set(rice_entry_id),
        ..Default::default()
    };
    let stored = movement.insert(conn).await?;

    info!(
        "Recorded FRK movement {} for {} on {}: {:?}, balance {:.3} -> {:.3}",
        stored.id, scope, date, kind, prior, remaining
    );
    Ok(stored)
}

/// Debits the FRK used by a dispatch against the scope's ledger.
///
/// Returns `None` when the dispatch carries no FRK, since a zero movement
/// would violate the one-positive-side rule. Every call appends a new row,
/// including repeated calls for the same rice entry.
pub(crate) async fn debit_for_dispatch<C>(
    conn: &C,
    scope: &Scope,
    advice_date: NaiveDate,
    frk_kgs: f64,
    rice_entry_id: i64,
) -> Result<Option<frk_movement::Model>>
where
    C: ConnectionTrait,
{
    if frk_kgs == 0.0 {
        debug!(
            "Rice entry {} carries no FRK; no ledger movement for {}",
            rice_entry_id, scope
        );
        return Ok(None);
    }

    let kind = MovementKind::from_quantities(None, Some(frk_kgs))?;
    append_movement(conn, scope, advice_date, kind, Some(rice_entry_id))
        .await
        .map(Some)
}

/// Latest movement of the scope by (date desc, id desc).
pub async fn latest_movement<C>(conn: &C, scope: &Scope) -> Result<Option<frk_movement::Model>>
where
    C: ConnectionTrait,
{
    FrkMovement::find()
        .filter(frk_movement::Column::Company.eq(scope.company.as_str()))
        .filter(frk_movement::Column::Year.eq(scope.year))
        .order_by_desc(frk_movement::Column::Date)
        .order_by_desc(frk_movement::Column::Id)
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Lists all movements of the scope in insertion order.
///
/// Consumers that need chronological order must sort by (`date`, `id`).
pub async fn list_movements<C>(db: &C, scope: &Scope) -> Result<Vec<frk_movement::Model>>
where
    C: ConnectionTrait,
{
    let movements = FrkMovement::find()
        .filter(frk_movement::Column::Company.eq(scope.company.as_str()))
        .filter(frk_movement::Column::Year.eq(scope.year))
        .order_by_asc(frk_movement::Column::Id)
        .all(db)
        .await?;
    debug!("Fetched {} FRK movements for {}", movements.len(), scope);
    Ok(movements)
}

/// Deletes a movement and shifts the balance of every later row (by id) in the scope.
///
/// Returns the deleted row.
#[instrument(skip(db))]
pub async fn delete_movement<C>(db: &C, id: i64, scope: &Scope) -> Result<frk_movement::Model>
where
    C: TransactionTrait,
{
    let txn = begin_transaction(db).await?;
    let outcome = remove_and_shift(&txn, id, scope).await;
    finish_transaction(txn, outcome).await
}

async fn remove_and_shift<C>(conn: &C, id: i64, scope: &Scope) -> Result<frk_movement::Model>
where
    C: ConnectionTrait,
{
    let movement = FrkMovement::find_by_id(id)
        .filter(frk_movement::Column::Company.eq(scope.company.as_str()))
        .filter(frk_movement::Column::Year.eq(scope.year))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found(format!("FRK movement {id} not found for {scope}")))?;

    FrkMovement::delete_by_id(id).exec(conn).await?;

    let net = movement.net_kgs();
    let shifted = FrkMovement::update_many()
        .col_expr(
            frk_movement::Column::RemainingKgs,
            Expr::col(frk_movement::Column::RemainingKgs).sub(net),
        )
        .filter(frk_movement::Column::Id.gt(id))
        .filter(frk_movement::Column::Company.eq(scope.company.as_str()))
        .filter(frk_movement::Column::Year.eq(scope.year))
        .exec(conn)
        .await?;

    info!(
        "Deleted FRK movement {} for {}; shifted {} later rows by {:.3}",
        id, scope, shifted.rows_affected, -net
    );
    Ok(movement)
}

/// One row whose stored balance disagrees with the replayed prefix sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceDiscrepancy {
    /// Movement id
    pub id: i64,
    /// Movement date
    pub date: NaiveDate,
    /// Balance stored on the row
    pub stored_kgs: f64,
    /// Balance obtained by replaying the ledger in (date, id) order
    pub expected_kgs: f64,
}

/// Result of replaying a scope's ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerAudit {
    /// Scope that was audited
    pub scope: Scope,
    /// Number of movements replayed
    pub movement_count: usize,
    /// Replayed balance after the last movement
    pub closing_kgs: f64,
    /// Rows whose stored balance has drifted
    pub discrepancies: Vec<BalanceDiscrepancy>,
}

impl LedgerAudit {
    /// Whether every stored balance matches the replayed prefix sum.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

fn chronological(movements: &[frk_movement::Model]) -> Vec<&frk_movement::Model> {
    let mut ordered: Vec<&frk_movement::Model> = movements.iter().collect();
    ordered.sort_by_key(|m| (m.date, m.id));
    ordered
}

/// Replays movements in (date, id) order and returns `(id, expected balance)` pairs.
#[must_use]
pub fn replay_balances(movements: &[frk_movement::Model]) -> Vec<(i64, f64)> {
    let mut running = 0.0;
    chronological(movements)
        .into_iter()
        .map(|m| {
            running += m.net_kgs();
            (m.id, running)
        })
        .collect()
}

/// Replays the scope's ledger and reports rows whose stored balance has drifted.
pub async fn audit<C>(db: &C, scope: &Scope) -> Result<LedgerAudit>
where
    C: ConnectionTrait,
{
    let movements = list_movements(db, scope).await?;

    let mut running = 0.0;
    let discrepancies: Vec<BalanceDiscrepancy> = chronological(&movements)
        .into_iter()
        .filter_map(|row| {
            running += row.net_kgs();
            ((row.remaining_kgs - running).abs() > BALANCE_TOLERANCE).then(|| BalanceDiscrepancy {
                id: row.id,
                date: row.date,
                stored_kgs: row.remaining_kgs,
                expected_kgs: running,
            })
        })
        .collect();

    if !discrepancies.is_empty() {
        warn!(
            "FRK ledger for {} has {} drifted balances",
            scope,
            discrepancies.len()
        );
    }

    Ok(LedgerAudit {
        scope: scope.clone(),
        movement_count: movements.len(),
        closing_kgs: running,
        discrepancies,
    })
}
