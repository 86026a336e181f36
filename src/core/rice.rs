//! Rice entry business logic and dispatch-linked FRK debits.
//!
//! Creating or updating a rice entry that carries an advice date debits the
//! entry's FRK quantity from the ledger of the same [`Scope`]. The entry write
//! and the debit share one transaction.
//!
//! An update with an advice date appends another debit even if an earlier
//! create or update already debited the same entry. Each such movement records
//! the originating `rice_entry_id`, so repeated debits stay visible in the
//! ledger and its audit.

use super::{Scope, begin_transaction, finish_transaction, frk, require_non_negative, require_text};
use crate::{
    entities::{RiceEntry, Variety, frk_movement, rice_entry},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Every rice entry field except the challan number and scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiceDetails {
    /// Truck memo date
    pub date: NaiveDate,
    /// Dispatching godown
    pub godown: String,
    /// Lorry registration number
    #[serde(alias = "lorryNo")]
    pub lorry_number: String,
    /// Rice variety
    pub variety: Variety,
    /// Bags in ONB condition
    #[serde(default, alias = "onbBags", deserialize_with = "super::input::or_default")]
    pub onb_bags: i32,
    /// Bags in SS condition
    #[serde(default, alias = "ssBags", deserialize_with = "super::input::or_default")]
    pub ss_bags: i32,
    /// Bags in SWP condition
    #[serde(default, alias = "swpBags", deserialize_with = "super::input::or_default")]
    pub swp_bags: i32,
    /// Net weight in tons/KGs
    #[serde(default, alias = "tonsKgs", deserialize_with = "super::input::or_default")]
    pub net_weight: f64,
    /// Moisture percentage
    #[serde(default, deserialize_with = "super::input::or_default")]
    pub moisture: f64,
    /// Acceptance advice number
    #[serde(default, alias = "adNumber")]
    pub advice_number: Option<String>,
    /// Acceptance advice date; triggers an FRK debit
    #[serde(default, alias = "adDate", deserialize_with = "super::input::optional")]
    pub advice_date: Option<NaiveDate>,
    /// FRK KGs blended into this dispatch
    #[serde(default, alias = "frk", deserialize_with = "super::input::or_default")]
    pub frk_kgs: f64,
}

impl RiceDetails {
    fn validate(&self) -> Result<()> {
        require_text(&self.godown, "godown")?;
        require_text(&self.lorry_number, "lorry_number")?;
        require_non_negative(self.net_weight, "net_weight")?;
        require_non_negative(self.moisture, "moisture")?;
        require_non_negative(self.frk_kgs, "frk_kgs")?;
        if [self.onb_bags, self.ss_bags, self.swp_bags]
            .iter()
            .any(|bags| *bags < 0)
        {
            return Err(Error::validation("bag counts cannot be negative"));
        }
        Ok(())
    }

    fn advice_number(&self) -> Option<String> {
        self.advice_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
            .map(str::to_string)
    }
}

/// A stored rice entry together with the FRK debit its write produced, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    /// The stored rice entry
    pub entry: rice_entry::Model,
    /// FRK movement debited for this dispatch
    pub frk_movement: Option<frk_movement::Model>,
}

/// Creates a rice entry and, when it carries an advice date, debits its FRK.
///
/// Fails with `Error::Conflict` if the challan number is already used in the scope.
#[instrument(skip(db, details))]
pub async fn create_rice_entry<C>(
    db: &C,
    scope: &Scope,
    challan_number: &str,
    details: RiceDetails,
) -> Result<DispatchOutcome>
where
    C: TransactionTrait,
{
    let challan_number = challan_number.trim();
    require_text(challan_number, "challan_number")?;
    details.validate()?;

    let txn = begin_transaction(db).await?;
    let outcome = insert_with_debit(&txn, scope, challan_number, details).await;
    finish_transaction(txn, outcome).await
}

async fn insert_with_debit<C>(
    conn: &C,
    scope: &Scope,
    challan_number: &str,
    details: RiceDetails,
) -> Result<DispatchOutcome>
where
    C: ConnectionTrait,
{
    let conflict_message =
        format!("Challan number {challan_number} already exists for {scope}");
    let duplicates = RiceEntry::find()
        .filter(rice_entry::Column::ChallanNumber.eq(challan_number))
        .filter(rice_entry::Column::Company.eq(scope.company.as_str()))
        .filter(rice_entry::Column::Year.eq(scope.year))
        .count(conn)
        .await?;
    if duplicates > 0 {
        return Err(Error::conflict(conflict_message));
    }

    let entry = rice_entry::ActiveModel {
        date: Set(details.date),
        godown: Set(details.godown.trim().to_string()),
        challan_number: Set(challan_number.to_string()),
        lorry_number: Set(details.lorry_number.trim().to_string()),
        variety: Set(details.variety),
        onb_bags: Set(details.onb_bags),
        ss_bags: Set(details.ss_bags),
        swp_bags: Set(details.swp_bags),
        net_weight: Set(details.net_weight),
        moisture: Set(details.moisture),
        advice_number: Set(details.advice_number()),
        advice_date: Set(details.advice_date),
        frk_kgs: Set(details.frk_kgs),
        company: Set(scope.company.clone()),
        year: Set(scope.year),
        ..Default::default()
    };
    let stored = entry
        .insert(conn)
        .await
        .map_err(|e| Error::from_insert(e, conflict_message))?;
    info!(
        "Created rice entry {} (challan {}) for {}",
        stored.id, stored.challan_number, scope
    );

    let frk_movement = debit_if_advised(conn, scope, &stored).await?;
    Ok(DispatchOutcome {
        entry: stored,
        frk_movement,
    })
}

/// Updates the rice entry identified by its challan number within the scope.
///
/// With an advice date present this appends another FRK debit.
#[instrument(skip(db, details))]
pub async fn update_rice_entry<C>(
    db: &C,
    scope: &Scope,
    challan_number: &str,
    details: RiceDetails,
) -> Result<DispatchOutcome>
where
    C: TransactionTrait,
{
    let challan_number = challan_number.trim();
    require_text(challan_number, "challan_number")?;
    details.validate()?;

    let txn = begin_transaction(db).await?;
    let outcome = update_with_debit(&txn, scope, challan_number, details).await;
    finish_transaction(txn, outcome).await
}

async fn update_with_debit<C>(
    conn: &C,
    scope: &Scope,
    challan_number: &str,
    details: RiceDetails,
) -> Result<DispatchOutcome>
where
    C: ConnectionTrait,
{
    let existing = RiceEntry::find()
        .filter(rice_entry::Column::ChallanNumber.eq(challan_number))
        .filter(rice_entry::Column::Company.eq(scope.company.as_str()))
        .filter(rice_entry::Column::Year.eq(scope.year))
        .one(conn)
        .await?
        .ok_or_else(|| {
            Error::not_found(format!("Rice entry {challan_number} not found for {scope}"))
        })?;

    let advice_number = details.advice_number();
    let mut entry: rice_entry::ActiveModel = existing.into();
    entry.date = Set(details.date);
    entry.godown = Set(details.godown.trim().to_string());
    entry.lorry_number = Set(details.lorry_number.trim().to_string());
    entry.variety = Set(details.variety);
    entry.onb_bags = Set(details.onb_bags);
    entry.ss_bags = Set(details.ss_bags);
    entry.swp_bags = Set(details.swp_bags);
    entry.net_weight = Set(details.net_weight);
    entry.moisture = Set(details.moisture);
    entry.advice_number = Set(advice_number);
    entry.advice_date = Set(details.advice_date);
    entry.frk_kgs = Set(details.frk_kgs);

    let updated = entry.update(conn).await?;
    info!(
        "Updated rice entry {} (challan {}) for {}",
        updated.id, challan_number, scope
    );

    let frk_movement = debit_if_advised(conn, scope, &updated).await?;
    Ok(DispatchOutcome {
        entry: updated,
        frk_movement,
    })
}

async fn debit_if_advised<C>(
    conn: &C,
    scope: &Scope,
    entry: &rice_entry::Model,
) -> Result<Option<frk_movement::Model>>
where
    C: ConnectionTrait,
{
    match entry.advice_date {
        Some(advice_date) => {
            frk::debit_for_dispatch(conn, scope, advice_date, entry.frk_kgs, entry.id).await
        }
        None => Ok(None),
    }
}

/// Lists rice entries of the scope by date, optionally narrowed to one challan number.
pub async fn list_rice_entries<C>(
    db: &C,
    scope: &Scope,
    challan_number: Option<&str>,
) -> Result<Vec<rice_entry::Model>>
where
    C: ConnectionTrait,
{
    let mut query = RiceEntry::find()
        .filter(rice_entry::Column::Company.eq(scope.company.as_str()))
        .filter(rice_entry::Column::Year.eq(scope.year));
    if let Some(challan) = challan_number {
        query = query.filter(rice_entry::Column::ChallanNumber.eq(challan));
    }

    let entries = query
        .order_by_asc(rice_entry::Column::Date)
        .order_by_asc(rice_entry::Column::Id)
        .all(db)
        .await?;
    debug!("Fetched {} rice entries for {}", entries.len(), scope);
    Ok(entries)
}

/// Deletes a rice entry by id within the scope.
///
/// FRK movements debited for the entry stay in the ledger.
pub async fn delete_rice_entry<C>(db: &C, id: i64, scope: &Scope) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = RiceEntry::delete_many()
        .filter(rice_entry::Column::Id.eq(id))
        .filter(rice_entry::Column::Company.eq(scope.company.as_str()))
        .filter(rice_entry::Column::Year.eq(scope.year))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found(format!(
            "Rice entry {id} not found for {scope}"
        )));
    }
    info!("Deleted rice entry {} for {}", id, scope);
    Ok(())
}
