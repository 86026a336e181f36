//! Outturn report - paddy received versus rice due versus rice dispatched.
//!
//! Nothing here is persisted. Each call reads the scope's paddy and rice
//! entries, merges them into one date-ordered sequence and walks it once,
//! carrying running totals on every row.
//!
//! Paddy rows are dated by their receipt date and rice rows by their advice
//! date. A rice row without an advice date, or any row dated 1970-01-01, is
//! treated as undated and left out of the report.

use super::Scope;
use crate::{
    entities::{Grade, PaddyEntry, RiceEntry, Variety, paddy_entry, rice_entry},
    errors::Result,
};
use chrono::{DateTime, NaiveDate};
use sea_orm::{QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Share of paddy weight expected back as milled rice.
pub const OUTTURN_RATIO: f64 = 0.68;

/// Which slice of the scope a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutturnVariant {
    /// Both grades and both varieties
    Total,
    /// `RPA` paddy against `BRA` rice
    GradeA,
    /// `RPC` paddy against `BRC` rice
    GradeC,
}

impl OutturnVariant {
    /// Paddy grade this variant is limited to, if any.
    pub const fn grade(self) -> Option<Grade> {
        match self {
            Self::Total => None,
            Self::GradeA => Some(Grade::Rpa),
            Self::GradeC => Some(Grade::Rpc),
        }
    }

    /// Rice variety this variant is limited to, if any.
    pub const fn variety(self) -> Option<Variety> {
        match self {
            Self::Total => None,
            Self::GradeA => Some(Variety::Bra),
            Self::GradeC => Some(Variety::Brc),
        }
    }
}

/// Paddy side of a report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaddyLine {
    /// Paddy entry id
    pub id: i64,
    /// Issue memo number
    pub issue_memo_id: String,
    /// Paddy grade
    pub grade: Grade,
    /// Sum of all bag subtotals
    pub bags: i64,
    /// Net weight received
    pub weight: f64,
    /// Rice due from `RPA` paddy; absent in the grade C report
    pub rice_due_rpa: Option<f64>,
    /// Rice due from `RPC` paddy; absent in the grade A report
    pub rice_due_rpc: Option<f64>,
}

impl PaddyLine {
    fn due(&self) -> f64 {
        self.rice_due_rpa.unwrap_or(0.0) + self.rice_due_rpc.unwrap_or(0.0)
    }
}

/// Rice side of a report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiceLine {
    /// Rice entry id
    pub id: i64,
    /// Dispatch challan number
    pub challan_number: String,
    /// Rice variety
    pub variety: Variety,
    /// Acceptance advice number
    pub advice_number: Option<String>,
    /// Sum of all bag subtotals
    pub bags: i64,
    /// Net weight dispatched
    pub weight: f64,
}

/// A report row carries either a paddy receipt or a rice dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutturnEntry {
    /// Paddy received into a godown
    Paddy(PaddyLine),
    /// Rice dispatched against an advice
    Rice(RiceLine),
}

/// Totals as of and including a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningTotals {
    /// Paddy bags received so far
    pub paddy_bags: i64,
    /// Paddy weight received so far
    pub paddy_weight: f64,
    /// Rice owed for the paddy received so far
    pub rice_due: f64,
    /// Rice bags dispatched so far
    pub rice_bags: i64,
    /// Rice weight dispatched so far
    pub rice_weight: f64,
    /// `rice_due - rice_weight`
    pub balance_due: f64,
}

impl RunningTotals {
    fn advance(mut self, entry: &OutturnEntry) -> Self {
        match entry {
            OutturnEntry::Paddy(line) => {
                self.paddy_bags += line.bags;
                self.paddy_weight += line.weight;
                self.rice_due += line.due();
            }
            OutturnEntry::Rice(line) => {
                self.rice_bags += line.bags;
                self.rice_weight += line.weight;
            }
        }
        self.balance_due = self.rice_due - self.rice_weight;
        self
    }
}

/// One dated line of the report with the totals up to and including it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutturnRow {
    /// Receipt date for paddy, advice date for rice
    pub date: NaiveDate,
    /// The paddy or rice line
    pub entry: OutturnEntry,
    /// Totals as of this row
    pub running: RunningTotals,
}

/// A complete outturn report for one scope and variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutturnReport {
    /// Slice of the scope covered
    pub variant: OutturnVariant,
    /// Rows in date order
    pub rows: Vec<OutturnRow>,
    /// Balance due of the last row, zero for an empty report
    pub outstanding_balance: f64,
}

fn is_undated(date: NaiveDate) -> bool {
    date == DateTime::UNIX_EPOCH.date_naive()
}

fn paddy_line(entry: &paddy_entry::Model, variant: OutturnVariant) -> PaddyLine {
    let due = entry.net_weight * OUTTURN_RATIO;
    let (rice_due_rpa, rice_due_rpc) = match (variant, entry.grade) {
        (OutturnVariant::Total, Grade::Rpa) => (Some(due), Some(0.0)),
        (OutturnVariant::Total, Grade::Rpc) => (Some(0.0), Some(due)),
        (OutturnVariant::GradeA, _) => (Some(due), None),
        (OutturnVariant::GradeC, _) => (None, Some(due)),
    };
    PaddyLine {
        id: entry.id,
        issue_memo_id: entry.issue_memo_id.clone(),
        grade: entry.grade,
        bags: entry.total_bags(),
        weight: entry.net_weight,
        rice_due_rpa,
        rice_due_rpc,
    }
}

fn rice_line(entry: &rice_entry::Model) -> RiceLine {
    RiceLine {
        id: entry.id,
        challan_number: entry.challan_number.clone(),
        variety: entry.variety,
        advice_number: entry.advice_number.clone(),
        bags: entry.total_bags(),
        weight: entry.net_weight,
    }
}

/// Builds a report from entries already filtered to `variant`.
///
/// Rows are ordered by date with paddy ahead of rice on the same day; within
/// each side the input order is kept.
pub fn aggregate(
    variant: OutturnVariant,
    paddy: &[paddy_entry::Model],
    rice: &[rice_entry::Model],
) -> OutturnReport {
    let paddy_rows = paddy
        .iter()
        .filter(|entry| !is_undated(entry.date))
        .map(|entry| (entry.date, OutturnEntry::Paddy(paddy_line(entry, variant))));
    let rice_rows = rice.iter().filter_map(|entry| {
        entry
            .advice_date
            .filter(|date| !is_undated(*date))
            .map(|date| (date, OutturnEntry::Rice(rice_line(entry))))
    });

    let mut merged: Vec<(NaiveDate, OutturnEntry)> = paddy_rows.chain(rice_rows).collect();
    merged.sort_by_key(|(date, _)| *date);

    let mut running = RunningTotals::default();
    let rows: Vec<OutturnRow> = merged
        .into_iter()
        .map(|(date, entry)| {
            running = running.advance(&entry);
            OutturnRow {
                date,
                entry,
                running,
            }
        })
        .collect();

    OutturnReport {
        variant,
        outstanding_balance: running.balance_due,
        rows,
    }
}

/// Computes the outturn report of a scope.
#[instrument(skip(db))]
pub async fn compute_outturn<C>(
    db: &C,
    scope: &Scope,
    variant: OutturnVariant,
) -> Result<OutturnReport>
where
    C: ConnectionTrait,
{
    let mut paddy_query = PaddyEntry::find()
        .filter(paddy_entry::Column::Company.eq(scope.company.as_str()))
        .filter(paddy_entry::Column::Year.eq(scope.year));
    if let Some(grade) = variant.grade() {
        paddy_query = paddy_query.filter(paddy_entry::Column::Grade.eq(grade));
    }
    let paddy = paddy_query
        .order_by_asc(paddy_entry::Column::Id)
        .all(db)
        .await?;

    let mut rice_query = RiceEntry::find()
        .filter(rice_entry::Column::Company.eq(scope.company.as_str()))
        .filter(rice_entry::Column::Year.eq(scope.year));
    if let Some(variety) = variant.variety() {
        rice_query = rice_query.filter(rice_entry::Column::Variety.eq(variety));
    }
    let rice = rice_query
        .order_by_asc(rice_entry::Column::Id)
        .all(db)
        .await?;

    let report = aggregate(variant, &paddy, &rice);
    debug!(
        "Outturn for {}: {} rows from {} paddy and {} rice entries",
        scope,
        report.rows.len(),
        paddy.len(),
        rice.len()
    );
    Ok(report)
}
