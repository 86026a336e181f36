//! Paddy entry business logic.
//!
//! Thin create/read/update/delete over `paddy_entries`. The only rule enforced
//! here is the uniqueness of the issue memo id within a [`Scope`], checked up
//! front and backed by a unique index.

use super::{Scope, require_non_negative, require_text};
use crate::{
    entities::{Grade, PaddyEntry, paddy_entry},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Every paddy entry field except the memo id and scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddyDetails {
    /// Date the paddy was received
    pub date: NaiveDate,
    /// Receiving godown
    pub godown: String,
    /// Lorry registration number
    #[serde(alias = "lorryNo")]
    pub lorry_number: String,
    /// Paddy grade
    pub grade: Grade,
    /// Moisture percentage
    #[serde(default, deserialize_with = "super::input::or_default")]
    pub moisture: f64,
    /// Bags in ONB condition
    #[serde(default, alias = "onbBags", deserialize_with = "super::input::or_default")]
    pub onb_bags: i32,
    /// Bags in SS condition
    #[serde(default, alias = "ssBags", deserialize_with = "super::input::or_default")]
    pub ss_bags: i32,
    /// Bags in SWP condition
    #[serde(default, alias = "swpBags", deserialize_with = "super::input::or_default")]
    pub swp_bags: i32,
    /// Bags in NB condition
    #[serde(default, alias = "nbBags", deserialize_with = "super::input::or_default")]
    pub nb_bags: i32,
    /// Net weight in tons/KGs
    #[serde(default, alias = "tonsKgs", deserialize_with = "super::input::or_default")]
    pub net_weight: f64,
}

impl PaddyDetails {
    fn validate(&self) -> Result<()> {
        require_text(&self.godown, "godown")?;
        require_text(&self.lorry_number, "lorry_number")?;
        require_non_negative(self.moisture, "moisture")?;
        require_non_negative(self.net_weight, "net_weight")?;
        if [self.onb_bags, self.ss_bags, self.swp_bags, self.nb_bags]
            .iter()
            .any(|bags| *bags < 0)
        {
            return Err(Error::validation("bag counts cannot be negative"));
        }
        Ok(())
    }
}

async fn memo_exists<C>(db: &C, scope: &Scope, issue_memo_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = PaddyEntry::find()
        .filter(paddy_entry::Column::IssueMemoId.eq(issue_memo_id))
        .filter(paddy_entry::Column::Company.eq(scope.company.as_str()))
        .filter(paddy_entry::Column::Year.eq(scope.year))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Creates a paddy entry.
///
/// Fails with `Error::Conflict` if the memo id is already used in the scope.
pub async fn create_paddy_entry<C>(
    db: &C,
    scope: &Scope,
    issue_memo_id: &str,
    details: PaddyDetails,
) -> Result<paddy_entry::Model>
where
    C: ConnectionTrait,
{
    let issue_memo_id = issue_memo_id.trim();
    require_text(issue_memo_id, "issue_memo_id")?;
    details.validate()?;

    let conflict_message =
        format!("Issue memo id {issue_memo_id} already exists for {scope}");
    if memo_exists(db, scope, issue_memo_id).await? {
        return Err(Error::conflict(conflict_message));
    }

    let entry = paddy_entry::ActiveModel {
        date: Set(details.date),
        godown: Set(details.godown.trim().to_string()),
        issue_memo_id: Set(issue_memo_id.to_string()),
        lorry_number: Set(details.lorry_number.trim().to_string()),
        grade: Set(details.grade),
        moisture: Set(details.moisture),
        onb_bags: Set(details.onb_bags),
        ss_bags: Set(details.ss_bags),
        swp_bags: Set(details.swp_bags),
        nb_bags: Set(details.nb_bags),
        net_weight: Set(details.net_weight),
        company: Set(scope.company.clone()),
        year: Set(scope.year),
        ..Default::default()
    };

    let stored = entry
        .insert(db)
        .await
        .map_err(|e| Error::from_insert(e, conflict_message))?;
    info!(
        "Created paddy entry {} (memo {}) for {}",
        stored.id, stored.issue_memo_id, scope
    );
    Ok(stored)
}

/// Updates the paddy entry identified by its memo id within the scope.
pub async fn update_paddy_entry<C>(
    db: &C,
    scope: &Scope,
    issue_memo_id: &str,
    details: PaddyDetails,
) -> Result<paddy_entry::Model>
where
    C: ConnectionTrait,
{
    let issue_memo_id = issue_memo_id.trim();
    require_text(issue_memo_id, "issue_memo_id")?;
    details.validate()?;

    let existing = PaddyEntry::find()
        .filter(paddy_entry::Column::IssueMemoId.eq(issue_memo_id))
        .filter(paddy_entry::Column::Company.eq(scope.company.as_str()))
        .filter(paddy_entry::Column::Year.eq(scope.year))
        .one(db)
        .await?
        .ok_or_else(|| {
            Error::not_found(format!("Paddy entry {issue_memo_id} not found for {scope}"))
        })?;

    let mut entry: paddy_entry::ActiveModel = existing.into();
    entry.date = Set(details.date);
    entry.godown = Set(details.godown.trim().to_string());
    entry.lorry_number = Set(details.lorry_number.trim().to_string());
    entry.grade = Set(details.grade);
    entry.moisture = Set(details.moisture);
    entry.onb_bags = Set(details.onb_bags);
    entry.ss_bags = Set(details.ss_bags);
    entry.swp_bags = Set(details.swp_bags);
    entry.nb_bags = Set(details.nb_bags);
    entry.net_weight = Set(details.net_weight);

    let updated = entry.update(db).await?;
    info!("Updated paddy entry {} (memo {}) for {}", updated.id, issue_memo_id, scope);
    Ok(updated)
}

/// Lists paddy entries of the scope by date, optionally narrowed to one memo id.
pub async fn list_paddy_entries<C>(
    db: &C,
    scope: &Scope,
    issue_memo_id: Option<&str>,
) -> Result<Vec<paddy_entry::Model>>
where
    C: ConnectionTrait,
{
    let mut query = PaddyEntry::find()
        .filter(paddy_entry::Column::Company.eq(scope.company.as_str()))
        .filter(paddy_entry::Column::Year.eq(scope.year));
    if let Some(memo) = issue_memo_id {
        query = query.filter(paddy_entry::Column::IssueMemoId.eq(memo));
    }

    let entries = query
        .order_by_asc(paddy_entry::Column::Date)
        .order_by_asc(paddy_entry::Column::Id)
        .all(db)
        .await?;
    debug!("Fetched {} paddy entries for {}", entries.len(), scope);
    Ok(entries)
}

/// Deletes a paddy entry by id within the scope.
pub async fn delete_paddy_entry<C>(db: &C, id: i64, scope: &Scope) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = PaddyEntry::delete_many()
        .filter(paddy_entry::Column::Id.eq(id))
        .filter(paddy_entry::Column::Company.eq(scope.company.as_str()))
        .filter(paddy_entry::Column::Year.eq(scope.year))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found(format!(
            "Paddy entry {id} not found for {scope}"
        )));
    }
    info!("Deleted paddy entry {} for {}", id, scope);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_list_paddy_entry() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = acme_2024();

        let entry = create_paddy_entry(&db, &scope, "M-001", paddy_details(day(1), Grade::Rpa, 1000.0))
            .await?;
        assert_eq!(entry.issue_memo_id, "M-001");
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.year, 2024);
        assert_eq!(entry.total_bags(), 40);

        let listed = list_paddy_entries(&db, &scope, None).await?;
        assert_eq!(listed, vec![entry]);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_memo_is_conflict_and_leaves_count() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = acme_2024();
        create_paddy_entry(&db, &scope, "M-001", paddy_details(day(1), Grade::Rpa, 1000.0)).await?;

        let result =
            create_paddy_entry(&db, &scope, "M-001", paddy_details(day(2), Grade::Rpc, 500.0))
                .await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        assert_eq!(PaddyEntry::find().count(&db).await?, 1);

        // The same memo id is fine in another year
        let other_year = Scope::new("Acme", 2023)?;
        create_paddy_entry(&db, &other_year, "M-001", paddy_details(day(2), Grade::Rpc, 500.0))
            .await?;
        assert_eq!(PaddyEntry::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_paddy_entry_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = acme_2024();

        let result =
            create_paddy_entry(&db, &scope, "  ", paddy_details(day(1), Grade::Rpa, 10.0)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut details = paddy_details(day(1), Grade::Rpa, 10.0);
        details.godown = String::new();
        let result = create_paddy_entry(&db, &scope, "M-1", details).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut details = paddy_details(day(1), Grade::Rpa, 10.0);
        details.nb_bags = -1;
        let result = create_paddy_entry(&db, &scope, "M-1", details).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert_eq!(PaddyEntry::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_paddy_entry() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = acme_2024();
        let created =
            create_paddy_entry(&db, &scope, "M-7", paddy_details(day(1), Grade::Rpa, 100.0)).await?;

        let updated =
            update_paddy_entry(&db, &scope, "M-7", paddy_details(day(3), Grade::Rpc, 250.0)).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.grade, Grade::Rpc);
        assert_eq!(updated.net_weight, 250.0);
        assert_eq!(updated.date, day(3));

        let missing =
            update_paddy_entry(&db, &scope, "M-8", paddy_details(day(3), Grade::Rpc, 1.0)).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_uses_trimmed_memo_id() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = acme_2024();
        let created =
            create_paddy_entry(&db, &scope, " M-3 ", paddy_details(day(1), Grade::Rpa, 10.0)).await?;
        assert_eq!(created.issue_memo_id, "M-3");

        let updated =
            update_paddy_entry(&db, &scope, " M-3 ", paddy_details(day(2), Grade::Rpa, 20.0)).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.net_weight, 20.0);

        let blank =
            update_paddy_entry(&db, &scope, "   ", paddy_details(day(2), Grade::Rpa, 20.0)).await;
        assert!(matches!(blank, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters_by_memo_and_scope() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = acme_2024();
        create_paddy_entry(&db, &scope, "M-2", paddy_details(day(5), Grade::Rpa, 1.0)).await?;
        create_paddy_entry(&db, &scope, "M-1", paddy_details(day(2), Grade::Rpa, 1.0)).await?;
        create_paddy_entry(
            &db,
            &Scope::new("Sivakami", 2024)?,
            "M-1",
            paddy_details(day(2), Grade::Rpa, 1.0),
        )
        .await?;

        let all = list_paddy_entries(&db, &scope, None).await?;
        let memos: Vec<&str> = all.iter().map(|e| e.issue_memo_id.as_str()).collect();
        assert_eq!(memos, vec!["M-1", "M-2"]);

        let one = list_paddy_entries(&db, &scope, Some("M-2")).await?;
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].date, day(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_paddy_entry_is_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = acme_2024();
        let entry =
            create_paddy_entry(&db, &scope, "M-1", paddy_details(day(1), Grade::Rpa, 1.0)).await?;

        let wrong_scope = delete_paddy_entry(&db, entry.id, &Scope::new("Acme", 2023)?).await;
        assert!(matches!(wrong_scope, Err(Error::NotFound { .. })));

        delete_paddy_entry(&db, entry.id, &scope).await?;
        assert!(list_paddy_entries(&db, &scope, None).await?.is_empty());

        let again = delete_paddy_entry(&db, entry.id, &scope).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));
        Ok(())
    }
}
