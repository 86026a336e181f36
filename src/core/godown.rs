//! Godown name lists, one namespace for paddy and one for rice.

use super::require_text;
use crate::{
    entities::{Godown, GodownKind, godown},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::info;

/// Returns the godown names of `kind`, alphabetically.
pub async fn list_godowns<C>(db: &C, kind: GodownKind) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    Godown::find()
        .select_only()
        .column(godown::Column::Name)
        .filter(godown::Column::Kind.eq(kind))
        .order_by_asc(godown::Column::Name)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a godown name to the `kind` list.
///
/// Blank names are a validation error and an existing name is a conflict.
pub async fn add_godown<C>(db: &C, kind: GodownKind, name: &str) -> Result<godown::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    require_text(name, "name")?;

    let conflict_message = format!("Godown {name} already exists");
    let existing = Godown::find()
        .filter(godown::Column::Kind.eq(kind))
        .filter(godown::Column::Name.eq(name))
        .count(db)
        .await?;
    if existing > 0 {
        return Err(Error::conflict(conflict_message));
    }

    let model = godown::ActiveModel {
        kind: Set(kind),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| Error::from_insert(e, conflict_message))?;

    info!("Added {:?} godown {}", kind, model.name);
    Ok(model)
}
