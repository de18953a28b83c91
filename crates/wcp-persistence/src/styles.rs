//! `writing_styles` table adapter (`§3` WritingStyle — read-only from the
//! core's perspective; the narrator out-of-scope collaborator writes it).

use sqlx::{Executor, Sqlite};
use wcp_domain::entity::WritingStyle;
use wcp_domain::error::Result;

pub async fn get_for_world<'e, E>(exec: E, world_id: i64) -> Result<Option<WritingStyle>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, WritingStyle>(
        "SELECT id, world_id, tone, point_of_view, notes FROM writing_styles WHERE world_id = ?",
    )
    .bind(world_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}
