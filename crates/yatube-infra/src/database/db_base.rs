use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{DbConn, DbErr, EntityTrait, PaginatorTrait, PrimaryKeyTrait, SqlErr};
use uuid::Uuid;

use yatube_core::error::{ConstraintViolation, RepoError};
use yatube_core::ports::BaseRepository;

use super::entity::Labelled;

/// Generic SQL repository over one SeaORM entity.
///
/// Cascades and null-outs on delete are carried out by the foreign-key
/// actions declared in the schema.
pub struct DbRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> DbRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T> BaseRepository<T, Uuid> for DbRepository<E>
where
    E: EntityTrait + Labelled,
    E::Model: Sync + Send,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    T: From<E::Model> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::not_found(E::LABEL, id));
        }

        tracing::debug!(entity = E::LABEL, %id, "Deleted");
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        E::find().count(&self.db).await.map_err(query_error)
    }
}

/// Map a read or infrastructure failure.
pub(crate) fn query_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// Map a failed write, translating native constraint hits into typed violations.
///
/// `on_unique` is what a unique-index hit means for this write (`None` when
/// the table has no natural key); `relation` names the reference reported
/// when a foreign key is missing.
pub(crate) fn write_error(
    err: DbErr,
    on_unique: Option<ConstraintViolation>,
    relation: &'static str,
) -> RepoError {
    let violation = match (err.sql_err(), on_unique) {
        (Some(SqlErr::UniqueConstraintViolation(_)), Some(violation)) => violation,
        (Some(SqlErr::ForeignKeyConstraintViolation(_)), _) => {
            ConstraintViolation::MissingRelation(relation)
        }
        _ if is_self_follow_violation(&err) => ConstraintViolation::SelfFollow,
        _ => return query_error(err),
    };

    tracing::debug!(%violation, "Write rejected by constraint");
    RepoError::Constraint(violation)
}

/// Name of the `follows.user_id <> author_id` CHECK in the schema.
pub(crate) const USER_NOT_AUTHOR: &str = "user_not_author";

/// Neither driver classifies CHECK failures, but both quote the constraint name.
fn is_self_follow_violation(err: &DbErr) -> bool {
    err.to_string().contains(USER_NOT_AUTHOR)
}
