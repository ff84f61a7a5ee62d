use crate::{
    model::{
        ModelManager,
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

/// Resources owned by a single user. Course material resolves to the instructor of its course.
#[async_trait::async_trait]
pub trait HasOwner {
    type OwnerId: PartialEq + Send + Sync;
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        ctx: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId>;
}

/// Passes when `actor` is an admin or `resource` resolves to `expected`,
/// otherwise fails with [`DatabaseError::Forbidden`].
pub async fn check_access<T, O>(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    resource: &T,
    expected: O,
) -> DatabaseResult<()>
where
    T: HasOwner<OwnerId = O> + Sync,
    O: PartialEq + Send + Sync,
{
    if actor.user_role() == UserRole::Admin || resource.get_owner_id(mm, actor).await? == expected {
        return Ok(());
    }
    Err(DatabaseError::Forbidden)
}

/// Same rule as [`check_access`] against the caller, but as a flag for read paths that
/// degrade instead of failing.
pub async fn is_owner_or_admin<T: HasOwner<OwnerId = uuid::Uuid> + Sync>(
    mm: &ModelManager,
    ctx: Option<&AuthenticatedUser>,
    resource: &T,
) -> DatabaseResult<bool> {
    let Some(ctx) = ctx else {
        return Ok(false);
    };

    match check_access(mm, ctx, resource, ctx.user_id()).await {
        Ok(()) => Ok(true),
        Err(DatabaseError::Forbidden) => Ok(false),
        Err(e) => Err(e),
    }
}
