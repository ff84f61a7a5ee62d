use serde::{Deserialize, Serialize};

use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::AuthenticatedUser,
};

/// Kind of row a database call touched, carried into error responses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceType {
    User,
    Course,
    CourseModule,
    ModuleContent,
    Enrollment,
    ContentProgress,
    Quiz,
    QuizQuestion,
    QuestionOption,
    QuizAttempt,
    StudentAnswer,
    Video,
    Interview,
    InterviewQuestion,
    InterviewAttempt,
    InterviewAnswer,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// `?limit=&offset=` window. Out of range values are pulled back into bounds
/// rather than rejected.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::IntoParams)]
pub struct PageRequest {
    #[serde(default = "default_page_size")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { limit: DEFAULT_PAGE_SIZE, offset: 0 }
    }
}

impl PageRequest {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn from_request(request: PageRequest, items: Vec<T>, total: i64) -> Self {
        Page { items, total, limit: request.limit(), offset: request.offset() }
    }
}

/// Row-level persistence keyed by `Id`. The `actor` is whoever triggered the
/// call; rows with an owner column take their owner from it on create.
#[async_trait::async_trait]
pub trait CrudRepository<T, Payload, Id>
where
    T: ResourceTyped,
    Id: Clone + Copy,
{
    async fn create(mm: &ModelManager, actor: &AuthenticatedUser, data: Payload) -> DatabaseResult<T>;

    async fn update(self, mm: &ModelManager, actor: &AuthenticatedUser, data: Payload) -> DatabaseResult<T>
    where
        Self: Sized;

    async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()>
    where
        Self: Sized;

    async fn find_by_id(mm: &ModelManager, actor: &AuthenticatedUser, id: Id) -> DatabaseResult<Option<T>>;

    async fn list(mm: &ModelManager, actor: &AuthenticatedUser, limit: i64, offset: i64) -> DatabaseResult<Vec<T>>;

    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64>;
}

#[async_trait::async_trait]
pub trait PaginatableRepository<T, Payload, Id>
where
    T: ResourceTyped + CrudRepository<T, Payload, Id>,
    Id: Clone + Copy,
{
    async fn page(mm: &ModelManager, actor: &AuthenticatedUser, request: PageRequest) -> DatabaseResult<Page<T>>;
}

/// Derives `PaginatableRepository` from an entity's `list` and `count`.
#[macro_export]
macro_rules! impl_paginatable_for {
    ($ent:ident, $payload:ident, $id:ident) => {
        #[async_trait::async_trait]
        impl $crate::model::PaginatableRepository<$ent, $payload, $id> for $ent {
            async fn page(
                mm: &ModelManager,
                actor: &AuthenticatedUser,
                request: $crate::model::PageRequest,
            ) -> DatabaseResult<$crate::model::Page<$ent>> {
                let items = $ent::list(mm, actor, request.limit(), request.offset()).await?;
                let total = $ent::count(mm, actor).await?;
                Ok($crate::model::Page::from_request(request, items, total))
            }
        }
    };
}
