use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::connection::{PgPool, PgPooledConnection};
use crate::db::models::*;
use crate::db::schema::{categories, products};
use crate::errors::{AppError, AppResult};
use crate::query::{CategoryQuery, SortColumn, SortDirection};

/// Category persistence. Implemented for PostgreSQL and for the in-process
/// store.
pub trait CategoryRepository: Send + Sync {
    /// One page of rows matching `query`, plus the total number of matches.
    fn list(&self, query: &CategoryQuery) -> AppResult<(Vec<CategoryWithParent>, u64)>;

    /// Every category, oldest first.
    fn all(&self) -> AppResult<Vec<Category>>;

    fn find(&self, id: i32) -> AppResult<Option<Category>>;

    fn create(&self, new_category: NewCategory) -> AppResult<Category>;

    /// Returns `None` when no row has this id.
    fn update(&self, id: i32, changes: UpdateCategory) -> AppResult<Option<Category>>;

    /// Number of rows removed.
    fn delete(&self, id: i32) -> AppResult<usize>;

    fn count_children(&self, id: i32) -> AppResult<u64>;
}

pub trait ProductRepository: Send + Sync {
    /// Products that are not soft-deleted, newest first, with their category.
    fn list_with_category(&self) -> AppResult<Vec<ProductWithCategory>>;

    fn create_product(&self, new_product: NewProduct) -> AppResult<Product>;

    /// Non-deleted products attached to a category.
    fn count_for_category(&self, category_id: i32) -> AppResult<u64>;
}

diesel::alias!(categories as parents: ParentCategories);

macro_rules! filter_categories {
    ($query:expr, $filter:expr) => {{
        let mut query = $query;
        if let Some(pattern) = $filter.search_pattern() {
            query = query.filter(categories::name.ilike(pattern));
        }
        if let Some(active) = $filter.is_active {
            query = query.filter(categories::is_active.eq(active));
        }
        query
    }};
}

macro_rules! order_by_direction {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            SortDirection::Asc => $query
                .order_by($column.asc())
                .then_order_by(categories::id.asc()),
            SortDirection::Desc => $query
                .order_by($column.desc())
                .then_order_by(categories::id.desc()),
        }
    };
}

/// A row that started referencing the category after the dependents check
/// surfaces as a foreign-key violation; report it like the check would.
fn delete_error(error: diesel::result::Error) -> AppError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            log::warn!("category delete blocked by a new reference: {}", info.message());
            AppError::Conflict("Category is still referenced; reload and try again.".to_string())
        }
        other => AppError::Database(other),
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        PgRepository { pool }
    }

    fn conn(&self) -> AppResult<PgPooledConnection> {
        Ok(self.pool.get()?)
    }
}

impl CategoryRepository for PgRepository {
    fn list(&self, query: &CategoryQuery) -> AppResult<(Vec<CategoryWithParent>, u64)> {
        let conn = &mut self.conn()?;

        let total: i64 = filter_categories!(categories::table.into_boxed(), query)
            .count()
            .get_result(conn)?;

        let rows = categories::table
            .left_join(parents.on(categories::parent_id.eq(parents.field(categories::id).nullable())))
            .select((Category::as_select(), parents.field(categories::name).nullable()))
            .into_boxed();
        let rows = filter_categories!(rows, query);
        let rows = match query.order() {
            (SortColumn::Name, dir) => order_by_direction!(rows, categories::name, dir),
            (SortColumn::Slug, dir) => order_by_direction!(rows, categories::slug, dir),
            (SortColumn::ParentName, dir) => {
                order_by_direction!(rows, parents.field(categories::name).nullable(), dir)
            },
            (SortColumn::IsActive, dir) => order_by_direction!(rows, categories::is_active, dir),
            (SortColumn::CreatedAt, dir) => order_by_direction!(rows, categories::created_at, dir),
            (SortColumn::UpdatedAt, dir) => order_by_direction!(rows, categories::updated_at, dir),
        };

        let limit = i64::from(query.per_page);
        let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);
        let rows = rows
            .limit(limit)
            .offset(offset)
            .load::<(Category, Option<String>)>(conn)?;

        let rows = rows
            .into_iter()
            .map(|(category, parent_name)| CategoryWithParent::new(category, parent_name))
            .collect();
        Ok((rows, to_count(total)))
    }

    fn all(&self) -> AppResult<Vec<Category>> {
        let conn = &mut self.conn()?;
        Ok(categories::table
            .order((categories::created_at.asc(), categories::id.asc()))
            .select(Category::as_select())
            .load(conn)?)
    }

    fn find(&self, id: i32) -> AppResult<Option<Category>> {
        let conn = &mut self.conn()?;
        Ok(categories::table
            .find(id)
            .select(Category::as_select())
            .first(conn)
            .optional()?)
    }

    fn create(&self, new_category: NewCategory) -> AppResult<Category> {
        let conn = &mut self.conn()?;
        Ok(diesel::insert_into(categories::table)
            .values(&new_category)
            .returning(Category::as_returning())
            .get_result(conn)?)
    }

    fn update(&self, id: i32, changes: UpdateCategory) -> AppResult<Option<Category>> {
        let conn = &mut self.conn()?;
        Ok(diesel::update(categories::table.find(id))
            .set((&changes, categories::updated_at.eq(Utc::now().naive_utc())))
            .returning(Category::as_returning())
            .get_result(conn)
            .optional()?)
    }

    fn delete(&self, id: i32) -> AppResult<usize> {
        let conn = &mut self.conn()?;
        diesel::delete(categories::table.find(id))
            .execute(conn)
            .map_err(delete_error)
    }

    fn count_children(&self, id: i32) -> AppResult<u64> {
        let conn = &mut self.conn()?;
        let count: i64 = categories::table
            .filter(categories::parent_id.eq(id))
            .count()
            .get_result(conn)?;
        Ok(to_count(count))
    }
}

impl ProductRepository for PgRepository {
    fn list_with_category(&self) -> AppResult<Vec<ProductWithCategory>> {
        let conn = &mut self.conn()?;
        let rows = products::table
            .inner_join(categories::table)
            .filter(products::deleted_at.is_null())
            .order((products::created_at.desc(), products::id.desc()))
            .select((Product::as_select(), categories::name))
            .load::<(Product, String)>(conn)?;

        Ok(rows
            .into_iter()
            .map(|(product, category_name)| ProductWithCategory::new(product, category_name))
            .collect())
    }

    fn create_product(&self, new_product: NewProduct) -> AppResult<Product> {
        let conn = &mut self.conn()?;
        Ok(diesel::insert_into(products::table)
            .values(&new_product)
            .returning(Product::as_returning())
            .get_result(conn)?)
    }

    fn count_for_category(&self, category_id: i32) -> AppResult<u64> {
        let conn = &mut self.conn()?;
        let count: i64 = products::table
            .filter(products::category_id.eq(category_id))
            .filter(products::deleted_at.is_null())
            .count()
            .get_result(conn)?;
        Ok(to_count(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_violation_on_delete_is_a_conflict() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new(String::from("products_category_id_fkey")),
        );
        assert!(matches!(delete_error(error), AppError::Conflict(_)));
    }

    #[test]
    fn other_delete_failures_stay_database_errors() {
        assert!(matches!(
            delete_error(DieselError::NotFound),
            AppError::Database(DieselError::NotFound)
        ));
    }
}
