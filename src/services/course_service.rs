use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::course::{Course, CoursePriceOption};
use crate::database::models::teacher::{Teacher, TeacherStatus};
use crate::types::{Page, PageQuery};

/// At most this many price options per course.
pub const PRICE_OPTION_LIMIT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Course not found")]
    NotFound,
    #[error("Not the owner of this course")]
    Forbidden,
    #[error("Only approved teachers can manage courses")]
    TeacherNotApproved,
    #[error("Sub-category not found")]
    SubCategoryNotFound,
    #[error("Price option limit reached")]
    PriceOptionLimit,
    #[error("Duplicate price option")]
    PriceOptionDuplicate,
    #[error("Price option not found")]
    PriceOptionNotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseSearch {
    pub sub_category_id: Option<i32>,
    pub city_id: Option<i32>,
    pub teacher_id: Option<Uuid>,
    pub online: Option<bool>,
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub sub_category_id: i32,
    pub city_id: Option<i32>,
    pub is_online: bool,
    pub min_price: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherCard {
    pub id: Uuid,
    pub name: String,
    pub headline: String,
    pub career_years: i16,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub price_options: Vec<CoursePriceOption>,
    pub teacher: TeacherCard,
    pub rating_count: i64,
    pub rating_avg: Option<f64>,
}

#[derive(Debug, Default)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sub_category_id: Option<i32>,
    pub city_id: Option<Option<i32>>,
    pub is_online: Option<bool>,
}

pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    const SEARCH_FROM: &'static str = "FROM courses c \
        JOIN teachers t ON t.id = c.teacher_id \
        JOIN users u ON u.id = t.user_id \
        WHERE c.is_active = TRUE AND c.deleted_at IS NULL AND t.status = 'approved'";

    fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, search: &'a CourseSearch) {
        if let Some(id) = search.sub_category_id {
            qb.push(" AND c.sub_category_id = ").push_bind(id);
        }
        if let Some(id) = search.city_id {
            qb.push(" AND c.city_id = ").push_bind(id);
        }
        if let Some(id) = search.teacher_id {
            qb.push(" AND c.teacher_id = ").push_bind(id);
        }
        if let Some(online) = search.online {
            qb.push(" AND c.is_online = ").push_bind(online);
        }
        if let Some(keyword) = search.keyword.as_deref() {
            if !keyword.trim().is_empty() {
                qb.push(" AND c.title ILIKE ")
                    .push_bind(format!("%{}%", keyword.trim()));
            }
        }
    }

    pub async fn search(
        &self,
        search: &CourseSearch,
        page: &PageQuery,
    ) -> Result<Page<CourseSummary>, CourseError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) {}", Self::SEARCH_FROM));
        Self::push_filters(&mut count_qb, search);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT c.id, c.title, c.teacher_id, u.name AS teacher_name, \
             c.sub_category_id, c.city_id, c.is_online, \
             (SELECT MIN(price) FROM course_price_options o WHERE o.course_id = c.id) AS min_price, \
             c.created_at {}",
            Self::SEARCH_FROM
        ));
        Self::push_filters(&mut qb, search);
        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = qb
            .build_query_as::<CourseSummary>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn detail(&self, course_id: Uuid) -> Result<CourseDetail, CourseError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE id = $1 AND is_active = TRUE AND deleted_at IS NULL",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CourseError::NotFound)?;

        let teacher: (Uuid, String, String, i16) = sqlx::query_as(
            r#"
            SELECT t.id, u.name, t.headline, t.career_years
            FROM teachers t JOIN users u ON u.id = t.user_id
            WHERE t.id = $1 AND t.status = 'approved' AND t.deleted_at IS NULL
            "#,
        )
        .bind(course.teacher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CourseError::NotFound)?;

        let price_options = self.price_options(course.id).await?;

        let (rating_count, rating_avg): (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating)::float8 FROM reviews \
             WHERE course_id = $1 AND is_hidden = FALSE AND deleted_at IS NULL",
        )
        .bind(course.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CourseDetail {
            course,
            price_options,
            teacher: TeacherCard {
                id: teacher.0,
                name: teacher.1,
                headline: teacher.2,
                career_years: teacher.3,
            },
            rating_count,
            rating_avg,
        })
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        description: &str,
        sub_category_id: i32,
        city_id: Option<i32>,
        is_online: bool,
    ) -> Result<Course, CourseError> {
        let teacher = self.approved_teacher(user_id).await?;

        let known: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM sub_categories WHERE id = $1)")
                .bind(sub_category_id)
                .fetch_one(&self.pool)
                .await?;
        if !known.0 {
            return Err(CourseError::SubCategoryNotFound);
        }

        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (id, teacher_id, sub_category_id, city_id, title, description, is_online)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(teacher.id)
        .bind(sub_category_id)
        .bind(city_id)
        .bind(title)
        .bind(description)
        .bind(is_online)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Teacher {} created course {}", teacher.id, course.id);
        Ok(course)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        update: UpdateCourse,
    ) -> Result<Course, CourseError> {
        let course = self.owned_course(user_id, course_id).await?;

        if let Some(id) = update.sub_category_id {
            let known: (bool,) =
                sqlx::query_as("SELECT EXISTS (SELECT 1 FROM sub_categories WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
            if !known.0 {
                return Err(CourseError::SubCategoryNotFound);
            }
        }

        // city_id is doubly optional: Some(None) clears it for online-only courses
        let (set_city, city_id) = match update.city_id {
            Some(city) => (true, city),
            None => (false, course.city_id),
        };

        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                sub_category_id = COALESCE($4, sub_category_id),
                city_id = CASE WHEN $5 THEN $6 ELSE city_id END,
                is_online = COALESCE($7, is_online),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(course.id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.sub_category_id)
        .bind(set_city)
        .bind(city_id)
        .bind(update.is_online)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    /// Soft-delete; existing purchases and reservations keep their FK rows.
    pub async fn deactivate(&self, user_id: Uuid, course_id: Uuid) -> Result<(), CourseError> {
        let course = self.owned_course(user_id, course_id).await?;

        sqlx::query(
            "UPDATE courses SET is_active = FALSE, deleted_at = now(), updated_at = now() \
             WHERE id = $1",
        )
        .bind(course.id)
        .execute(&self.pool)
        .await?;

        tracing::info!("Course {} deactivated by owner", course.id);
        Ok(())
    }

    pub async fn price_options(&self, course_id: Uuid) -> Result<Vec<CoursePriceOption>, CourseError> {
        let options = sqlx::query_as::<_, CoursePriceOption>(
            "SELECT * FROM course_price_options WHERE course_id = $1 ORDER BY price",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    pub async fn add_price_option(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        price: i64,
        quantity: i32,
    ) -> Result<CoursePriceOption, CourseError> {
        let course = self.owned_course(user_id, course_id).await?;
        let options = self.price_options(course.id).await?;

        if options.len() >= PRICE_OPTION_LIMIT {
            return Err(CourseError::PriceOptionLimit);
        }
        if options.iter().any(|o| o.price == price && o.quantity == quantity) {
            return Err(CourseError::PriceOptionDuplicate);
        }

        let option = sqlx::query_as::<_, CoursePriceOption>(
            r#"
            INSERT INTO course_price_options (id, course_id, price, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(course.id)
        .bind(price)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(option)
    }

    pub async fn replace_price_option(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        option_id: Uuid,
        price: i64,
        quantity: i32,
    ) -> Result<CoursePriceOption, CourseError> {
        let course = self.owned_course(user_id, course_id).await?;
        let options = self.price_options(course.id).await?;

        if !options.iter().any(|o| o.id == option_id) {
            return Err(CourseError::PriceOptionNotFound);
        }
        if options
            .iter()
            .any(|o| o.id != option_id && o.price == price && o.quantity == quantity)
        {
            return Err(CourseError::PriceOptionDuplicate);
        }

        let option = sqlx::query_as::<_, CoursePriceOption>(
            "UPDATE course_price_options SET price = $2, quantity = $3 WHERE id = $1 RETURNING *",
        )
        .bind(option_id)
        .bind(price)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(option)
    }

    pub async fn remove_price_option(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        option_id: Uuid,
    ) -> Result<(), CourseError> {
        let course = self.owned_course(user_id, course_id).await?;

        let result = sqlx::query(
            "DELETE FROM course_price_options WHERE id = $1 AND course_id = $2",
        )
        .bind(option_id)
        .bind(course.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CourseError::PriceOptionNotFound);
        }
        Ok(())
    }

    async fn approved_teacher(&self, user_id: Uuid) -> Result<Teacher, CourseError> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT * FROM teachers WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CourseError::TeacherNotApproved)?;

        if teacher.status != TeacherStatus::Approved {
            return Err(CourseError::TeacherNotApproved);
        }
        Ok(teacher)
    }

    /// Load a live course and verify the caller owns it.
    async fn owned_course(&self, user_id: Uuid, course_id: Uuid) -> Result<Course, CourseError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CourseError::NotFound)?;

        let owner: (Uuid,) = sqlx::query_as("SELECT user_id FROM teachers WHERE id = $1")
            .bind(course.teacher_id)
            .fetch_one(&self.pool)
            .await?;

        if owner.0 != user_id {
            return Err(CourseError::Forbidden);
        }
        Ok(course)
    }
}
