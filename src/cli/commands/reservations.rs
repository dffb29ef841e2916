use chrono::{DateTime, Datelike, Duration, Utc};
use clap::Subcommand;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::teacher::TeacherAvailableSlot;

#[derive(Subcommand)]
pub enum ReservationCommands {
    #[command(about = "Backfill completed reservations in the past week from open purchases")]
    GeneratePast {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
}

pub async fn handle(cmd: ReservationCommands) -> anyhow::Result<()> {
    match cmd {
        ReservationCommands::GeneratePast { count } => generate_past(count).await,
    }
}

/// The date in the previous week that falls on the slot's weekday.
fn last_week_occurrence(now: DateTime<Utc>, weekday: i16) -> chrono::NaiveDate {
    let today = now.weekday().num_days_from_monday() as i64;
    let days_back = 7 + today - weekday as i64;
    (now - Duration::days(days_back)).date_naive()
}

/// Consumes sessions from purchases that still have some left and writes
/// completed reservations into last week, inside each teacher's
/// availability. Useful for demo environments where reviews need a history.
async fn generate_past(count: usize) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;

    let purchases: Vec<(Uuid, Uuid, Uuid, Uuid)> = sqlx::query_as(
        r#"
        SELECT p.id, p.user_id, p.course_id, c.teacher_id
        FROM user_course_purchases p
        JOIN courses c ON c.id = p.course_id
        WHERE p.quantity_used < p.quantity_total
        ORDER BY p.created_at
        LIMIT $1
        "#,
    )
    .bind(count as i64)
    .fetch_all(&pool)
    .await?;

    let now = Utc::now();
    let mut created = 0usize;

    for (purchase_id, student_id, course_id, teacher_id) in purchases {
        let slots = sqlx::query_as::<_, TeacherAvailableSlot>(
            "SELECT * FROM teacher_available_slots WHERE teacher_id = $1 \
             ORDER BY weekday, start_time",
        )
        .bind(teacher_id)
        .fetch_all(&pool)
        .await?;

        let Some(slot) = slots.first() else {
            continue;
        };

        let date = last_week_occurrence(now, slot.weekday);
        let starts_at =
            DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(slot.start_time), Utc);
        let ends_at =
            DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(slot.end_time), Utc);

        let mut tx = pool.begin().await?;

        let (conflicting,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reservations
                WHERE teacher_id = $1 AND status <> 'canceled'
                  AND starts_at < $3 AND $2 < ends_at
            )
            "#,
        )
        .bind(teacher_id)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(&mut *tx)
        .await?;

        if conflicting {
            tx.rollback().await?;
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, course_id, teacher_id, student_id, purchase_id, starts_at, ends_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'completed')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(teacher_id)
        .bind(student_id)
        .bind(purchase_id)
        .bind(starts_at)
        .bind(ends_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE user_course_purchases SET quantity_used = quantity_used + 1 WHERE id = $1",
        )
        .bind(purchase_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        created += 1;
    }

    println!("Generated {} past reservations", created);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn last_week_occurrence_is_always_in_the_past() {
        // 2026-09-02 is a Wednesday
        let now = Utc.with_ymd_and_hms(2026, 9, 2, 12, 0, 0).unwrap();
        for weekday in 0i16..7 {
            let date = last_week_occurrence(now, weekday);
            assert!(date < now.date_naive());
            assert_eq!(date.weekday().num_days_from_monday() as i16, weekday);
        }
    }
}
