use clap::Subcommand;
use uuid::Uuid;

use crate::auth;
use crate::database::manager::DatabaseManager;

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Seed cities and the course category tree")]
    Catalog,

    #[command(about = "Seed a demo teacher with an approved course")]
    Demo,

    #[command(about = "Create an admin account")]
    Admin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Administrator")]
        name: String,
    },
}

const CITIES: &[&str] = &[
    "New York",
    "San Francisco",
    "Chicago",
    "Austin",
    "Seattle",
    "Boston",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("Languages", &["English", "Spanish", "Japanese", "French"]),
    ("Music", &["Piano", "Guitar", "Violin", "Voice"]),
    ("Academics", &["Mathematics", "Physics", "Chemistry", "Writing"]),
    ("Technology", &["Programming", "Data Science", "Design"]),
];

pub async fn handle(cmd: SeedCommands) -> anyhow::Result<()> {
    match cmd {
        SeedCommands::Catalog => seed_catalog().await,
        SeedCommands::Demo => seed_demo().await,
        SeedCommands::Admin {
            email,
            password,
            name,
        } => seed_admin(&email, &password, &name).await,
    }
}

/// Idempotent: rerunning leaves existing rows untouched.
async fn seed_catalog() -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    for city in CITIES {
        sqlx::query("INSERT INTO cities (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(city)
            .execute(&mut *tx)
            .await?;
    }

    for (main, subs) in CATEGORIES {
        sqlx::query("INSERT INTO main_categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(main)
            .execute(&mut *tx)
            .await?;

        let (main_id,): (i32,) = sqlx::query_as("SELECT id FROM main_categories WHERE name = $1")
            .bind(main)
            .fetch_one(&mut *tx)
            .await?;

        for sub in *subs {
            sqlx::query(
                "INSERT INTO sub_categories (main_category_id, name) VALUES ($1, $2) \
                 ON CONFLICT (main_category_id, name) DO NOTHING",
            )
            .bind(main_id)
            .bind(sub)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    println!("Catalog seeded: {} cities, {} categories", CITIES.len(), CATEGORIES.len());
    Ok(())
}

async fn seed_admin(email: &str, password: &str, name: &str) -> anyhow::Result<()> {
    let hash = auth::hash_password(password)?;

    let pool = DatabaseManager::pool().await?;
    let result = sqlx::query(
        "INSERT INTO admin_users (id, email, password_hash, name) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(hash)
    .bind(name)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        println!("Admin {} already exists, nothing changed", email);
    } else {
        println!("Admin {} created", email);
    }
    Ok(())
}

/// A ready-to-browse teacher: approved profile, weekday availability, one
/// course with two price options. Requires the catalog seed.
async fn seed_demo() -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;

    let email = "demo.teacher@tutorhub.dev";
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&pool)
            .await?;
    if exists.0 {
        println!("Demo teacher already seeded, nothing changed");
        return Ok(());
    }

    let (sub_category_id,): (i32,) =
        sqlx::query_as("SELECT id FROM sub_categories ORDER BY id LIMIT 1")
            .fetch_optional(&pool)
            .await?
            .ok_or_else(|| anyhow::anyhow!("run `seed catalog` first"))?;

    let hash = auth::hash_password("demo-password")?;
    let mut tx = pool.begin().await?;

    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, role) \
         VALUES ($1, $2, $3, 'Dana Demo', 'teacher')",
    )
    .bind(user_id)
    .bind(email)
    .bind(&hash)
    .execute(&mut *tx)
    .await?;

    let teacher_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO teachers (id, user_id, headline, introduction, career_years, status) \
         VALUES ($1, $2, 'Demo tutor for trying out the API', 'Seeded account.', 5, 'approved')",
    )
    .bind(teacher_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    // Monday through Friday, 09:00-17:00
    for weekday in 0i16..5 {
        sqlx::query(
            "INSERT INTO teacher_available_slots (id, teacher_id, weekday, start_time, end_time) \
             VALUES ($1, $2, $3, '09:00', '17:00')",
        )
        .bind(Uuid::new_v4())
        .bind(teacher_id)
        .bind(weekday)
        .execute(&mut *tx)
        .await?;
    }

    let course_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO courses (id, teacher_id, sub_category_id, title, description, is_online) \
         VALUES ($1, $2, $3, 'Demo course', 'Seeded course for trying out the API.', TRUE)",
    )
    .bind(course_id)
    .bind(teacher_id)
    .bind(sub_category_id)
    .execute(&mut *tx)
    .await?;

    for (price, quantity) in [(2500i64, 1i32), (20000, 10)] {
        sqlx::query(
            "INSERT INTO course_price_options (id, course_id, price, quantity) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(price)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    println!("Demo teacher seeded (login: {} / demo-password)", email);
    Ok(())
}
