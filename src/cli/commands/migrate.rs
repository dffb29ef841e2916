use crate::database::manager::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    DatabaseManager::run_migrations().await?;
    println!("Migrations applied");
    Ok(())
}
