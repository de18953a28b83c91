//! `wcp-server migrate up|down|status` (`§6` "Migrations").

use wcp_domain::config::Config;

pub async fn up(config: &Config) -> anyhow::Result<()> {
    let pool = wcp_persistence::connect(&config.database).await?;
    println!("migrations applied");
    pool.close().await;
    Ok(())
}

pub async fn down(config: &Config) -> anyhow::Result<()> {
    let pool = wcp_persistence::connect(&config.database).await?;
    match wcp_persistence::migrations::rollback_last(&pool).await? {
        Some(name) => println!("rolled back: {name}"),
        None => println!("no migrations to roll back"),
    }
    pool.close().await;
    Ok(())
}

pub async fn status(config: &Config) -> anyhow::Result<()> {
    let pool = wcp_persistence::connect(&config.database).await?;
    let rows = wcp_persistence::migrations::status(&pool).await?;
    for row in rows {
        println!("{:>4}  {:<32}  {}", row.id, row.name, row.executed_at);
    }
    pool.close().await;
    Ok(())
}
