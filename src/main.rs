use couriernow::auth::TrustedRoles;
use couriernow::config::Config;
use couriernow::db;
use couriernow::engine::Engine;
use couriernow::error::Error;
use couriernow::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;

    let engine = Engine::new(pool, &config).await?;

    serve(
        engine,
        config.listen_addr,
        TrustedRoles(config.trusted_roles.clone()),
    )
    .await
}
