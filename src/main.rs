mod analytics;
mod config;
mod csv_io;
mod db;
mod models;
mod run;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    config::init_logging(&config);
    config.prepare_data_dir()?;

    tracing::debug!(db = %config.db_path.display(), "opening database");
    let mut db = db::Database::open(&config.db_path)?;
    run::as_cli(&args, &mut db, chrono::Local::now().naive_local())
}
