use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

use cite_storage::db::Db;

use crate::{Error, Result};

const DSN_ENV: &str = "CITE_PG_DSN";

/// Base DSN for Postgres-backed tests, read from `CITE_PG_DSN`.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// A uniquely named database created for one test and dropped afterwards.
///
/// Call [`TestDatabase::cleanup`] to drop it and observe errors; otherwise `Drop` makes a
/// best-effort attempt.
pub struct TestDatabase {
	name: String,
	options: PgConnectOptions,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("{DSN_ENV} is not a valid DSN: {err}.")))?;
		let (maintenance, mut conn) = open_maintenance(&base).await?;
		let name = format!("cite_test_{}", Uuid::new_v4().simple());

		sqlx::query(&format!(r#"CREATE DATABASE "{name}""#)).execute(&mut conn).await?;
		conn.close().await?;

		Ok(Self { options: base.database(&name), name, maintenance, dropped: false })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn postgres_config(&self) -> cite_config::Postgres {
		cite_config::Postgres {
			dsn: self.options.to_url_lossy().to_string(),
			pool_max_conns: 2,
		}
	}

	/// Connects to the database and creates the chunk schema for `vector_dim`.
	pub async fn bootstrap(&self, vector_dim: u32) -> Result<Db> {
		let db = Db::connect(&self.postgres_config()).await?;

		db.ensure_schema(vector_dim).await?;

		Ok(db)
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.maintenance, &self.name).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let maintenance = self.maintenance.clone();
		let name = std::mem::take(&mut self.name);
		// The owning runtime may be shutting down, so the drop runs on a private one.
		let handle = thread::spawn(move || {
			let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();

			match runtime {
				Ok(runtime) =>
					if let Err(err) = runtime.block_on(drop_database(&maintenance, &name)) {
						eprintln!("Failed to drop test database {name}: {err}.");
					},
				Err(err) => eprintln!("Failed to start cleanup runtime for {name}: {err}."),
			}
		});

		let _ = handle.join();
	}
}

/// Opens a connection to a database that always exists, for `CREATE`/`DROP DATABASE`.
async fn open_maintenance(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failures = Vec::new();

	for database in ["postgres", "template1"] {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failures.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!("No maintenance database reachable ({}).", failures.join("; "))))
}

async fn drop_database(maintenance: &PgConnectOptions, name: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#))
		.execute(&mut conn)
		.await?;
	conn.close().await?;

	Ok(())
}
