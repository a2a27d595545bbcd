use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Number of results per page.
	pub page_size: u32,
	/// Budget for all storage round-trips of a single query.
	pub timeout_ms: u64,
	/// Maximum age of the cached tag-name table. Zero disables caching.
	pub tag_cache_ttl_secs: u64,
	/// Postgres text search configuration used by the content predicate and its index.
	pub text_search_config: String,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			page_size: 10,
			timeout_ms: 5_000,
			tag_cache_ttl_secs: 300,
			text_search_config: "simple".to_string(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}

fn default_log_level() -> String {
	"info".to_string()
}
