use agora_config::Postgres;
use agora_storage::{Error, db::Db, queries};
use agora_testkit::TestDatabase;

async fn seed(db: &Db) {
	for statement in [
		"\
INSERT INTO posts (post_id, title, content, published_at, like_count, dislike_count, og_image_url)
VALUES
	(1, 'Tokio internals', '<p>the reactor and the scheduler</p>', '2024-01-01T00:00:00Z', 5, 0, NULL),
	(2, 'Gardening notes', '<p>tokio scheduler deep dive</p>', '2024-01-02T00:00:00Z', 9, 1, 'https://img.example/2.png'),
	(3, 'tokio for beginners', '<p>weekend plans</p>', '2024-01-03T00:00:00Z', 2, 0, NULL)",
		"INSERT INTO tags (tag_id, name) VALUES (1, 'rust'), (2, 'async'), (3, 'web')",
		"INSERT INTO post_tags (post_id, tag_id) VALUES (1, 2), (1, 1), (2, 1), (3, 3), (3, 2)",
		"INSERT INTO comments (post_id, body) VALUES (1, 'nice'), (1, 'thanks'), (3, 'hm')",
	] {
		sqlx::query(statement).execute(&db.pool).await.expect("Failed to seed corpus.");
	}
}

fn ids<T>(rows: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
	let mut ids = rows.iter().map(id).collect::<Vec<_>>();

	ids.sort_unstable();

	ids
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AGORA_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = agora_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set AGORA_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema("simple").await.expect("Failed to ensure schema.");
	// Bootstrapping twice is a no-op.
	db.ensure_schema("simple").await.expect("Failed to re-run schema.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name IN ('posts', 'tags', 'post_tags', 'comments')",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 4);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AGORA_PG_DSN to run."]
async fn matchers_and_aggregates_follow_the_corpus() {
	let Some(base_dsn) = agora_testkit::env_dsn() else {
		eprintln!("Skipping matchers_and_aggregates_follow_the_corpus; set AGORA_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema("simple").await.expect("Failed to ensure schema.");
	seed(&db).await;

	let terms = vec!["tokio".to_string()];
	let by_title = queries::title_matches(&db, &terms).await.expect("title_matches failed");

	// Substring matching is case-sensitive.
	assert_eq!(ids(&by_title, |row| row.post_id), vec![3]);

	let by_content = queries::content_matches(&db, "simple", "Tokio scheduler")
		.await
		.expect("content_matches failed");

	assert_eq!(ids(&by_content, |row| row.post_id), vec![2]);

	let tagged =
		queries::posts_with_all_tags(&db, &[1, 2]).await.expect("posts_with_all_tags failed");

	assert_eq!(ids(&tagged, |row| row.post_id), vec![1]);

	let facets = queries::tag_facets(&db, Some(&[1, 3][..])).await.expect("tag_facets failed");
	let mut facets =
		facets.into_iter().map(|row| (row.tag_id, row.post_count)).collect::<Vec<_>>();

	facets.sort_unstable();

	assert_eq!(facets, vec![(1, 1), (2, 2), (3, 1)]);

	let corpus_facets = queries::tag_facets(&db, None).await.expect("tag_facets failed");

	assert_eq!(corpus_facets.iter().map(|row| row.post_count).sum::<i64>(), 5);

	let post_tags = queries::post_tags(&db, &[1]).await.expect("post_tags failed");
	let names = post_tags.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();

	assert_eq!(names, vec!["rust", "async"]);

	let comments = queries::comment_counts(&db, &[1, 2, 3]).await.expect("comment_counts failed");

	assert_eq!(
		ids(&comments, |row| row.post_id * 10 + row.comment_count),
		vec![12, 31],
		"post 2 has no comments and no row"
	);

	let records = queries::fetch_posts(&db, &[2]).await.expect("fetch_posts failed");

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].og_image_url.as_deref(), Some("https://img.example/2.png"));
	assert_eq!(records[0].dislike_count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AGORA_PG_DSN to run."]
async fn missing_text_search_config_is_index_unavailable() {
	let Some(base_dsn) = agora_testkit::env_dsn() else {
		eprintln!(
			"Skipping missing_text_search_config_is_index_unavailable; set AGORA_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema("simple").await.expect("Failed to ensure schema.");

	let err = queries::content_matches(&db, "no_such_config", "tokio")
		.await
		.expect_err("Expected an unknown text search configuration to fail.");

	assert!(matches!(err, Error::IndexUnavailable(_)), "{err}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
