pub fn render_schema(text_search_config: &str) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<TS_CONFIG>", text_search_config)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_posts.sql" => out.push_str(include_str!("../../../sql/tables/001_posts.sql")),
				"tables/002_tags.sql" => out.push_str(include_str!("../../../sql/tables/002_tags.sql")),
				"tables/003_post_tags.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_post_tags.sql")),
				"tables/004_comments.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_comments.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
