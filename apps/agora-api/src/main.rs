use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = agora_api::Args::parse();

	agora_api::run(args).await
}
