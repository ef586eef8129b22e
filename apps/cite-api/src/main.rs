use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = cite_api::Args::parse();

	cite_api::run(args).await
}
