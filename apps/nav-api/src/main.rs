use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = nav_api::Args::parse();

	nav_api::run(args).await
}
