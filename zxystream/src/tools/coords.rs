use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::{
	fs::File,
	io::{self, BufWriter},
};
use zxystream_core::{CoordCursor, DEFAULT_BATCH_SIZE};
use zxystream_mbtiles::MBTilesStore;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file to read
	#[arg(required = true)]
	input_file: PathBuf,

	/// write the coordinates to this file instead of stdout
	#[arg(long, short)]
	output: Option<PathBuf>,

	/// number of coordinates read and written per chunk
	#[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
	batch_size: usize,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let store = MBTilesStore::open_path(&arguments.input_file)?;
	let cursor = CoordCursor::builder()
		.store(store)
		.batch_size(arguments.batch_size)
		.build()?;
	let stream = cursor.into_stream();

	let count = match &arguments.output {
		Some(path) => {
			let file = File::create(path)
				.await
				.with_context(|| format!("creating {path:?}"))?;
			stream.write_to(&mut BufWriter::new(file)).await?
		}
		None => stream.write_to(&mut io::stdout()).await?,
	};

	log::info!("wrote {count} tile coordinates of {:?}", arguments.input_file);
	Ok(())
}
