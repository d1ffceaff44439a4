use anyhow::Result;
use clap::Args;
use std::{fmt::Display, path::PathBuf};
use zxystream_core::{CoordCursor, SchemaVariant};
use zxystream_mbtiles::MBTilesStore;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file to probe
	#[arg(required = true)]
	input_file: PathBuf,
}

/// What a full scan found out about a file.
#[derive(Debug, PartialEq, Eq)]
pub struct ProbeReport {
	pub variant: SchemaVariant,
	pub coordinates: u64,
}

impl Display for ProbeReport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "schema: {}", self.variant)?;
		writeln!(f, "table: {}", self.variant.table_name())?;
		writeln!(f, "coordinates: {}", self.coordinates)
	}
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.input_file);

	let report = probe(MBTilesStore::open_path(&arguments.input_file)?).await?;
	print!("{report}");

	Ok(())
}

/// Scan every coordinate of `store`, counting lines as they are emitted.
pub async fn probe(store: MBTilesStore) -> Result<ProbeReport> {
	let mut cursor = CoordCursor::new(store);
	let mut coordinates = 0u64;
	while let Some(chunk) = cursor.pull().await {
		coordinates += chunk?.lines().count() as u64;
	}
	// a completed pull sequence has always run detection
	let variant = cursor.schema_variant().unwrap_or(SchemaVariant::Plain);
	Ok(ProbeReport { variant, coordinates })
}
