//! CLI entry point for the luminance-matched mosaic builder

use clap::Parser;
use lumamosaic::io::cli::{Cli, MosaicProcessor, init_logging};

fn main() -> lumamosaic::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);
    let processor = MosaicProcessor::new(cli);
    processor.process().map(|_| ())
}
