//
// main.rs
// Dicom-Tagfix
//
// Entry point that hands off execution to the CLI layer.
//

use dicom_tagfix::cli;

fn main() -> anyhow::Result<()> {
    cli::run()
}
