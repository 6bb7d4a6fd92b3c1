use anyhow::Result;
use buildcross::{compute_crossings, io, CancelToken};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CountArgs) -> Result<()> {
    let out_dir = args.output.clone().unwrap_or(".".into());

    let outcome = io::load_buildings_from_file(&args.input.input, &args.input.filter())?;
    if !outcome.rejected.is_empty() {
        eprintln!("[count] excluded {} invalid footprints (run `check` for details)", outcome.rejected.len());
    }

    let result = compute_crossings(&outcome.repository, &args.config(), &CancelToken::new())?;

    let (coordinates, matrix) = io::write_results_to_dir(&out_dir, &result)?;
    println!("{}", coordinates.display());
    println!("{}", matrix.display());

    Ok(())
}
