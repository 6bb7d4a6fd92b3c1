use anyhow::Result;
use buildcross::io;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CheckArgs) -> Result<()> {
    let outcome = io::load_buildings_from_file(&args.input.input, &args.input.filter())?;

    println!("accepted: {}", outcome.repository.count());
    println!("rejected: {}", outcome.rejected.len());
    for rejected in &outcome.rejected {
        println!("  - input {}: {}", rejected.source_id, rejected.error);
    }

    Ok(())
}
