use crate::cli::VisualizeArgs;
use crate::error::Result;
use hotspot::workflows::visualize::{self, VisualizeOptions};
use tracing::info;

pub fn run(args: VisualizeArgs) -> Result<()> {
    let options = VisualizeOptions {
        dir: args.dir,
        log_file: args.log,
        output: args.output,
        reference_marker: args.reference_marker,
    };
    info!(dir = %options.dir.display(), "Generating PyMOL script");
    let output = visualize::run(&options)?;
    println!("PyMOL script has been generated: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn writes_script_next_to_the_structures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1BTL.clean.pdb"), "END\n").unwrap();
        fs::write(dir.path().join("d_0.pdb"), "END\n").unwrap();
        fs::write(dir.path().join("log.txt"), "d_0.pdb - Mutations: T52V\n").unwrap();

        run(VisualizeArgs {
            dir: dir.path().to_path_buf(),
            log: PathBuf::from("log.txt"),
            output: PathBuf::from("view.pml"),
            reference_marker: "clean".to_string(),
        })
        .unwrap();

        let script = fs::read_to_string(dir.path().join("view.pml")).unwrap();
        assert!(script.contains("select mut_d_0, d_0 and resi 52"));
    }
}
