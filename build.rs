// The custom build script, needed as we use built for the version information.

fn main() -> Result<(), anyhow::Error> {
    built::write_built_file()?;
    Ok(())
}
