use anyhow::Result;

fn main() -> Result<()> {
    memepress::run()?;
    Ok(())
}
