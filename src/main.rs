fn main() -> anyhow::Result<()> {
    memedit::run()?;
    Ok(())
}
