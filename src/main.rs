use anyhow::Result;

fn main() -> Result<()> {
    testgen_rag::cli::run()
}
