use anyhow::Context;

use pvmc::driver;

fn main() -> anyhow::Result<()> {
    driver::run().context("pvmc could not compile and run the program")?;

    Ok(())
}
