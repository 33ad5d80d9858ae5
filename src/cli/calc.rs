//! Calc command - dividend reinvestment projection

use crate::calculator::{self, GrowthInputs};
use crate::reporters::{self, OutputFormat};
use anyhow::Result;

pub fn run(inputs: &GrowthInputs, format: OutputFormat) -> Result<()> {
    inputs.validate()?;
    let projection = calculator::simulate(inputs);
    println!("{}", reporters::render_projection(inputs, &projection, format)?);
    Ok(())
}
