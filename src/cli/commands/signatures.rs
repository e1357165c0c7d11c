//! `tcomp signatures` command - Show the selectable signatures

use console::style;
use miette::Result;

use crate::cli::helpers::{open_project, render_signatures, signature_source};
use crate::cli::GlobalOpts;
use crate::core::signatures::load_signatures;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct SignaturesArgs {
    /// Show only the number of signatures
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: SignaturesArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(project.as_ref());
    let source = signature_source(&config, project.as_ref());

    let names = load_signatures(&source);

    if args.count {
        println!("{}", names.len());
        return Ok(());
    }

    if names.is_empty() && !global.quiet {
        eprintln!(
            "{} No signatures available from {} (table {})",
            style("!").yellow(),
            style(source.path().display()).cyan(),
            style(source.table()).cyan()
        );
    }

    let format = global.format.resolve(None);
    print!("{}", render_signatures(&names, format)?);
    Ok(())
}
