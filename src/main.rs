use clap::Parser;
use miette::Result;
use tcomp::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Terminate silently on broken pipes (e.g. `tcomp signatures | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    tcomp::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Init(args) => tcomp::cli::commands::init::run(args),
        Commands::New(args) => tcomp::cli::commands::new::run(args, &global),
        Commands::Signatures(args) => tcomp::cli::commands::signatures::run(args, &global),
        Commands::Validate(args) => tcomp::cli::commands::validate::run(args, &global),
        Commands::Config(cmd) => tcomp::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => tcomp::cli::commands::completions::run(args),
    }
}
