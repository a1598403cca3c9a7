use std::fs;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pkgscout::cli::{Cli, ColorChoice, Commands, ScanArgs};
use pkgscout::config::ScanConfig;
use pkgscout::extractor::default_registry;
use pkgscout::output::{
    ColorMode, JsonFormatter, OutputFormat, OutputFormatter, ScanProgress, TextFormatter,
};
use pkgscout::scanner::Scanner;
use pkgscout::{EXIT_CONFIG_ERROR, EXIT_EXTRACTOR_FAILURES, EXIT_SUCCESS};

const fn color_choice_to_mode(choice: ColorChoice) -> ColorMode {
    match choice {
        ColorChoice::Auto => ColorMode::Auto,
        ColorChoice::Always => ColorMode::Always,
        ColorChoice::Never => ColorMode::Never,
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let exit_code = match &cli.command {
        Commands::Scan(args) => run_scan(args, &cli),
        Commands::ListPlugins => run_list_plugins(),
    };

    std::process::exit(exit_code);
}

fn run_scan(args: &ScanArgs, cli: &Cli) -> i32 {
    match run_scan_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

fn run_scan_impl(args: &ScanArgs, cli: &Cli) -> pkgscout::Result<i32> {
    // 1. Load configuration
    let mut config = load_config(args.config.as_deref())?;

    // 2. Apply CLI argument overrides
    apply_cli_overrides(&mut config, args);

    // 3. Build the scanner (resolves roots and validates configured paths)
    let scanner = Scanner::new(config)?;
    let registry = default_registry();

    // 4. Run, reporting progress to stderr
    let progress = ScanProgress::new(cli.quiet);
    let result = scanner.run_with(&registry, &progress);
    progress.finish();
    let result = result?;

    // 5. Format output
    let color_mode = color_choice_to_mode(cli.color);
    let output = format_output(args.format, &result, color_mode, cli.verbose)?;

    // 6. Write output
    write_output(args.output.as_deref(), &output, cli.quiet)?;

    // 7. Determine exit code
    if result.all_succeeded() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_EXTRACTOR_FAILURES)
    }
}

fn load_config(config_path: Option<&Path>) -> pkgscout::Result<ScanConfig> {
    config_path.map_or_else(|| Ok(ScanConfig::default()), ScanConfig::load)
}

fn apply_cli_overrides(config: &mut ScanConfig, args: &ScanArgs) {
    // Positional paths override configured roots unless left at the default
    let default_path = std::path::PathBuf::from(".");
    if args.paths.len() != 1 || args.paths[0] != default_path {
        config.roots.clone_from(&args.paths);
    }

    config.skip_dirs.extend(args.skip_dirs.iter().cloned());
    config.files_to_extract.extend(args.files.iter().cloned());

    if let Some(regex) = &args.skip_regex {
        config.skip_dir_regex = Some(regex.clone());
    }
    if let Some(max_inodes) = args.max_inodes {
        config.max_inodes = max_inodes;
    }
    if args.read_symlinks {
        config.read_symlinks = true;
    }
    if args.gitignore {
        config.use_gitignore = true;
    }
}

fn format_output(
    format: OutputFormat,
    result: &pkgscout::inventory::ScanResult,
    color_mode: ColorMode,
    verbose: u8,
) -> pkgscout::Result<String> {
    match format {
        OutputFormat::Text => TextFormatter::with_verbose(color_mode, verbose).format(result),
        OutputFormat::Json => JsonFormatter.format(result),
    }
}

fn write_output(output_path: Option<&Path>, content: &str, quiet: bool) -> pkgscout::Result<()> {
    if let Some(path) = output_path {
        fs::write(path, content)?;
    } else if !quiet {
        print!("{content}");
    }
    Ok(())
}

fn run_list_plugins() -> i32 {
    let registry = default_registry();
    for name in registry.names() {
        println!("{name}");
    }
    EXIT_SUCCESS
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
