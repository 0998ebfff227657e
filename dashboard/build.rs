use clap::CommandFactory;
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let version: &'static str = Box::leak(env::var("CARGO_PKG_VERSION")?.into_boxed_str());

    let man_dir = out_dir.join("man").join("man1");
    let docs_dir = out_dir.join("docs");
    fs::create_dir_all(&man_dir)?;
    fs::create_dir_all(&docs_dir)?;

    let cmd = dashboard_cli_types::Cli::command().version(version);
    let name = cmd.get_name().to_string();

    let mut buffer: Vec<u8> = Default::default();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    fs::write(man_dir.join(format!("{name}.1")), &buffer)?;

    for subcmd in cmd.get_subcommands() {
        let mut buffer: Vec<u8> = Default::default();
        clap_mangen::Man::new(subcmd.clone()).render(&mut buffer)?;
        let subcmd_name = subcmd.get_name();
        fs::write(man_dir.join(format!("{name}-{subcmd_name}.1")), &buffer)?;
    }

    let markdown = clap_markdown::help_markdown::<dashboard_cli_types::Cli>();
    fs::write(docs_dir.join("manpage.md"), markdown)?;

    println!("cargo:rerun-if-changed=../cli_types/src/lib.rs");

    Ok(())
}
