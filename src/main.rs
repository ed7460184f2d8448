use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use practicedb::config::{Cli, Settings};
use practicedb::loader;
use practicedb::logger::{error, init};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = Settings::resolve(&cli).and_then(|settings| {
        if let Some(log_path) = &settings.log_file {
            if let Err(e) = init(log_path) {
                eprintln!("warning: cannot open log file {}: {}", log_path.display(), e);
            }
        }
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let summary = loader::run(&settings, &mut out)?;
        out.flush()?;
        Ok(summary)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("caused by: {}", cause);
            }
            error(&format!("fatal error: {:?}", err));
            ExitCode::FAILURE
        }
    }
}
