//! The `silica` command-line compiler.
//!
//! `silica [-D NAME[=VALUE]]... [-U NAME]... [-p|--print] [-o FILE] FILE...`
//!
//! Each input is compiled (or pretty-printed with `-p`) in turn and the
//! output concatenated to `FILE` or stdout. A failing input is reported and
//! skipped; the remaining inputs still run. The exit code is 0 only if
//! every input succeeded.

use silica_diagnostic::TerminalEmitter;
use silicac::{Defines, Program};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: silica [options] FILE...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -D NAME[=VALUE]   Define a macro before compilation");
    eprintln!("  -U NAME           Undo earlier -D definitions of NAME");
    eprintln!("  -p, --print       Pretty-print instead of compiling");
    eprintln!("  -o FILE           Write output to FILE instead of stdout");
}

struct Options {
    defines: Defines,
    print: bool,
    output: Option<PathBuf>,
    files: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        defines: Defines::new(),
        print: false,
        output: None,
        files: Vec::new(),
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-p" | "--print" => options.print = true,
            "-o" => {
                i += 1;
                let path = args.get(i).ok_or("`-o` needs a file name")?;
                options.output = Some(PathBuf::from(path));
            }
            "-D" | "-U" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("`{arg}` needs a macro name"))?;
                apply_define(&mut options.defines, arg == "-D", value);
            }
            "-h" | "--help" => return Err(String::new()),
            other if other.starts_with("-D") && other.len() > 2 => {
                apply_define(&mut options.defines, true, &other[2..]);
            }
            other if other.starts_with("-U") && other.len() > 2 => {
                apply_define(&mut options.defines, false, &other[2..]);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option `{other}`"));
            }
            file => options.files.push(file.to_owned()),
        }
        i += 1;
    }

    if options.files.is_empty() {
        return Err(String::new());
    }
    Ok(options)
}

fn apply_define(defines: &mut Defines, define: bool, spec: &str) {
    if define {
        match spec.split_once('=') {
            Some((name, value)) => defines.define(name, Some(value.to_owned())),
            None => defines.define(spec, None),
        }
    } else {
        defines.undefine(spec);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("SILICA_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("silica: {message}");
                eprintln!();
            }
            print_usage();
            std::process::exit(1);
        }
    };

    let mut emitter = TerminalEmitter::stderr();
    let mut output = Vec::new();
    let mut success = true;

    for file in &options.files {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("silica: {file}: {e}");
                success = false;
                continue;
            }
        };

        match Program::parse(&source, &options.defines) {
            Ok(program) => {
                if options.print {
                    output.extend_from_slice(program.print().as_bytes());
                } else {
                    output.extend_from_slice(&program.spirv_bytes());
                }
            }
            Err(error) => {
                tracing::warn!(%file, "compilation failed");
                emitter.emit(&error.into_diagnostic(), file, &source);
                emitter.flush();
                success = false;
            }
        }
    }

    let written = match &options.output {
        Some(path) => std::fs::write(path, &output)
            .map_err(|e| format!("{}: {e}", path.display())),
        None => std::io::stdout()
            .write_all(&output)
            .map_err(|e| e.to_string()),
    };
    if let Err(message) = written {
        eprintln!("silica: {message}");
        success = false;
    }

    std::process::exit(i32::from(!success));
}
