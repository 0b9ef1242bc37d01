use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use clap::{ArgGroup, Parser as ArgParse};
use thiserror::Error;

use pvmc_asm::{write_program, EmitPvm};
use pvmc_parser::{
    lexer::{Lexer, LexerError},
    Parser, ParserError,
};

use crate::vm_config::VmConfig;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("could not read {path:?}: {source}")]
    ReadInput { path: PathBuf, source: io::Error },
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    Lexer(#[from] LexerError),
    #[error("{0}")]
    Parser(#[from] ParserError),
    /// The input already carries the listing extension.
    #[error("the listing {0:?} would overwrite the input file")]
    ListingOverwritesInput(PathBuf),
    #[error("could not start the runtime \"{runtime}\": {source}")]
    RuntimeSpawn { runtime: String, source: io::Error },
    #[error("the runtime exited with {0}")]
    RuntimeFailed(ExitStatus),
}

pub const LISTING_EXTENSION: &str = "pvm";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Codegen,
    /// Write the listing and the VM config, but do not run them.
    Assembly,
    #[default]
    Run,
}

#[derive(Debug, ArgParse)]
#[command(group(ArgGroup::new("stage").multiple(false)))]
#[command(version, about = "Compiles register declarations and instruction macros into a pseudo VM listing")]
pub struct Options {
    /// The source file to compile
    input_file: PathBuf,

    /// Stop after scanning and print the tokens
    #[arg(long, group = "stage")]
    lex: bool,
    /// Stop after parsing and print the program
    #[arg(long, group = "stage")]
    parse: bool,
    /// Stop after code generation and print the instructions
    #[arg(long, group = "stage")]
    codegen: bool,
    /// Write the listing and the config without running the VM
    #[arg(short = 'S', group = "stage")]
    assembly: bool,

    /// Where the VM configuration is written
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// Interpreter used to start the VM
    #[arg(long, default_value = "python")]
    runtime: String,
    /// VM script handed to the runtime before the listing
    #[arg(long, default_value = "pyvm.py")]
    runtime_script: PathBuf,
}

/// Output of a successful compilation, nothing has been written yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Compilation {
    pub program: pvmc_asm::Program,
    pub register_count: usize,
}

impl Compilation {
    pub fn listing(&self) -> String {
        self.program.emit()
    }
}

/// `prog.src` becomes `prog.pvm`, `prog` becomes `prog.pvm`.
pub fn listing_path(input_file: &Path) -> PathBuf {
    let mut listing = input_file.to_path_buf();
    listing.set_extension(LISTING_EXTENSION);
    listing
}

/// Artifacts are written next to their destination first and renamed once
/// everything was written.
fn staging_path(path: &Path) -> PathBuf {
    let mut staged = OsString::from(path.as_os_str());
    staged.push(".tmp");
    PathBuf::from(staged)
}

fn remove_artifact(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(err) = fs::remove_file(path) {
        eprintln!(
            "WARN: Could not remove the file {:?} due to {}, continuing",
            path, err
        );
    }
}

/// Each pair is (staged path, final path).
fn commit_artifacts(
    compilation: &Compilation,
    listing: (&Path, &Path),
    config: (&Path, &Path),
) -> io::Result<()> {
    write_program(
        &compilation.program,
        BufWriter::new(File::create(listing.0)?),
    )?;
    VmConfig::new(compilation.register_count).write(config.0)?;

    fs::rename(config.0, config.1)?;
    if let Err(err) = fs::rename(listing.0, listing.1) {
        // A config is only kept together with its listing
        remove_artifact(config.1);
        return Err(err);
    }

    Ok(())
}

/// Runs the whole pipeline in memory. Either everything succeeds or the first
/// error is returned.
pub fn compile_source(source: &str) -> Result<Compilation, DriverError> {
    let tokens = Lexer::new(source.to_owned()).scan()?;
    let program = Parser::new(tokens).parse_program()?;
    let register_count = program.register_count;

    Ok(Compilation {
        program: pvmc_asmgen::code_generation(program),
        register_count,
    })
}

impl Options {
    pub fn stage(&self) -> Stage {
        if self.lex {
            Stage::Lex
        } else if self.parse {
            Stage::Parse
        } else if self.codegen {
            Stage::Codegen
        } else if self.assembly {
            Stage::Assembly
        } else {
            Stage::Run
        }
    }

    pub fn listing_file(&self) -> PathBuf {
        listing_path(&self.input_file)
    }

    fn read_input(&self) -> Result<String, DriverError> {
        fs::read_to_string(&self.input_file).map_err(|source| DriverError::ReadInput {
            path: self.input_file.clone(),
            source,
        })
    }

    /// Compiles the input up to the selected stage. Earlier stages print their
    /// result and return `None`.
    pub fn compile(&self) -> Result<Option<Compilation>, DriverError> {
        let stage = self.stage();
        let source = self.read_input()?;

        if let Stage::Assembly | Stage::Run = stage {
            return compile_source(&source).map(Some);
        }

        let tokens = Lexer::new(source).scan()?;
        if let Stage::Lex = stage {
            println!("{:#?}", tokens);
            return Ok(None);
        }

        let program = Parser::new(tokens).parse_program()?;
        if let Stage::Parse = stage {
            println!("{:#?}", program);
            return Ok(None);
        }

        println!("{:#?}", pvmc_asmgen::code_generation(program));
        Ok(None)
    }

    pub fn write_artifacts(&self, compilation: &Compilation) -> Result<(), DriverError> {
        let listing_file = self.listing_file();
        if listing_file == self.input_file {
            return Err(DriverError::ListingOverwritesInput(listing_file));
        }

        let staged_listing = staging_path(&listing_file);
        let staged_config = staging_path(&self.config);

        let result = commit_artifacts(
            compilation,
            (staged_listing.as_path(), listing_file.as_path()),
            (staged_config.as_path(), self.config.as_path()),
        );
        if result.is_err() {
            remove_artifact(&staged_listing);
            remove_artifact(&staged_config);
        }

        result.map_err(DriverError::from)
    }

    pub fn run_runtime(&self) -> Result<(), DriverError> {
        if !self.runtime_script.exists() {
            eprintln!(
                "WARN: The VM script {:?} does not exist, starting {} anyway",
                &self.runtime_script, self.runtime
            );
        }

        let mut command = Command::new(&self.runtime)
            .arg(self.runtime_script.as_os_str())
            .arg(self.listing_file().as_os_str())
            .spawn()
            .map_err(|source| DriverError::RuntimeSpawn {
                runtime: self.runtime.clone(),
                source,
            })?;

        let exit_code = command.wait()?;

        if !exit_code.success() {
            return Err(DriverError::RuntimeFailed(exit_code));
        }

        Ok(())
    }

    pub fn execute(&self) -> Result<(), DriverError> {
        let Some(compilation) = self.compile()? else {
            return Ok(());
        };

        self.write_artifacts(&compilation)?;

        if let Stage::Run = self.stage() {
            self.run_runtime()?;
        }

        Ok(())
    }
}

pub fn run() -> Result<(), DriverError> {
    let opts = Options::parse();
    opts.execute()
}
