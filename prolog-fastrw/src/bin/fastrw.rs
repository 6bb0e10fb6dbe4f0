//! Command-line interface (CLI) for the fastrw encoders.
//!
//! Reads sentences described as JSON (see [`prolog_fastrw::json`]) and
//! writes them in SICStus or SWI-Prolog fastrw format, prints them in Prolog
//! syntax, or reports in-memory sizes of the term types.

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use prolog_fastrw::{
    json, Endianness, FastrwError, SicstusOutput, SicstusWriter, SwiConfig, SwiOutput, TargetOs,
    TermOutput, WordSize,
};
use prolog_terms::{Arena, Term, View};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::mem;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encodes sentences
    Encode {
        /// Output format
        #[arg(short, long, value_enum)]
        dialect: Dialect,
        /// Target word size in bytes (SWI)
        #[arg(long, value_parser = ["4", "8"])]
        word_size: Option<String>,
        /// Target byte order (SWI)
        #[arg(long, value_enum)]
        endian: Option<Endian>,
        /// Target operating system (SWI)
        #[arg(long, value_enum)]
        os: Option<Os>,
        /// Fail on atoms outside Latin-1 (SWI)
        #[arg(long)]
        no_wide_atoms: bool,
        /// Input file with a JSON array of sentences
        #[arg(short, long)]
        terms: String,
        /// Output file, stdout when absent
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Prints sentences in Prolog syntax
    Show {
        /// Input file with a JSON array of sentences
        #[arg(short, long)]
        terms: String,
    },
    /// Prints sizes
    Sizes {},
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Dialect {
    Sicstus,
    SicstusTree,
    Swi,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Endian {
    Little,
    Big,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Os {
    Windows,
    Other,
}

fn read_sentences(path: &str) -> Result<Vec<Value>, FastrwError> {
    let input = BufReader::new(File::open(path)?);
    match serde_json::from_reader(input)? {
        Value::Array(sentences) => Ok(sentences),
        other => Err(FastrwError::Json(
            format!("expected an array of sentences, found {other}").into(),
        )),
    }
}

fn stream<O: TermOutput>(sentences: &[Value], out: &mut O) -> Result<(), FastrwError> {
    for sentence in sentences {
        json::emit(sentence, out)?;
        out.full_stop()?;
    }
    Ok(())
}

fn encode_tree<W: Write>(sentences: &[Value], out: W) -> Result<(), FastrwError> {
    let mut arena = Arena::new();
    let mut writer = SicstusWriter::new(out);
    for sentence in sentences {
        let epoch = arena.begin_epoch()?;
        let term = json::to_term(sentence, &mut arena)?;
        writer.write_term(&term, &arena)?;
        log::debug!("{:?}", arena.stats());
        arena.truncate(epoch)?;
    }
    Ok(())
}

fn swi_config(
    word_size: Option<String>,
    endian: Option<Endian>,
    os: Option<Os>,
    no_wide_atoms: bool,
) -> SwiConfig {
    let mut cfg = SwiConfig::host().with_wide_atoms(!no_wide_atoms);
    match word_size.as_deref() {
        Some("4") => cfg = cfg.with_word_size(WordSize::Four),
        Some("8") => cfg = cfg.with_word_size(WordSize::Eight),
        _ => {}
    }
    match endian {
        Some(Endian::Little) => cfg = cfg.with_endianness(Endianness::Little),
        Some(Endian::Big) => cfg = cfg.with_endianness(Endianness::Big),
        None => {}
    }
    match os {
        Some(Os::Windows) => cfg = cfg.with_target_os(TargetOs::Windows),
        Some(Os::Other) => cfg = cfg.with_target_os(TargetOs::Other),
        None => {}
    }
    cfg
}

fn main() -> Result<(), FastrwError> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Encode {
            dialect,
            word_size,
            endian,
            os,
            no_wide_atoms,
            terms: terms_path,
            out: out_path,
        } => {
            let sentences = read_sentences(&terms_path)?;
            log::info!("{}: {} sentences", terms_path, sentences.len());
            let sink: Box<dyn Write> = match &out_path {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout().lock()),
            };
            let sink = BufWriter::new(sink);
            match dialect {
                Dialect::Sicstus => stream(&sentences, &mut SicstusOutput::new(sink))?,
                Dialect::SicstusTree => encode_tree(&sentences, sink)?,
                Dialect::Swi => {
                    let cfg = swi_config(word_size, endian, os, no_wide_atoms);
                    log::debug!("{:?}", cfg);
                    stream(&sentences, &mut SwiOutput::new(sink, cfg))?
                }
            }
        }
        Commands::Show { terms: terms_path } => {
            let sentences = read_sentences(&terms_path)?;
            let mut arena = Arena::new();
            for sentence in &sentences {
                let epoch = arena.begin_epoch()?;
                let term = json::to_term(sentence, &mut arena)?;
                println!("{}.", term.display(&arena));
                arena.truncate(epoch)?;
            }
        }
        Commands::Sizes {} => {
            println!("Size of Term: {}", mem::size_of::<Term>());
            println!("Size of Option<Term>: {}", mem::size_of::<Option<Term>>());
            println!("Size of View: {}", mem::size_of::<View>());
            println!("Size of Arena: {}", mem::size_of::<Arena>());
            println!("Size of SwiConfig: {}", mem::size_of::<SwiConfig>());
            println!(
                "Size of SicstusOutput<Vec<u8>>: {}",
                mem::size_of::<SicstusOutput<Vec<u8>>>()
            );
            println!(
                "Size of SwiOutput<Vec<u8>>: {}",
                mem::size_of::<SwiOutput<Vec<u8>>>()
            );
        }
    }

    Ok(())
}
