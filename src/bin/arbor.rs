#[macro_use]
extern crate arbor;
#[macro_use]
extern crate slog;

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use arbor::app::prelude::*;
use arbor::engine::Engine;
use slog::Logger;

static COLLECTIONS_FILE: &str = "collections.json";
static TAGGER_FILE: &str = "tagger.bin";
static PARSER_FILE: &str = "parser.bin";
static FREQUENCIES_FILE: &str = "relations.csv";

pub fn train<P1, P2>(
    input: P1,
    save_to: P2,
    smoothing: f32,
    frequencies: bool,
    logger: &Logger,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let mut engine = Engine::new(logger.new(o!()));
    info!(logger, "treebank: {}", input.as_ref().display());
    engine.load_treebank(input.as_ref())?;
    engine.train_tagger(smoothing);
    engine.train_parser(smoothing);

    let dir = save_to.as_ref();
    fs::create_dir_all(dir)?;
    engine.save_collections(dir.join(COLLECTIONS_FILE))?;
    engine.save_tagger(dir.join(TAGGER_FILE))?;
    engine.save_parser(dir.join(PARSER_FILE))?;
    if frequencies {
        let path = dir.join(FREQUENCIES_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        engine.export_relation_frequencies(&mut writer)?;
        writer.flush()?;
        info!(logger, "saved relation counts to `{}`", path.display());
    }
    Ok(())
}

fn load_engine<P: AsRef<Path>>(
    model_dir: P,
    with_parser: bool,
    logger: &Logger,
) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let dir = model_dir.as_ref();
    let mut engine = Engine::new(logger.new(o!()));
    engine.load_collections(dir.join(COLLECTIONS_FILE))?;
    engine.load_tagger(dir.join(TAGGER_FILE))?;
    if with_parser {
        engine.load_parser(dir.join(PARSER_FILE))?;
    }
    Ok(engine)
}

fn tag_lines<R: BufRead>(reader: R, engine: &Engine) -> Result<(), Box<dyn Error + Send + Sync>> {
    for line in reader.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let ids = engine.encode_words(&words);
        let tags = engine.tag(&ids);
        for (word, tag) in words.iter().zip(&tags) {
            print!("{}/{} ", word, engine.describe_tag(*tag));
        }
        println!();
    }
    Ok(())
}

fn parse_lines<R: BufRead>(
    reader: R,
    engine: &Engine,
    logger: &Logger,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    for line in reader.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let ids = engine.encode_words(&words);
        let tags = engine.tag(&ids);
        match engine.parse(&tags) {
            Some(tree) => {
                let attachments = engine.attachments(words.len(), &tree);
                for (index, ((word, tag), (head, rel))) in
                    words.iter().zip(&tags).zip(&attachments).enumerate()
                {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        index + 1,
                        word,
                        engine.describe_tag(*tag),
                        head,
                        engine.describe_relation(*rel)
                    );
                }
                println!();
            }
            None => {
                warn!(logger, "no tree found for: {}", line);
            }
        }
    }
    Ok(())
}

pub fn tag<P1, P2>(
    model: P1,
    input: Option<P2>,
    logger: &Logger,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let engine = load_engine(model, false, logger)?;
    match input {
        Some(file) => tag_lines(BufReader::new(File::open(file.as_ref())?), &engine),
        None => {
            let stdin = io::stdin();
            tag_lines(stdin.lock(), &engine)
        }
    }
}

pub fn parse<P1, P2>(
    model: P1,
    input: Option<P2>,
    logger: &Logger,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let engine = load_engine(model, true, logger)?;
    match input {
        Some(file) => parse_lines(BufReader::new(File::open(file.as_ref())?), &engine, logger),
        None => {
            let stdin = io::stdin();
            parse_lines(stdin.lock(), &engine, logger)
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "arbor")]
struct Args {
    #[structopt(flatten)]
    common: CommonArgs,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    #[structopt(name = "train", about = "Trains models from a treebank")]
    Train(Train),
    #[structopt(name = "tag", about = "Tags tokenized sentences")]
    Tag(Tag),
    #[structopt(name = "parse", about = "Tags sentences and extracts dependency trees")]
    Parse(Parse),
}

#[derive(StructOpt, Debug)]
struct Train {
    /// A treebank file or a directory of treebank files
    #[structopt(name = "INPUT", parse(from_os_str))]
    input: PathBuf,
    /// Directory for saved models
    #[structopt(long = "save", parse(from_os_str), default_value = "models")]
    save_to: PathBuf,
    /// Additive smoothing factor for normalization
    #[structopt(long = "smoothing", default_value = "0.5")]
    smoothing: f32,
    /// Write per-tag relation counts next to the models
    #[structopt(long = "frequencies")]
    frequencies: bool,
}

#[derive(StructOpt, Debug)]
struct Tag {
    /// A directory holding trained models
    #[structopt(name = "MODEL", parse(from_os_str))]
    model: PathBuf,
    /// A file of tokenized sentences, one per line; stdin when omitted
    #[structopt(name = "INPUT", parse(from_os_str))]
    input: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
struct Parse {
    /// A directory holding trained models
    #[structopt(name = "MODEL", parse(from_os_str))]
    model: PathBuf,
    /// A file of tokenized sentences, one per line; stdin when omitted
    #[structopt(name = "INPUT", parse(from_os_str))]
    input: Option<PathBuf>,
}

main!(|args: Args, context: Context| match args.command {
    Command::Train(ref c) => {
        info!(&context.logger, "execute subcommand: {:?}", c);
        train(
            &c.input,
            &c.save_to,
            c.smoothing,
            c.frequencies,
            &context.logger,
        )
    }
    Command::Tag(ref c) => {
        info!(&context.logger, "execute subcommand: {:?}", c);
        tag(&c.model, c.input.as_ref(), &context.logger)
    }
    Command::Parse(ref c) => {
        info!(&context.logger, "execute subcommand: {:?}", c);
        parse(&c.model, c.input.as_ref(), &context.logger)
    }
});
