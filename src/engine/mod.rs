use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::mem;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use pbr::ProgressBar;
use slog::Logger;

use crate::dataset::{conll, Load, StdLoader};
use crate::io::serialize;
use crate::lang::{IdSentence, RelId, Sentence, TagId, TokenIds, WordId};
use crate::models::{DependencyModel, RelationLookup, HMM};
use crate::preprocessing::{
    DepRelCollection, SentenceEncoder, TagCollection, TagRegistry, Vocab,
};
use crate::syntax::graph::Edge;

static MAGIC: &[u8; 7] = b"ARBORDB";

/// Drives the whole pipeline: loads treebanks through a
/// [`SentenceEncoder`], trains the tagging and parsing models on the
/// encoded corpus and serves predictions from them.
pub struct Engine {
    logger: Logger,
    encoder: SentenceEncoder,
    sentences: Vec<IdSentence>,
    tagger: HMM,
    parser: DependencyModel,
}

impl Engine {
    pub fn new(logger: Logger) -> Self {
        Engine {
            logger: logger,
            encoder: SentenceEncoder::new(TagRegistry::universal()),
            sentences: Vec::new(),
            tagger: HMM::default(),
            parser: DependencyModel::default(),
        }
    }

    pub fn encoder(&self) -> &SentenceEncoder {
        &self.encoder
    }

    pub fn sentences(&self) -> &[IdSentence] {
        &self.sentences
    }

    pub fn tagger(&self) -> &HMM {
        &self.tagger
    }

    pub fn parser(&self) -> &DependencyModel {
        &self.parser
    }

    /// Reads one treebank file or every treebank file under a directory
    /// into the corpus, growing the collections as new forms, tags and
    /// relations appear. Returns the number of sentences added.
    pub fn load_treebank<P: AsRef<Path>>(&mut self, path: P) -> io::Result<usize> {
        let mut files = Vec::new();
        collect_treebank_files(path.as_ref(), &mut files)?;
        if files.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no treebank files under `{}`", path.as_ref().display()),
            ));
        }
        files.sort();
        info!(self.logger, "loading {} treebank file(s)", files.len());
        let encoder = mem::take(&mut self.encoder);
        let mut loader: StdLoader<Sentence<conll::Token<'static>>, SentenceEncoder> =
            StdLoader::new(encoder);
        let mut pbar = ProgressBar::new(files.len() as u64);
        let mut loaded = 0;
        let mut failure = None;
        for file in &files {
            match loader.load(file) {
                Ok(dataset) => {
                    debug!(
                        self.logger,
                        "loaded {} sentence(s) from `{}`",
                        dataset.len(),
                        file.display()
                    );
                    loaded += dataset.len();
                    self.sentences.extend(dataset);
                    pbar.inc();
                }
                Err(e) => {
                    failure = Some((file.clone(), e));
                    break;
                }
            }
        }
        pbar.finish();
        self.encoder = loader.into_preprocessor();
        if let Some((file, e)) = failure {
            error!(self.logger, "failed to load `{}`: {}", file.display(), e);
            return Err(e);
        }
        info!(
            self.logger,
            "corpus holds {} sentence(s): {} form(s), {} tag(s), {} relation(s)",
            self.sentences.len(),
            self.encoder.vocab().size(),
            self.encoder.tags().len(),
            self.encoder.relations().len()
        );
        Ok(loaded)
    }

    /// Estimates the tagging model from the corpus. The unknown tag is
    /// seeded with one pseudo observation of the unknown form so that
    /// it never ends up unreachable.
    pub fn train_tagger(&mut self, smoothing: f32) {
        let num_states = self.encoder.tags().len() as TagId;
        let num_observations = self.encoder.vocab().size() as WordId;
        info!(
            self.logger,
            "training tagger: {} state(s), {} observation(s), {} sentence(s)",
            num_states,
            num_observations,
            self.sentences.len()
        );
        self.tagger.resize(num_states, num_observations);
        self.tagger.train_sentence(
            TagCollection::SERVICE,
            Vocab::SERVICE,
            &[(TagCollection::UNKNOWN, Vocab::UNKNOWN)],
        );
        let mut pbar = ProgressBar::new(self.sentences.len() as u64);
        let mut pairs = Vec::new();
        for sentence in &self.sentences {
            pairs.clear();
            pairs.extend(sentence.iter().map(|token| (token.tag, token.word)));
            self.tagger
                .train_sentence(TagCollection::SERVICE, Vocab::SERVICE, &pairs);
            pbar.inc();
        }
        pbar.finish();
        self.tagger.normalize(smoothing);
    }

    /// Estimates the parsing model from the corpus.
    pub fn train_parser(&mut self, smoothing: f32) {
        let num_relations = self.encoder.relations().len() as RelId;
        let num_tags = self.encoder.tags().len() as TagId;
        info!(
            self.logger,
            "training parser: {} relation(s), {} tag(s), {} sentence(s)",
            num_relations,
            num_tags,
            self.sentences.len()
        );
        self.parser.resize(num_relations, num_tags);
        let mut pbar = ProgressBar::new(self.sentences.len() as u64);
        for sentence in &self.sentences {
            self.parser
                .process_sentence(TagCollection::SERVICE, sentence);
            pbar.inc();
        }
        pbar.finish();
        self.parser.normalize(smoothing);
    }

    pub fn encode_words<S: AsRef<str>>(&self, words: &[S]) -> Vec<WordId> {
        words
            .iter()
            .map(|word| self.encoder.vocab().get(&word.as_ref().to_lowercase()))
            .collect()
    }

    pub fn tag(&self, words: &[WordId]) -> Vec<TagId> {
        self.tagger.predict(TagCollection::SERVICE, words)
    }

    /// Solves the best dependency tree over the tagged sentence. `None`
    /// means no spanning tree could be built from the statistics.
    pub fn parse(&self, tags: &[TagId]) -> Option<Vec<Edge>> {
        self.parser
            .extract_tree(self.encoder.relations(), TagCollection::SERVICE, tags)
    }

    /// Per-token `(head, relation)` pairs from a solved tree. Heads are
    /// 1-based token positions with 0 standing for the root.
    pub fn attachments(&self, len: usize, tree: &[Edge]) -> Vec<(usize, RelId)> {
        let root = self.encoder.relations().root_relation();
        let mut result = vec![(0, root); len];
        for edge in tree {
            if edge.dest >= 1 && edge.dest <= len {
                result[edge.dest - 1] = (edge.src, edge.label as RelId);
            }
        }
        result
    }

    /// Writes the candidate graph for the tagged sentence in dot format.
    pub fn export_parse_graph<W: Write>(&self, tags: &[TagId], writer: &mut W) -> io::Result<()> {
        let graph =
            self.parser
                .build_graph(self.encoder.relations(), TagCollection::SERVICE, tags);
        graph.write_dot(writer)
    }

    pub fn save_collections<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let data = (
            self.encoder.vocab(),
            self.encoder.tags(),
            self.encoder.relations(),
        );
        serialize::write_to(path.as_ref(), &data, serialize::Format::Json)?;
        info!(
            self.logger,
            "saved collections to `{}`",
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load_collections<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        let (vocab, tags, rels): (Vocab, TagCollection, DepRelCollection) =
            serialize::read_from(path.as_ref(), serialize::Format::Json)?;
        info!(
            self.logger,
            "loaded collections from `{}`: {} form(s), {} tag(s), {} relation(s)",
            path.as_ref().display(),
            vocab.size(),
            tags.len(),
            rels.len()
        );
        self.encoder = SentenceEncoder::from_parts(TagRegistry::universal(), vocab, tags, rels);
        Ok(())
    }

    pub fn save_tagger<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(MAGIC)?;
        writer.write_u32::<LittleEndian>(self.tagger.num_observations())?;
        writer.write_u16::<LittleEndian>(self.tagger.num_states())?;
        self.tagger.save_binary(&mut writer)?;
        writer.flush()?;
        info!(self.logger, "saved tagger to `{}`", path.as_ref().display());
        Ok(())
    }

    /// Restores the tagging model. The collections must have been
    /// loaded beforehand; a model trained against different collections
    /// is rejected.
    pub fn load_tagger<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        verify_magic(&mut reader)?;
        let num_observations = reader.read_u32::<LittleEndian>()?;
        let num_states = reader.read_u16::<LittleEndian>()?;
        if num_observations as usize != self.encoder.vocab().size()
            || num_states as usize != self.encoder.tags().len()
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "tagger does not match the loaded collections",
            ));
        }
        self.tagger.load_binary(&mut reader)?;
        if self.tagger.num_states() != num_states
            || self.tagger.num_observations() != num_observations
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "tagger tables disagree with the file header",
            ));
        }
        info!(
            self.logger,
            "loaded tagger from `{}`",
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn save_parser<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(MAGIC)?;
        writer.write_u16::<LittleEndian>(self.parser.num_tags())?;
        writer.write_u16::<LittleEndian>(self.parser.num_relations())?;
        self.parser.save_binary(&mut writer)?;
        writer.flush()?;
        info!(self.logger, "saved parser to `{}`", path.as_ref().display());
        Ok(())
    }

    /// Restores the parsing model. The collections must have been
    /// loaded beforehand; a model trained against different collections
    /// is rejected.
    pub fn load_parser<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        verify_magic(&mut reader)?;
        let num_tags = reader.read_u16::<LittleEndian>()?;
        let num_relations = reader.read_u16::<LittleEndian>()?;
        if num_tags as usize != self.encoder.tags().len()
            || num_relations as usize != self.encoder.relations().len()
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "parser does not match the loaded collections",
            ));
        }
        self.parser.load_binary(&mut reader)?;
        if self.parser.num_tags() != num_tags || self.parser.num_relations() != num_relations {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "parser table disagrees with the file header",
            ));
        }
        info!(
            self.logger,
            "loaded parser from `{}`",
            path.as_ref().display()
        );
        Ok(())
    }

    /// Writes the encoded corpus so later runs can skip treebank
    /// parsing. Head absence is stored as `u64::MAX`.
    pub fn save_corpus<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(MAGIC)?;
        writer.write_u64::<LittleEndian>(self.sentences.len() as u64)?;
        for sentence in &self.sentences {
            writer.write_u64::<LittleEndian>(sentence.len() as u64)?;
            for token in sentence {
                writer.write_u32::<LittleEndian>(token.word)?;
                writer.write_u32::<LittleEndian>(token.lemma)?;
                writer.write_u16::<LittleEndian>(token.tag)?;
                writer.write_u64::<LittleEndian>(match token.head {
                    Some(head) => head as u64,
                    None => u64::MAX,
                })?;
                writer.write_u16::<LittleEndian>(token.rel)?;
            }
        }
        writer.flush()?;
        info!(
            self.logger,
            "saved {} sentence(s) to `{}`",
            self.sentences.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Replaces the corpus with a previously saved one.
    pub fn load_corpus<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        verify_magic(&mut reader)?;
        let num_sentences = reader.read_u64::<LittleEndian>()?;
        let mut sentences = Vec::with_capacity(num_sentences as usize);
        for _ in 0..num_sentences {
            let len = reader.read_u64::<LittleEndian>()?;
            let mut sentence = Vec::with_capacity(len as usize);
            for _ in 0..len {
                let word = reader.read_u32::<LittleEndian>()?;
                let lemma = reader.read_u32::<LittleEndian>()?;
                let tag = reader.read_u16::<LittleEndian>()?;
                let head = match reader.read_u64::<LittleEndian>()? {
                    u64::MAX => None,
                    head => Some(head as usize),
                };
                let rel = reader.read_u16::<LittleEndian>()?;
                sentence.push(TokenIds {
                    word: word,
                    lemma: lemma,
                    tag: tag,
                    head: head,
                    rel: rel,
                });
            }
            sentences.push(sentence);
        }
        info!(
            self.logger,
            "loaded {} sentence(s) from `{}`",
            sentences.len(),
            path.as_ref().display()
        );
        self.sentences = sentences;
        Ok(())
    }

    /// Dumps the per-tag relation counts gathered during parser
    /// training as csv.
    pub fn export_relation_frequencies<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "tag,relation,count")?;
        for (tag, rels) in self.parser.frequencies() {
            let tag_name = self.describe_tag(*tag);
            for (rel, count) in rels {
                writeln!(writer, "{},{},{}", tag_name, self.describe_relation(*rel), count)?;
            }
        }
        Ok(())
    }

    /// Human readable rendition of a tag id, e.g. `verb|mood=ind|tense=pres`.
    pub fn describe_tag(&self, tag: TagId) -> String {
        let registry = self.encoder.registry();
        match self.encoder.tags().get(tag) {
            Some(morph) => {
                let mut out = registry.pos_name(morph.pos).unwrap_or("?").to_string();
                for (name, value) in &morph.feats {
                    out.push('|');
                    out.push_str(registry.feature_name(*name).unwrap_or("?"));
                    out.push('=');
                    out.push_str(registry.value_name(*value).unwrap_or("?"));
                }
                out
            }
            None => format!("#{}", tag),
        }
    }

    /// Human readable rendition of a relation id. The trailing arrow
    /// marks the head side: `<` for a head before the dependent, `>`
    /// for a head after it.
    pub fn describe_relation(&self, rel: RelId) -> String {
        let registry = self.encoder.registry();
        match self.encoder.relations().get(rel) {
            Some(deprel) => {
                let mut out = registry
                    .relation_name(deprel.relation)
                    .unwrap_or("?")
                    .to_string();
                if let Some(modifier) = registry.modifier_name(deprel.modifier) {
                    if !modifier.is_empty() {
                        out.push(':');
                        out.push_str(modifier);
                    }
                }
                out.push(if deprel.head_before { '<' } else { '>' });
                out
            }
            None => format!("#{}", rel),
        }
    }
}

fn collect_treebank_files(path: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let path = entry?.path();
            if path.is_dir() {
                collect_treebank_files(&path, files)?;
            } else if is_treebank_file(&path) {
                files.push(path);
            }
        }
    } else {
        files.push(path.to_path_buf());
    }
    Ok(())
}

fn is_treebank_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "conllu" || ext == "conll")
        .unwrap_or(false)
}

fn verify_magic<R: Read>(reader: &mut R) -> io::Result<()> {
    let mut buf = [0u8; 7];
    reader.read_exact(&mut buf)?;
    if &buf == MAGIC {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "not a model file",
        ))
    }
}
